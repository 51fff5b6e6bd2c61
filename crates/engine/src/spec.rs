use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Installer namespace a requirement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// System packages installed via apt-get
    Apt,
    /// Python packages installed via pip
    Pip,
    /// Conda packages (also carries the Python version itself)
    Conda,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Apt, Namespace::Pip, Namespace::Conda];

    /// Single-character prefix used when tokenizing requirements
    pub const fn tag(self) -> char {
        match self {
            Namespace::Apt => 'a',
            Namespace::Pip => 'p',
            Namespace::Conda => 'c',
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Namespace::Apt => "apt",
            Namespace::Pip => "pip",
            Namespace::Conda => "conda",
        }
    }
}

/// Software requirements for one container environment.
///
/// Lists may contain duplicates on construction. After [`ContainerSpec::merge_spec`]
/// every list touched by the merge is duplicate-free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Package names installed via apt-get
    #[serde(default)]
    pub apt: Vec<String>,

    /// Pip requirements (name with optional `==version`)
    #[serde(default)]
    pub pip: Vec<String>,

    /// Conda requirements (name with optional `==version`)
    #[serde(default)]
    pub conda: Vec<String>,
}

impl ContainerSpec {
    pub fn new(apt: Vec<String>, pip: Vec<String>, conda: Vec<String>) -> Self {
        Self { apt, pip, conda }
    }

    pub fn packages(&self, namespace: Namespace) -> &[String] {
        match namespace {
            Namespace::Apt => &self.apt,
            Namespace::Pip => &self.pip,
            Namespace::Conda => &self.conda,
        }
    }

    fn packages_mut(&mut self, namespace: Namespace) -> &mut Vec<String> {
        match namespace {
            Namespace::Apt => &mut self.apt,
            Namespace::Pip => &mut self.pip,
            Namespace::Conda => &mut self.conda,
        }
    }

    /// True when no namespace lists any requirement
    pub fn is_empty(&self) -> bool {
        Namespace::ALL.iter().all(|ns| self.packages(*ns).is_empty())
    }

    pub fn requirement_count(&self) -> usize {
        Namespace::ALL.iter().map(|ns| self.packages(*ns).len()).sum()
    }

    /// Absorb `other`'s requirements into this spec.
    ///
    /// Namespaces where `other` is empty are left untouched; the rest are
    /// extended and deduplicated, keeping first occurrences.
    pub fn merge_spec(&mut self, other: &ContainerSpec) {
        for namespace in Namespace::ALL {
            let incoming = other.packages(namespace);
            if incoming.is_empty() {
                continue;
            }
            let list = self.packages_mut(namespace);
            list.extend(incoming.iter().cloned());
            dedup_in_place(list);
        }
    }
}

fn dedup_in_place(list: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(list.len());
    list.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_extends_and_deduplicates() {
        let mut base = ContainerSpec::new(
            strings(&["git"]),
            strings(&["numpy==1.0", "pandas"]),
            vec![],
        );
        let other = ContainerSpec::new(
            strings(&["git", "curl"]),
            strings(&["numpy==1.0", "scipy"]),
            vec![],
        );

        base.merge_spec(&other);

        assert_eq!(base.apt, strings(&["git", "curl"]));
        assert_eq!(base.pip, strings(&["numpy==1.0", "pandas", "scipy"]));
        assert!(base.conda.is_empty());
    }

    #[test]
    fn merge_leaves_other_unchanged() {
        let mut base = ContainerSpec::default();
        let other = ContainerSpec::new(strings(&["git", "git"]), vec![], strings(&["python=3.9"]));
        let snapshot = other.clone();

        base.merge_spec(&other);

        assert_eq!(other, snapshot);
        assert_eq!(base.apt, strings(&["git"]));
        assert_eq!(base.conda, strings(&["python=3.9"]));
    }

    #[test]
    fn merge_skips_namespaces_that_are_empty_in_other() {
        // Duplicates already present are only collapsed where the merge touches the list.
        let mut base = ContainerSpec::new(strings(&["git", "git"]), strings(&["a"]), vec![]);
        let other = ContainerSpec::new(vec![], strings(&["b"]), vec![]);

        base.merge_spec(&other);

        assert_eq!(base.apt, strings(&["git", "git"]));
        assert_eq!(base.pip, strings(&["a", "b"]));
    }

    #[test]
    fn namespace_tags_are_distinct() {
        let tags: HashSet<char> = Namespace::ALL.iter().map(|ns| ns.tag()).collect();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn deserializes_with_missing_lists() {
        let spec: ContainerSpec = serde_json::from_str(r#"{"pip":["numpy"]}"#).unwrap();
        assert!(spec.apt.is_empty());
        assert_eq!(spec.pip, strings(&["numpy"]));
        assert_eq!(spec.requirement_count(), 1);
        assert!(!spec.is_empty());
    }

    proptest! {
        #[test]
        fn proptest_merge_never_leaves_duplicates(
            left in prop::collection::vec("[a-c]{1,2}", 0..8),
            right in prop::collection::vec("[a-c]{1,2}", 1..8),
        ) {
            let mut base = ContainerSpec::new(vec![], left.clone(), vec![]);
            let other = ContainerSpec::new(vec![], right.clone(), vec![]);
            base.merge_spec(&other);

            let unique: HashSet<&String> = base.pip.iter().collect();
            prop_assert_eq!(unique.len(), base.pip.len());
            for item in left.iter().chain(right.iter()) {
                prop_assert!(base.pip.contains(item));
            }
        }
    }
}
