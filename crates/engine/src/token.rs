use crate::requirement::Requirement;
use crate::spec::{ContainerSpec, Namespace};
use std::collections::HashSet;
use std::fmt;

/// Requirement string prefixed with its namespace tag (`pnumpy==1.0`, `agit`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn new(namespace: Namespace, requirement: &str) -> Self {
        let mut raw = String::with_capacity(requirement.len() + 1);
        raw.push(namespace.tag());
        raw.push_str(requirement);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Requirement view over the tagged string, so the name keeps its namespace tag
    pub fn requirement(&self) -> Requirement<'_> {
        Requirement::parse(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaced view of a [`ContainerSpec`] used for similarity checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<Token>,
}

impl TokenSet {
    pub fn from_spec(spec: &ContainerSpec) -> Self {
        let tokens = Namespace::ALL
            .iter()
            .flat_map(|ns| spec.packages(*ns).iter().map(move |req| Token::new(*ns, req)))
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.tokens.contains(token)
    }

    pub fn is_subset(&self, other: &TokenSet) -> bool {
        self.tokens.is_subset(&other.tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Tokens present here but not in `other`
    pub fn difference<'a>(&'a self, other: &'a TokenSet) -> impl Iterator<Item = &'a Token> + 'a {
        self.tokens.difference(&other.tokens)
    }

    fn intersection_len(&self, other: &TokenSet) -> usize {
        self.tokens.intersection(&other.tokens).count()
    }
}

pub fn tokenize(spec: &ContainerSpec) -> TokenSet {
    TokenSet::from_spec(spec)
}

/// Jaccard distance `1 - |A ∩ B| / |A ∪ B|`; smaller means more alike.
///
/// Two empty sets are treated as identical and yield `0.0`.
pub fn jaccard_distance(a: &TokenSet, b: &TokenSet) -> f64 {
    let intersection = a.intersection_len(b);
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    1.0 - intersection as f64 / union as f64
}

/// Whether `incoming` can be merged into `existing` without pinning one package to two versions.
///
/// Only tokens unique to each side are compared; unpinned tokens never conflict.
pub fn is_compatible(existing: &TokenSet, incoming: &TokenSet) -> bool {
    let right: Vec<Requirement<'_>> = incoming
        .difference(existing)
        .map(Token::requirement)
        .filter(Requirement::is_pinned)
        .collect();
    if right.is_empty() {
        return true;
    }

    for left in existing.difference(incoming) {
        let left = left.requirement();
        if !left.is_pinned() {
            continue;
        }
        if let Some(conflict) = right.iter().find(|r| left.conflicts_with(r)) {
            log::trace!(
                "pin conflict on {}: {:?} vs {:?}",
                left.name,
                left.version,
                conflict.version
            );
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pip_spec(pip: &[&str]) -> ContainerSpec {
        ContainerSpec::new(vec![], pip.iter().map(|s| s.to_string()).collect(), vec![])
    }

    fn spec(apt: &[&str], pip: &[&str], conda: &[&str]) -> ContainerSpec {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        ContainerSpec::new(owned(apt), owned(pip), owned(conda))
    }

    #[test]
    fn same_name_in_different_namespaces_does_not_collide() {
        let set = tokenize(&spec(&["numpy"], &["numpy"], &["numpy"]));
        assert_eq!(set.len(), 3);
        assert!(set.contains(&Token::new(Namespace::Apt, "numpy")));
        assert!(set.contains(&Token::new(Namespace::Pip, "numpy")));
        assert!(set.contains(&Token::new(Namespace::Conda, "numpy")));
    }

    #[test]
    fn tokenize_collapses_duplicates() {
        let set = tokenize(&pip_spec(&["numpy", "numpy"]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distance_of_identical_sets_is_zero() {
        let a = tokenize(&pip_spec(&["numpy", "pandas"]));
        assert_eq!(jaccard_distance(&a, &a.clone()), 0.0);
    }

    #[test]
    fn distance_of_disjoint_sets_is_one() {
        let a = tokenize(&pip_spec(&["numpy"]));
        let b = tokenize(&pip_spec(&["pandas"]));
        assert_eq!(jaccard_distance(&a, &b), 1.0);
    }

    #[test]
    fn distance_counts_shared_tokens() {
        let a = tokenize(&pip_spec(&["numpy==1.0", "pandas"]));
        let b = tokenize(&pip_spec(&["numpy==1.0", "scipy"]));
        let d = jaccard_distance(&a, &b);
        assert!((d - 2.0 / 3.0).abs() < 1e-12, "got {d}");
    }

    #[test]
    fn distance_of_two_empty_sets_is_zero() {
        let empty = TokenSet::default();
        assert_eq!(jaccard_distance(&empty, &TokenSet::default()), 0.0);
    }

    #[test]
    fn distance_against_one_empty_set_is_one() {
        let a = tokenize(&pip_spec(&["numpy"]));
        assert_eq!(jaccard_distance(&a, &TokenSet::default()), 1.0);
    }

    #[test]
    fn conflicting_pins_are_incompatible() {
        let existing = tokenize(&pip_spec(&["numpy==1.0"]));
        let incoming = tokenize(&pip_spec(&["numpy==2.0"]));
        assert!(!is_compatible(&existing, &incoming));
        assert!(!is_compatible(&incoming, &existing));
    }

    #[test]
    fn same_pin_and_unpinned_names_are_compatible() {
        let existing = tokenize(&pip_spec(&["numpy==1.0", "pandas"]));
        let incoming = tokenize(&pip_spec(&["numpy==1.0", "pandas==2.0", "scipy"]));
        assert!(is_compatible(&existing, &incoming));
    }

    #[test]
    fn pins_in_different_namespaces_do_not_conflict() {
        let existing = tokenize(&spec(&[], &["numpy==1.0"], &[]));
        let incoming = tokenize(&spec(&[], &[], &["numpy==2.0"]));
        assert!(is_compatible(&existing, &incoming));
    }

    #[test]
    fn shared_pin_does_not_shield_a_conflicting_extra() {
        let existing = tokenize(&pip_spec(&["numpy==1.0", "scipy==1.5"]));
        let incoming = tokenize(&pip_spec(&["numpy==1.0", "scipy==1.6"]));
        assert!(!is_compatible(&existing, &incoming));
    }

    proptest! {
        #[test]
        fn proptest_distance_is_within_unit_interval(
            left in prop::collection::vec("[a-d](==[12])?", 0..6),
            right in prop::collection::vec("[a-d](==[12])?", 0..6),
        ) {
            let a = tokenize(&ContainerSpec::new(vec![], left, vec![]));
            let b = tokenize(&ContainerSpec::new(vec![], right, vec![]));
            let d = jaccard_distance(&a, &b);
            prop_assert!((0.0..=1.0).contains(&d));
            prop_assert_eq!(d, jaccard_distance(&b, &a));
        }

        #[test]
        fn proptest_compatibility_is_symmetric(
            left in prop::collection::vec("[a-d](==[12])?", 0..6),
            right in prop::collection::vec("[a-d](==[12])?", 0..6),
        ) {
            let a = tokenize(&ContainerSpec::new(vec![], left, vec![]));
            let b = tokenize(&ContainerSpec::new(vec![], right, vec![]));
            prop_assert_eq!(is_compatible(&a, &b), is_compatible(&b, &a));
        }
    }
}
