/// Separator between a package name and its exact pinned version (`numpy==1.26.4`).
pub const PIN_SEPARATOR: &str = "==";

/// Borrowed view of a single requirement string.
///
/// A requirement is either a bare package name (`git`) or a name pinned to an
/// exact version (`numpy==1.26.4`). Only the first [`PIN_SEPARATOR`] splits;
/// anything after it belongs to the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Requirement<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
}

impl<'a> Requirement<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(PIN_SEPARATOR) {
            Some((name, version)) => Self {
                name,
                version: Some(version),
            },
            None => Self {
                name: raw,
                version: None,
            },
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.version.is_some()
    }

    /// Two pinned requirements conflict when they name the same package with different versions.
    pub fn conflicts_with(&self, other: &Requirement<'_>) -> bool {
        match (self.version, other.version) {
            (Some(mine), Some(theirs)) => self.name == other.name && mine != theirs,
            _ => false,
        }
    }
}
