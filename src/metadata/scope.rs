//! Who may change a field once its record has been built.

use super::common::*;

/// The mutability scope of a field, relative to consumers of a record
/// after the allocating authority has constructed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Set once at construction, never changed afterwards.
    ReadOnly,
    /// May be updated after construction.
    ReadWrite,
}

impl Scope {
    /// May consumers write to a field with this scope?
    pub fn is_writable(self) -> bool {
        self == Scope::ReadWrite
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scope::ReadOnly => write!(f, "read-only"),
            Scope::ReadWrite => write!(f, "read-write"),
        }
    }
}

impl_serialize_to_string!(Scope);

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read-only" => Ok(Scope::ReadOnly),
            "read-write" => Ok(Scope::ReadWrite),
            _ => Err(Error::invalid_value("scope", s)),
        }
    }
}

impl_deserialize_from_str!(Scope);

#[test]
fn scope_can_be_converted_to_and_from_a_string() {
    for (scope, s) in [(Scope::ReadOnly, "read-only"), (Scope::ReadWrite, "read-write")] {
        assert_eq!(scope.to_string(), s);
        assert_eq!(Scope::from_str(s).unwrap(), scope);
    }
    assert!(Scope::from_str("hidden").is_err());
    assert!(Scope::ReadWrite.is_writable());
    assert!(!Scope::ReadOnly.is_writable());
}
