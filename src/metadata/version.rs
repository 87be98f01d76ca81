//! Schema versions, as written in field metadata (`"0.1"`).

use super::common::*;

/// The version of the schema in which a field was introduced.  Versions
/// compare numerically, so `0.10` is newer than `0.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    major: u16,
    minor: u16,
}

impl SchemaVersion {
    /// The first published version of the schema.  Every field defined
    /// today was introduced here.
    pub const V0_1: SchemaVersion = SchemaVersion::new(0, 1);

    /// The newest version this crate knows how to read and write.
    pub const CURRENT: SchemaVersion = SchemaVersion::V0_1;

    /// Create a version from its components.
    pub const fn new(major: u16, minor: u16) -> SchemaVersion {
        SchemaVersion { major, minor }
    }

    /// The major component.
    pub fn major(self) -> u16 {
        self.major
    }

    /// The minor component.
    pub fn minor(self) -> u16 {
        self.minor
    }

    /// Can a consumer that understands `self` make sense of a field that
    /// was introduced in `introduced`?
    pub fn understands(self, introduced: SchemaVersion) -> bool {
        introduced <= self
    }
}

impl Default for SchemaVersion {
    fn default() -> SchemaVersion {
        SchemaVersion::CURRENT
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl_serialize_to_string!(SchemaVersion);

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        lazy_static! {
            static ref VERSION: Regex = Regex::new(r"^([0-9]+)\.([0-9]+)$").unwrap();
        }
        let caps = VERSION
            .captures(s)
            .ok_or_else(|| Error::invalid_value("schema version", s))?;

        // Convert a regex capture group to a number.  Only call if the
        // specified capture group is known to be valid.
        let component = |i: usize| -> Result<u16> {
            FromStr::from_str(caps.get(i).unwrap().as_str())
                .map_err(|_| Error::invalid_value("schema version", s))
        };

        Ok(SchemaVersion::new(component(1)?, component(2)?))
    }
}

impl_deserialize_from_str!(SchemaVersion);

#[test]
fn schema_version_can_be_converted_to_and_from_a_string() {
    assert_eq!(SchemaVersion::from_str("0.1").unwrap(), SchemaVersion::V0_1);
    assert_eq!(SchemaVersion::new(1, 12).to_string(), "1.12");
    assert!(SchemaVersion::from_str("1").is_err());
    assert!(SchemaVersion::from_str("1.2.3").is_err());
    assert!(SchemaVersion::from_str("0.99999").is_err());
}

#[test]
fn schema_versions_compare_numerically() {
    let v0_9 = SchemaVersion::from_str("0.9").unwrap();
    let v0_10 = SchemaVersion::from_str("0.10").unwrap();
    assert!(v0_9 < v0_10);
    assert!(v0_10.understands(v0_9));
    assert!(!v0_9.understands(v0_10));
    assert!(SchemaVersion::CURRENT.understands(SchemaVersion::V0_1));
}

#[test]
fn schema_version_serializes_as_a_string() {
    let json = serde_json::to_string(&SchemaVersion::V0_1).unwrap();
    assert_eq!(json, "\"0.1\"");
    let back: SchemaVersion = serde_json::from_str(&json).unwrap();
    assert_eq!(back, SchemaVersion::V0_1);
}
