//! Identity shared by every endpoint-like record.

use serde::{Deserialize, Serialize};

use super::key_value::{KeyValue, Reader, Writer};
use super::schema::{Field, Schema};
use super::version::SchemaVersion;
use crate::errors::*;

/// The `id` and `name` of an endpoint.  Composed by value into each record
/// that needs an identity, rather than shared through a base type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Common {
    /// An identifier used to correlate the interface with its in-guest
    /// device.
    #[serde(rename = "id")]
    pub id: String,

    /// The interface alias requested.  Linux allows only one name and one
    /// alias per interface.
    #[serde(rename = "name")]
    pub name: String,
}

pub(crate) const ID: Field = Field::read_only("id", "id", SchemaVersion::V0_1);
pub(crate) const NAME: Field = Field::read_only("name", "name", SchemaVersion::V0_1);

const FIELDS: &[Field] = &[ID, NAME];

impl Schema for Common {
    const RECORD: &'static str = "identity";

    fn fields() -> &'static [Field] {
        FIELDS
    }
}

impl Common {
    /// Create an identity from an identifier and a name.
    ///
    /// ```
    /// use vnic_metadata::metadata as md;
    /// let common = md::Common::new("0000:00:20.0", "eth0");
    /// assert_eq!(common.name, "eth0");
    /// ```
    pub fn new<I, N>(id: I, name: N) -> Common
    where
        I: Into<String>,
        N: Into<String>,
    {
        Common {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl KeyValue for Common {
    fn write_fields(&self, w: &mut Writer<'_>) {
        w.value(&ID, &self.id);
        w.value(&NAME, &self.name);
    }

    fn read_fields(r: &Reader<'_>) -> Result<Common> {
        Ok(Common::new(
            r.value::<String>(&ID)?,
            r.value::<String>(&NAME)?,
        ))
    }
}

#[test]
fn common_can_be_roundtripped() {
    let yaml = r#"---
id: "4c1a"
name: eth0
"#;
    assert_roundtrip!(Common, yaml);
}

#[test]
fn common_serde_keys_match_the_descriptor() {
    let value = serde_json::to_value(Common::new("a", "b")).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    let mut expected = Common::keys();
    expected.sort();
    assert_eq!(keys, expected);
}
