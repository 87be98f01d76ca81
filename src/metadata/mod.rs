//! Network endpoint and container network metadata, version 0.1 of the
//! schema.

pub use ipnetwork::IpNetwork;

pub use self::container_network::ContainerNetwork;
pub use self::identity::Common;
pub use self::network_endpoint::{check_single_default, NetworkEndpoint};
pub use self::policy::{Reassignment, ValidationPolicy};
pub use self::schema::{Field, Schema};
pub use self::scope::Scope;
pub use self::shared::SharedEndpoint;
pub use self::stored::Stored;
pub use self::version::SchemaVersion;

// Re-export errors here so that people can use them by including `use
// vnic_metadata::metadata`.
pub use crate::errors::*;

#[cfg(test)]
macro_rules! assert_roundtrip {
    ( $ty:ty, $yaml:expr ) => {
        {
            let yaml: &str = $yaml;
            let data: $ty = serde_yaml::from_str(&yaml).unwrap();
            let serialized = serde_json::to_value(&data).unwrap();
            let expected: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(serialized, expected);
        }
    }
}

#[macro_use]
mod string_serialize_deserialize;
mod common;
mod helpers;

mod container_network;
mod identity;
pub mod key_value;
mod network_endpoint;
mod policy;
mod schema;
mod scope;
mod shared;
mod stored;
mod version;

/// Encode any schema record as pretty-printed JSON.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Decode a schema record from JSON, checking it against the default
/// `ValidationPolicy`.  A document that cannot be parsed is a `Schema`
/// error; a record that breaks an invariant is a `Validation` error.
pub fn from_json<T: Stored>(json: &str) -> Result<T> {
    from_json_with_policy(json, &ValidationPolicy::default())
}

/// Decode a schema record from JSON, checking it against `policy`.
pub fn from_json_with_policy<T: Stored>(json: &str, policy: &ValidationPolicy) -> Result<T> {
    stored::from_json_str(json, policy)
}
