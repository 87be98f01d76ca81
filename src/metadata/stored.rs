//! Decoding structured documents in two steps.
//!
//! serde only sees the stored shape of a record.  Turning that shape into
//! a checked record happens afterwards, outside serde, so that it can use
//! the caller's `ValidationPolicy` and so that a broken invariant is still
//! reported as `Validation` rather than as a parse error.

use std::io;

use super::common::*;
use super::policy::ValidationPolicy;
use super::schema::Schema;

/// A record which is stored as a plain `Record` and checked on the way in.
pub trait Stored: Schema + Sized {
    /// The shape of the record in a JSON or YAML document.
    type Record: de::DeserializeOwned;

    /// Build a checked record from its stored shape.
    fn from_record(record: Self::Record, policy: &ValidationPolicy) -> Result<Self>;
}

/// Decode a `T` from JSON, checking it against `policy`.
pub(crate) fn from_json_str<T: Stored>(json: &str, policy: &ValidationPolicy) -> Result<T> {
    let record = serde_json::from_str(json).map_err(|err| Error::schema(T::RECORD, err))?;
    T::from_record(record, policy)
}

/// Decode a `T` from a stream of YAML, checking it against `policy`.
pub(crate) fn from_yaml_reader<T, R>(r: R, policy: &ValidationPolicy) -> Result<T>
where
    T: Stored,
    R: io::Read,
{
    let record = serde_yaml::from_reader(r).map_err(|err| Error::schema(T::RECORD, err))?;
    T::from_record(record, policy)
}
