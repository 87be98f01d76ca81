//! We provide fancy error-handling support thanks to the [`error_chain`
//! crate][error_chain].  The primary advantage of `error_chain` is that it
//! provides support for backtraces.  The secondary advantage of this crate
//! is that it gives us nice, structured error types.
//!
//! The three kinds callers usually care about are `Schema` (a stored value
//! could not be decoded), `Validation` (a value breaks a network invariant)
//! and `InvalidState` (a mutation the field's scope does not allow).
//!
//! [error_chain]: https://github.com/rust-lang-nursery/error-chain

// Sadly, this macro does not generate complete documentation.
#![allow(missing_docs)]

use std::fmt;
use std::path::PathBuf;

error_chain! {
    // These are external, non-`error_chain` error types that we can
    // automatically wrap.
    foreign_links {
        // Something went wrong reading or writing a stream.
        Io(::std::io::Error);
        // A JSON document could not be parsed or generated.
        Json(::serde_json::Error);
        // A YAML document could not be parsed or generated.
        Yaml(::serde_yaml::Error);
    }

    // These are our "native" error types.
    errors {
        /// The value stored under `key` is missing or cannot be decoded.
        /// For structured documents, `key` names the record instead.
        Schema(key: String, message: String) {
            description("cannot decode network metadata")
            display("cannot decode '{}': {}", &key, &message)
        }

        /// A value violates one of the invariants of a network or
        /// endpoint.
        Validation(message: String) {
            description("invalid network metadata")
            display("invalid network metadata: {}", &message)
        }

        /// A field was mutated in a way its scope does not allow.
        InvalidState(message: String) {
            description("illegal change to network metadata")
            display("illegal change to network metadata: {}", &message)
        }

        /// A string could not be parsed as the type we wanted.
        InvalidValue(wanted: String, input: String) {
            description("invalid value")
            display("invalid {}: <{}>", &wanted, &input)
        }

        /// An error occurred reading a file.
        ReadFile(path: PathBuf) {
            description("error reading file")
            display("error reading file '{}'", path.display())
        }

        /// An error occurred writing a file.
        WriteFile(path: PathBuf) {
            description("error writing to file")
            display("error writing to file '{}'", path.display())
        }
    }
}

impl Error {
    /// Create an error for a key whose value is missing or unparseable.
    pub fn schema<K, M>(key: K, message: M) -> Error
    where
        K: Into<String>,
        M: fmt::Display,
    {
        ErrorKind::Schema(key.into(), message.to_string()).into()
    }

    /// Create an error for a broken domain invariant.
    pub fn validation<M: fmt::Display>(message: M) -> Error {
        ErrorKind::Validation(message.to_string()).into()
    }

    /// Create an error for a mutation the field's scope forbids.
    pub fn invalid_state<M: fmt::Display>(message: M) -> Error {
        ErrorKind::InvalidState(message.to_string()).into()
    }

    /// Create an error, specifying the type we wanted, and the value we
    /// actually got.
    pub fn invalid_value<W, I>(wanted: W, input: I) -> Error
    where
        W: Into<String>,
        I: Into<String>,
    {
        ErrorKind::InvalidValue(wanted.into(), input.into()).into()
    }

    /// Wrap an error that happened while reading `path`.
    pub fn read_file<E>(path: PathBuf, err: E) -> Error
    where
        E: ::std::error::Error + Send + 'static,
    {
        Error::with_chain(err, ErrorKind::ReadFile(path))
    }

    /// Wrap an error that happened while writing `path`.
    pub fn write_file<E>(path: PathBuf, err: E) -> Error
    where
        E: ::std::error::Error + Send + 'static,
    {
        Error::with_chain(err, ErrorKind::WriteFile(path))
    }

    /// Is this a `Schema` error?
    pub fn is_schema(&self) -> bool {
        matches!(self.kind(), ErrorKind::Schema(..))
    }

    /// Is this a `Validation` error?
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation(..))
    }

    /// Is this an `InvalidState` error?
    pub fn is_invalid_state(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidState(..))
    }
}

#[test]
fn helper_constructors_produce_the_matching_kind() {
    assert!(Error::schema("pcislot", "not an integer").is_schema());
    assert!(Error::validation("first_ip > last_ip").is_validation());
    assert!(Error::invalid_state("already assigned").is_invalid_state());
    assert!(!Error::invalid_value("IP address", "x").is_schema());
}

#[test]
fn schema_errors_name_the_offending_key() {
    let err = Error::schema("pcislot", "invalid digit found in string");
    assert_eq!(
        err.to_string(),
        "cannot decode 'pcislot': invalid digit found in string"
    );
}
