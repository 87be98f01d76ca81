//! Strongly-typed metadata describing a virtual network interface (vNIC)
//! and the container network it is attached to.
//!
//! Every field of these records carries three pieces of metadata: the
//! schema version in which it was introduced, whether consumers may change
//! it after construction (its scope), and the stable key under which it is
//! stored.  The keys are the wire contract, so they never change even if
//! the Rust names do.
//!
//! Here's what building and encoding an endpoint looks like:
//!
//! ```
//! use std::str::FromStr;
//! use vnic_metadata::metadata as md;
//!
//! let network = md::ContainerNetwork::new(
//!     "bridge",
//!     md::IpNetwork::from_str("10.0.0.1/24").unwrap(),
//!     true,
//!     vec!["8.8.8.8".parse().unwrap()],
//!     "10.0.0.2".parse().unwrap(),
//!     "10.0.0.254".parse().unwrap(),
//! ).unwrap();
//!
//! let endpoint = md::NetworkEndpoint::new(
//!     md::Common::new("eth0-id", "eth0"),
//!     Some(md::IpNetwork::from_str("10.0.0.50/24").unwrap()),
//!     32,
//!     network,
//! ).unwrap();
//!
//! let flat = md::key_value::encode(&endpoint);
//! assert_eq!(flat["staticip"], "10.0.0.50/24");
//! assert_eq!(flat["pcislot"], "32");
//! assert_eq!(flat["network/gateway"], "10.0.0.1/24");
//!
//! let decoded: md::NetworkEndpoint = md::key_value::decode(&flat).unwrap();
//! assert_eq!(decoded, endpoint);
//! ```
//!
//! The endpoint's `assigned` address is the only field which may change
//! after construction.  See `metadata::NetworkEndpoint::assign` and
//! `metadata::SharedEndpoint`.

// Enable as many useful Rust and Clippy warnings as we can stand.
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    clippy::all
)]
// `error_chain!` recurses deeply.
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod errors;
pub mod metadata;
