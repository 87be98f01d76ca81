//! Which domain invariants to enforce.
//!
//! The allocating system decides how strict it is about static addresses,
//! gateways and default routes, so those checks are configurable instead
//! of hard-coded.  A policy is usually loaded from YAML:
//!
//! ```yaml
//! require_static_in_range: true
//! require_gateway_outside_range: false
//! require_single_default: true
//! reassignment: reject
//! ```

use std::fs;
use std::io;
use std::path::Path;

use super::common::*;
use super::network_endpoint::{check_single_default, NetworkEndpoint};

/// What to do when an endpoint that already has an assigned address is
/// given a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reassignment {
    /// Refuse with an `InvalidState` error.
    Reject,
    /// Replace the old address.
    Overwrite,
}

impl Default for Reassignment {
    fn default() -> Self {
        Reassignment::Reject
    }
}

/// The set of checks applied when records are constructed or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationPolicy {
    /// A static address must lie within its network's assignable range.
    pub require_static_in_range: bool,

    /// A network's gateway must lie outside its assignable range.
    pub require_gateway_outside_range: bool,

    /// At most one network attached to a container may be the default.
    pub require_single_default: bool,

    /// How to treat a second, different assigned address.
    pub reassignment: Reassignment,
}

impl Default for ValidationPolicy {
    fn default() -> ValidationPolicy {
        ValidationPolicy {
            require_static_in_range: true,
            require_gateway_outside_range: false,
            require_single_default: true,
            reassignment: Reassignment::Reject,
        }
    }
}

impl ValidationPolicy {
    /// A policy which checks nothing optional and lets assigned addresses
    /// be overwritten.  Structural checks, such as an ordered address
    /// range, still apply.
    pub fn permissive() -> ValidationPolicy {
        ValidationPolicy {
            require_static_in_range: false,
            require_gateway_outside_range: false,
            require_single_default: false,
            reassignment: Reassignment::Overwrite,
        }
    }

    /// Check the invariants that span every endpoint of one container.
    pub fn validate_container(&self, endpoints: &[NetworkEndpoint]) -> Result<()> {
        if self.require_single_default {
            check_single_default(endpoints)?;
        }
        Ok(())
    }

    /// Read a policy from an input stream containing YAML.
    pub fn read<R>(r: R) -> Result<Self>
    where
        R: io::Read,
    {
        Ok(serde_yaml::from_reader(r)?)
    }

    /// Read a policy from the specified path.
    pub fn read_from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = fs::File::open(path).map_err(|err| Error::read_file(path.to_owned(), err))?;
        Self::read(io::BufReader::new(f)).map_err(|err| Error::read_file(path.to_owned(), err))
    }
}

impl FromStr for ValidationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<ValidationPolicy> {
        Self::read(io::Cursor::new(s))
    }
}

#[test]
fn policy_can_be_roundtripped() {
    let yaml = r#"---
require_static_in_range: false
require_gateway_outside_range: true
require_single_default: true
reassignment: overwrite
"#;
    assert_roundtrip!(ValidationPolicy, yaml);
}

#[test]
fn missing_policy_keys_use_defaults() {
    let policy = ValidationPolicy::from_str("reassignment: overwrite\n").unwrap();
    assert_eq!(policy.reassignment, Reassignment::Overwrite);
    assert!(policy.require_static_in_range);
    assert!(!policy.require_gateway_outside_range);
    assert!(policy.require_single_default);
}

#[test]
fn unknown_policy_keys_are_rejected() {
    assert!(ValidationPolicy::from_str("require_everything: true\n").is_err());
    assert!(ValidationPolicy::from_str("reassignment: sometimes\n").is_err());
}

#[test]
fn policy_can_be_read_from_a_file() {
    use std::io::Write;

    let path = std::env::temp_dir().join(format!("vnic-policy-{}.yml", std::process::id()));
    {
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "require_single_default: false").unwrap();
    }
    let policy = ValidationPolicy::read_from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert!(!policy.require_single_default);

    let err = ValidationPolicy::read_from_path(&path).unwrap_err();
    match err.kind() {
        ErrorKind::ReadFile(p) => assert_eq!(p, &path),
        other => panic!("unexpected error: {}", other),
    }
}
