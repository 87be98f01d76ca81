use std::convert::TryFrom;

use super::common::*;
use super::key_value::{KeyValue, Reader, Writer};
use super::policy::ValidationPolicy;
use super::schema::{Field, Schema};
use super::stored::Stored;
use super::version::SchemaVersion;

/// The data both the infrastructure and the guest need about a network:
/// the former to attach an interface to the right network, the latter to
/// configure that interface correctly.
///
/// All fields are read-only once the network has been constructed, so
/// they are only exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord", into = "NetworkRecord")]
pub struct ContainerNetwork {
    name: String,
    gateway: IpNetwork,
    default: bool,
    nameservers: Vec<IpAddr>,
    first_ip: IpAddr,
    last_ip: IpAddr,
}

pub(crate) const NAME: Field = Field::read_only("name", "name", SchemaVersion::V0_1);
pub(crate) const GATEWAY: Field = Field::read_only("gateway", "gateway", SchemaVersion::V0_1);
pub(crate) const DEFAULT: Field = Field::read_only("default", "default", SchemaVersion::V0_1);
pub(crate) const NAMESERVERS: Field =
    Field::read_only("nameservers", "dns", SchemaVersion::V0_1).optional();
pub(crate) const FIRST_IP: Field = Field::read_only("first_ip", "first_ip", SchemaVersion::V0_1);
pub(crate) const LAST_IP: Field = Field::read_only("last_ip", "last_ip", SchemaVersion::V0_1);

const FIELDS: &[Field] = &[NAME, GATEWAY, DEFAULT, NAMESERVERS, FIRST_IP, LAST_IP];

impl Schema for ContainerNetwork {
    const RECORD: &'static str = "container network";

    fn fields() -> &'static [Field] {
        FIELDS
    }
}

impl ContainerNetwork {
    /// Create a network, checking it against the default
    /// `ValidationPolicy`.
    ///
    /// ```
    /// use vnic_metadata::metadata as md;
    /// let net = md::ContainerNetwork::new(
    ///     "bridge",
    ///     "10.0.0.1/24".parse().unwrap(),
    ///     true,
    ///     vec![],
    ///     "10.0.0.2".parse().unwrap(),
    ///     "10.0.0.254".parse().unwrap(),
    /// ).unwrap();
    /// assert_eq!(net.gateway_ip().to_string(), "10.0.0.1");
    /// ```
    pub fn new<S: Into<String>>(
        name: S,
        gateway: IpNetwork,
        default: bool,
        nameservers: Vec<IpAddr>,
        first_ip: IpAddr,
        last_ip: IpAddr,
    ) -> Result<ContainerNetwork> {
        ContainerNetwork::with_policy(
            name,
            gateway,
            default,
            nameservers,
            first_ip,
            last_ip,
            &ValidationPolicy::default(),
        )
    }

    /// Create a network, checking it against `policy`.
    pub fn with_policy<S: Into<String>>(
        name: S,
        gateway: IpNetwork,
        default: bool,
        nameservers: Vec<IpAddr>,
        first_ip: IpAddr,
        last_ip: IpAddr,
        policy: &ValidationPolicy,
    ) -> Result<ContainerNetwork> {
        let network = ContainerNetwork {
            name: name.into(),
            gateway,
            default,
            nameservers,
            first_ip,
            last_ip,
        };
        network.validate(policy)?;
        Ok(network)
    }

    /// Check the invariants of this network.  The bounds of the range must
    /// always be ordered and of one address family; the gateway is only
    /// checked when `policy` asks for it.
    pub fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        if self.first_ip.is_ipv4() != self.last_ip.is_ipv4() {
            return Err(Error::validation(format!(
                "network '{}' mixes address families in range {}-{}",
                self.name, self.first_ip, self.last_ip
            )));
        }
        if self.first_ip > self.last_ip {
            return Err(Error::validation(format!(
                "network '{}' has first_ip {} after last_ip {}",
                self.name, self.first_ip, self.last_ip
            )));
        }
        if policy.require_gateway_outside_range && self.contains(self.gateway.ip()) {
            return Err(Error::validation(format!(
                "gateway {} of network '{}' lies inside the assignable range {}-{}",
                self.gateway.ip(),
                self.name,
                self.first_ip,
                self.last_ip
            )));
        }
        Ok(())
    }

    /// The symbolic name of the network.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The network scope addresses belong to.  Its address is the default
    /// gateway.
    pub fn gateway(&self) -> IpNetwork {
        self.gateway
    }

    /// The address of the default gateway.
    pub fn gateway_ip(&self) -> IpAddr {
        self.gateway.ip()
    }

    /// Should this network's gateway be the container's default route?
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// The nameservers for this network, in order of preference.  May be
    /// empty.
    pub fn nameservers(&self) -> &[IpAddr] {
        &self.nameservers
    }

    /// The first assignable address, inclusive.
    pub fn first_ip(&self) -> IpAddr {
        self.first_ip
    }

    /// The last assignable address, inclusive.
    pub fn last_ip(&self) -> IpAddr {
        self.last_ip
    }

    /// Does `ip` lie within `[first_ip, last_ip]`?  Addresses of the other
    /// family never do.
    pub fn contains(&self, ip: IpAddr) -> bool {
        ip.is_ipv4() == self.first_ip.is_ipv4() && self.first_ip <= ip && ip <= self.last_ip
    }

    /// The number of addresses in the assignable range.
    pub fn range_size(&self) -> u128 {
        match (self.first_ip, self.last_ip) {
            (IpAddr::V4(first), IpAddr::V4(last)) => {
                u128::from(u32::from(last)) - u128::from(u32::from(first)) + 1
            }
            (IpAddr::V6(first), IpAddr::V6(last)) => {
                // The full IPv6 space would overflow by one.
                (u128::from(last) - u128::from(first)).saturating_add(1)
            }
            _ => 0,
        }
    }
}

impl KeyValue for ContainerNetwork {
    fn write_fields(&self, w: &mut Writer<'_>) {
        w.value(&NAME, &self.name);
        w.value(&GATEWAY, &self.gateway);
        w.value(&DEFAULT, &self.default);
        w.list(&NAMESERVERS, &self.nameservers);
        w.value(&FIRST_IP, &self.first_ip);
        w.value(&LAST_IP, &self.last_ip);
    }

    fn read_fields(r: &Reader<'_>) -> Result<ContainerNetwork> {
        ContainerNetwork::with_policy(
            r.value::<String>(&NAME)?,
            r.value(&GATEWAY)?,
            r.value(&DEFAULT)?,
            r.list(&NAMESERVERS)?,
            r.value(&FIRST_IP)?,
            r.value(&LAST_IP)?,
            r.policy(),
        )
    }
}

/// The stored shape of a `ContainerNetwork`.  Field keys here must match
/// the descriptor table above.
#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "gateway")]
    gateway: IpNetwork,
    #[serde(rename = "default")]
    default: bool,
    #[serde(rename = "dns", default, deserialize_with = "deserialize_ip_or_list")]
    nameservers: Vec<IpAddr>,
    #[serde(rename = "first_ip")]
    first_ip: IpAddr,
    #[serde(rename = "last_ip")]
    last_ip: IpAddr,
}

impl Stored for ContainerNetwork {
    type Record = NetworkRecord;

    fn from_record(record: NetworkRecord, policy: &ValidationPolicy) -> Result<ContainerNetwork> {
        ContainerNetwork::with_policy(
            record.name,
            record.gateway,
            record.default,
            record.nameservers,
            record.first_ip,
            record.last_ip,
            policy,
        )
    }
}

impl TryFrom<NetworkRecord> for ContainerNetwork {
    type Error = Error;

    fn try_from(record: NetworkRecord) -> Result<ContainerNetwork> {
        ContainerNetwork::from_record(record, &ValidationPolicy::default())
    }
}

impl From<ContainerNetwork> for NetworkRecord {
    fn from(network: ContainerNetwork) -> NetworkRecord {
        NetworkRecord {
            name: network.name,
            gateway: network.gateway,
            default: network.default,
            nameservers: network.nameservers,
            first_ip: network.first_ip,
            last_ip: network.last_ip,
        }
    }
}

#[cfg(test)]
pub(crate) fn bridge() -> ContainerNetwork {
    ContainerNetwork::new(
        "bridge",
        IpNetwork::from_str("10.0.0.1/24").unwrap(),
        true,
        vec![IpAddr::from_str("8.8.8.8").unwrap()],
        IpAddr::from_str("10.0.0.2").unwrap(),
        IpAddr::from_str("10.0.0.254").unwrap(),
    )
    .unwrap()
}

#[test]
fn container_network_can_be_roundtripped() {
    let yaml = r#"---
name: bridge
gateway: 10.0.0.1/24
default: true
dns:
  - 8.8.8.8
  - 8.8.4.4
first_ip: 10.0.0.2
last_ip: 10.0.0.254
"#;
    assert_roundtrip!(ContainerNetwork, yaml);
}

#[test]
fn container_network_serializes_with_declared_keys() {
    let value = serde_json::to_value(bridge()).unwrap();
    assert_eq!(value["name"], "bridge");
    assert_eq!(value["gateway"], "10.0.0.1/24");
    assert_eq!(value["default"], true);
    assert_eq!(value["dns"], serde_json::json!(["8.8.8.8"]));
    assert_eq!(value["first_ip"], "10.0.0.2");
    assert_eq!(value["last_ip"], "10.0.0.254");

    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    let mut expected = ContainerNetwork::keys();
    expected.sort();
    assert_eq!(keys, expected);
}

#[test]
fn container_network_accepts_a_single_nameserver_string() {
    let yaml = r#"---
name: bridge
gateway: 10.0.0.1/24
default: false
dns: 8.8.8.8
first_ip: 10.0.0.2
last_ip: 10.0.0.254
"#;
    let net: ContainerNetwork = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(net.nameservers(), &[IpAddr::from_str("8.8.8.8").unwrap()]);
    assert!(!net.is_default());
}

#[test]
fn container_network_allows_missing_nameservers() {
    let yaml = r#"---
name: bridge
gateway: 10.0.0.1/24
default: false
first_ip: 10.0.0.2
last_ip: 10.0.0.254
"#;
    let net: ContainerNetwork = serde_yaml::from_str(yaml).unwrap();
    assert!(net.nameservers().is_empty());
}

#[test]
fn container_network_ignores_keys_from_newer_versions() {
    let yaml = r#"---
name: bridge
gateway: 10.0.0.1/24
default: true
first_ip: 10.0.0.2
last_ip: 10.0.0.254
mtu: 9000
"#;
    let net: ContainerNetwork = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(net.name(), "bridge");
}

#[test]
fn container_network_rejects_reversed_range() {
    let err = ContainerNetwork::new(
        "bridge",
        IpNetwork::from_str("10.0.0.1/24").unwrap(),
        false,
        vec![],
        IpAddr::from_str("10.0.0.200").unwrap(),
        IpAddr::from_str("10.0.0.100").unwrap(),
    )
    .unwrap_err();
    assert!(err.is_validation());

    let yaml = r#"---
name: bridge
gateway: 10.0.0.1/24
default: true
first_ip: 10.0.0.200
last_ip: 10.0.0.100
"#;
    assert!(serde_yaml::from_str::<ContainerNetwork>(yaml).is_err());
}

#[test]
fn container_network_rejects_mixed_families() {
    let err = ContainerNetwork::new(
        "bridge",
        IpNetwork::from_str("10.0.0.1/24").unwrap(),
        false,
        vec![],
        IpAddr::from_str("10.0.0.2").unwrap(),
        IpAddr::from_str("fd00::10").unwrap(),
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn gateway_inside_range_is_a_policy_decision() {
    let build = |policy: &ValidationPolicy| {
        ContainerNetwork::with_policy(
            "bridge",
            IpNetwork::from_str("10.0.0.1/24").unwrap(),
            false,
            vec![],
            IpAddr::from_str("10.0.0.1").unwrap(),
            IpAddr::from_str("10.0.0.254").unwrap(),
            policy,
        )
    };
    assert!(build(&ValidationPolicy::default()).is_ok());

    let strict = ValidationPolicy {
        require_gateway_outside_range: true,
        ..ValidationPolicy::default()
    };
    assert!(build(&strict).unwrap_err().is_validation());
}

#[test]
fn range_membership_is_inclusive() {
    let net = bridge();
    assert!(net.contains(IpAddr::from_str("10.0.0.2").unwrap()));
    assert!(net.contains(IpAddr::from_str("10.0.0.254").unwrap()));
    assert!(!net.contains(IpAddr::from_str("10.0.0.1").unwrap()));
    assert!(!net.contains(IpAddr::from_str("10.0.0.255").unwrap()));
    assert!(!net.contains(IpAddr::from_str("::ffff:10.0.0.50").unwrap()));
    assert_eq!(net.range_size(), 253);
}

#[test]
fn container_network_decode_errors_are_classified() {
    let json = r#"{"name":"bridge","gateway":"10.0.0.1/24","default":"yes",
        "first_ip":"10.0.0.2","last_ip":"10.0.0.254"}"#;
    let err = super::from_json::<ContainerNetwork>(json).unwrap_err();
    assert!(err.is_schema(), "{}", err);

    let json = r#"{"name":"bridge","gateway":"10.0.0.1/24","default":true,
        "first_ip":"10.0.0.200","last_ip":"10.0.0.100"}"#;
    let err = super::from_json::<ContainerNetwork>(json).unwrap_err();
    assert!(err.is_validation(), "{}", err);
}

#[test]
fn container_network_decodes_under_the_callers_policy() {
    let json = r#"{"name":"bridge","gateway":"10.0.0.1/24","default":true,
        "first_ip":"10.0.0.1","last_ip":"10.0.0.254"}"#;
    let strict = ValidationPolicy {
        require_gateway_outside_range: true,
        ..ValidationPolicy::default()
    };
    assert!(super::from_json::<ContainerNetwork>(json).is_ok());
    let err = super::from_json_with_policy::<ContainerNetwork>(json, &strict).unwrap_err();
    assert!(err.is_validation());
}
