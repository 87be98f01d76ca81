use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::common::*;
use super::container_network::{ContainerNetwork, NetworkRecord};
use super::identity::{self, Common};
use super::key_value::{self, KeyValue, Reader, Writer};
use super::policy::{Reassignment, ValidationPolicy};
use super::schema::{Field, Schema};
use super::stored::{self, Stored};
use super::version::SchemaVersion;

/// A network presence in the form of a vNIC, in enough detail that it can
/// be:
///
/// 1. created, by adding the vNIC to a VM,
/// 2. identified, so the guest can tell which interface it corresponds to,
/// 3. configured, so the guest can set the interface up correctly.
///
/// Only the assigned address may change after construction; everything
/// else is exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EndpointRecord", into = "EndpointRecord")]
pub struct NetworkEndpoint {
    common: Common,
    static_ip: Option<IpNetwork>,
    assigned: Option<IpAddr>,
    pci_slot: i32,
    network: ContainerNetwork,
}

pub(crate) const STATIC_IP: Field =
    Field::read_only("static_ip", "staticip", SchemaVersion::V0_1).optional();
pub(crate) const ASSIGNED: Field =
    Field::read_write("assigned", "ip", SchemaVersion::V0_1).optional();
pub(crate) const PCI_SLOT: Field = Field::read_only("pci_slot", "pcislot", SchemaVersion::V0_1);
pub(crate) const NETWORK: Field = Field::read_only("network", "network", SchemaVersion::V0_1);

const FIELDS: &[Field] = &[
    identity::ID,
    identity::NAME,
    STATIC_IP,
    ASSIGNED,
    PCI_SLOT,
    NETWORK,
];

impl Schema for NetworkEndpoint {
    const RECORD: &'static str = "network endpoint";

    fn fields() -> &'static [Field] {
        FIELDS
    }
}

impl NetworkEndpoint {
    /// Create an endpoint, checking it against the default
    /// `ValidationPolicy`.  A `static_ip` of `None` means the address will
    /// come from DHCP.
    pub fn new(
        common: Common,
        static_ip: Option<IpNetwork>,
        pci_slot: i32,
        network: ContainerNetwork,
    ) -> Result<NetworkEndpoint> {
        NetworkEndpoint::with_policy(
            common,
            static_ip,
            pci_slot,
            network,
            &ValidationPolicy::default(),
        )
    }

    /// Create an endpoint, checking it against `policy`.
    pub fn with_policy(
        common: Common,
        static_ip: Option<IpNetwork>,
        pci_slot: i32,
        network: ContainerNetwork,
        policy: &ValidationPolicy,
    ) -> Result<NetworkEndpoint> {
        network.validate(policy)?;
        if let Some(static_ip) = static_ip {
            if policy.require_static_in_range && !network.contains(static_ip.ip()) {
                return Err(Error::validation(format!(
                    "static address {} of '{}' lies outside network '{}' range {}-{}",
                    static_ip.ip(),
                    common.name,
                    network.name(),
                    network.first_ip(),
                    network.last_ip()
                )));
            }
        }
        Ok(NetworkEndpoint {
            common,
            static_ip,
            assigned: None,
            pci_slot,
            network,
        })
    }

    /// The identity of this endpoint.
    pub fn common(&self) -> &Common {
        &self.common
    }

    /// The identifier used for in-guest correlation.
    pub fn id(&self) -> &str {
        &self.common.id
    }

    /// The interface alias.
    pub fn name(&self) -> &str {
        &self.common.name
    }

    /// The statically configured address and mask, if any.
    pub fn static_ip(&self) -> Option<IpNetwork> {
        self.static_ip
    }

    /// Will this endpoint get its address from DHCP?
    pub fn is_dhcp(&self) -> bool {
        self.static_ip.is_none()
    }

    /// The address actually in effect, once one has been assigned.
    pub fn assigned(&self) -> Option<IpAddr> {
        self.assigned
    }

    /// The PCI slot of the vNIC.
    pub fn pci_slot(&self) -> i32 {
        self.pci_slot
    }

    /// The network in which this endpoint's fields are interpreted.
    pub fn network(&self) -> &ContainerNetwork {
        &self.network
    }

    /// Record the address the interface ended up with, rejecting a
    /// conflicting second address.  See `assign_with_policy`.
    pub fn assign(&mut self, ip: IpAddr) -> Result<bool> {
        self.assign_with_policy(ip, &ValidationPolicy::default())
    }

    /// Record the address the interface ended up with.  Returns whether
    /// anything changed.
    ///
    /// Assigning the address already in effect is a no-op.  Assigning a
    /// different one is an `InvalidState` error unless `policy` allows
    /// overwriting.
    pub fn assign_with_policy(&mut self, ip: IpAddr, policy: &ValidationPolicy) -> Result<bool> {
        match self.assigned {
            Some(current) if current == ip => Ok(false),
            Some(current) => match policy.reassignment {
                Reassignment::Reject => Err(Error::invalid_state(format!(
                    "'{}' already has address {}, refusing {}",
                    self.common.name, current, ip
                ))),
                Reassignment::Overwrite => {
                    warn!(
                        "replacing address {} of '{}' with {}",
                        current, self.common.name, ip
                    );
                    self.assigned = Some(ip);
                    Ok(true)
                }
            },
            None => {
                info!("'{}' assigned address {}", self.common.name, ip);
                self.assigned = Some(ip);
                Ok(true)
            }
        }
    }

    /// Replace the assigned address without consulting any policy.  Used
    /// by callers that have already proven they hold the latest value.
    pub(crate) fn replace_assigned(&mut self, ip: IpAddr) {
        self.assigned = Some(ip);
    }

    /// Update a field identified by its stable key, parsing `value` as the
    /// field's type.  Keys of the nested network use the same `network/`
    /// prefix as the flat encoding.  Only read-write fields may be updated;
    /// anything else is an `InvalidState` error, and an unknown key is a
    /// `Schema` error.
    ///
    /// ```
    /// # use vnic_metadata::metadata as md;
    /// # let network = md::ContainerNetwork::new(
    /// #     "bridge", "10.0.0.1/24".parse().unwrap(), true, vec![],
    /// #     "10.0.0.2".parse().unwrap(), "10.0.0.254".parse().unwrap()).unwrap();
    /// let mut endpoint = md::NetworkEndpoint::new(
    ///     md::Common::new("id", "eth0"), None, 32, network).unwrap();
    /// let policy = md::ValidationPolicy::default();
    /// endpoint.set("ip", "10.0.0.9", &policy).unwrap();
    /// assert!(endpoint.set("pcislot", "33", &policy).is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str, policy: &ValidationPolicy) -> Result<bool> {
        let mut parts = key.splitn(2, key_value::NESTED_SEPARATOR);
        let top = parts.next().unwrap_or(key);
        let field = NetworkEndpoint::field_by_key(top)
            .ok_or_else(|| Error::schema(key, format!("no such key in {}", Self::RECORD)))?;
        let field = match parts.next() {
            None => field,
            Some(nested) if field.key == NETWORK.key => ContainerNetwork::field_by_key(nested)
                .ok_or_else(|| {
                    Error::schema(key, format!("no such key in {}", ContainerNetwork::RECORD))
                })?,
            Some(_) => return Err(Error::schema(key, format!("'{}' has no nested keys", top))),
        };
        if !field.scope.is_writable() {
            return Err(Error::invalid_state(format!(
                "key '{}' is {} and cannot be changed",
                key, field.scope
            )));
        }
        match field.name {
            "assigned" => {
                let ip = parse_ip(value).map_err(|msg| Error::schema(key, msg))?;
                self.assign_with_policy(ip, policy)
            }
            other => Err(Error::invalid_state(format!(
                "no update path for field '{}'",
                other
            ))),
        }
    }

    /// Read an endpoint from an input stream containing YAML, checking it
    /// against the default `ValidationPolicy`.
    pub fn read<R>(r: R) -> Result<Self>
    where
        R: io::Read,
    {
        Self::read_with_policy(r, &ValidationPolicy::default())
    }

    /// Read an endpoint from an input stream containing YAML, checking it
    /// against `policy`.  A document that cannot be parsed is a `Schema`
    /// error; an endpoint that breaks an invariant is a `Validation` error.
    pub fn read_with_policy<R>(r: R, policy: &ValidationPolicy) -> Result<Self>
    where
        R: io::Read,
    {
        stored::from_yaml_reader(r, policy)
    }

    /// Write an endpoint to an output stream as YAML.
    pub fn write<W>(&self, w: &mut W) -> Result<()>
    where
        W: io::Write,
    {
        Ok(serde_yaml::to_writer(w, self)?)
    }

    /// Read an endpoint from the specified path.  Failing to open the file
    /// is a `ReadFile` error; its contents fail the same way as `read`.
    pub fn read_from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::read_from_path_with_policy(path, &ValidationPolicy::default())
    }

    /// Read an endpoint from the specified path, checking it against
    /// `policy`.
    pub fn read_from_path_with_policy<P>(path: P, policy: &ValidationPolicy) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = fs::File::open(path).map_err(|err| Error::read_file(path.to_owned(), err))?;
        Self::read_with_policy(io::BufReader::new(f), policy)
    }

    /// Write an endpoint to the specified path.
    pub fn write_to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = fs::File::create(path).map_err(|err| Error::write_file(path.to_owned(), err))?;
        let mut w = io::BufWriter::new(f);
        self.write(&mut w)
            .map_err(|err| Error::write_file(path.to_owned(), err))?;
        w.flush().map_err(|err| Error::write_file(path.to_owned(), err))
    }
}

impl FromStr for NetworkEndpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<NetworkEndpoint> {
        Self::read(io::Cursor::new(s))
    }
}

/// Fail if more than one distinct network among `endpoints` wants to be
/// the default route.  Several endpoints on the same default network are
/// fine.
pub fn check_single_default(endpoints: &[NetworkEndpoint]) -> Result<()> {
    let defaults: BTreeSet<&str> = endpoints
        .iter()
        .map(|e| e.network())
        .filter(|n| n.is_default())
        .map(|n| n.name())
        .collect();
    if defaults.len() > 1 {
        let names: Vec<&str> = defaults.into_iter().collect();
        return Err(Error::validation(format!(
            "more than one default network: {}",
            names.join(", ")
        )));
    }
    Ok(())
}

impl KeyValue for NetworkEndpoint {
    fn write_fields(&self, w: &mut Writer<'_>) {
        self.common.write_fields(w);
        w.optional(&STATIC_IP, self.static_ip.as_ref());
        w.optional(&ASSIGNED, self.assigned.as_ref());
        w.value(&PCI_SLOT, &self.pci_slot);
        w.record(&NETWORK, &self.network);
    }

    fn read_fields(r: &Reader<'_>) -> Result<NetworkEndpoint> {
        let common = Common::read_fields(r)?;
        let static_ip = r.optional(&STATIC_IP)?;
        let assigned = r.optional(&ASSIGNED)?;
        let pci_slot = r.value(&PCI_SLOT)?;
        let network = r.record(&NETWORK)?;
        let mut endpoint =
            NetworkEndpoint::with_policy(common, static_ip, pci_slot, network, r.policy())?;
        endpoint.assigned = assigned;
        Ok(endpoint)
    }
}

/// The stored shape of a `NetworkEndpoint`.  The identity is flattened
/// into the endpoint's own keys, while the network is nested.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointRecord {
    #[serde(rename = "id")]
    id: String,
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "staticip", default, skip_serializing_if = "Option::is_none")]
    static_ip: Option<IpNetwork>,
    #[serde(rename = "ip", default, skip_serializing_if = "Option::is_none")]
    assigned: Option<IpAddr>,
    #[serde(rename = "pcislot")]
    pci_slot: i32,
    #[serde(rename = "network")]
    network: NetworkRecord,
}

impl Stored for NetworkEndpoint {
    type Record = EndpointRecord;

    fn from_record(record: EndpointRecord, policy: &ValidationPolicy) -> Result<NetworkEndpoint> {
        let common = Common::new(record.id, record.name);
        let network = ContainerNetwork::from_record(record.network, policy)?;
        let mut endpoint =
            NetworkEndpoint::with_policy(common, record.static_ip, record.pci_slot, network, policy)?;
        endpoint.assigned = record.assigned;
        Ok(endpoint)
    }
}

impl TryFrom<EndpointRecord> for NetworkEndpoint {
    type Error = Error;

    fn try_from(record: EndpointRecord) -> Result<NetworkEndpoint> {
        NetworkEndpoint::from_record(record, &ValidationPolicy::default())
    }
}

impl From<NetworkEndpoint> for EndpointRecord {
    fn from(endpoint: NetworkEndpoint) -> EndpointRecord {
        EndpointRecord {
            id: endpoint.common.id,
            name: endpoint.common.name,
            static_ip: endpoint.static_ip,
            assigned: endpoint.assigned,
            pci_slot: endpoint.pci_slot,
            network: endpoint.network.into(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_endpoint() -> NetworkEndpoint {
    NetworkEndpoint::new(
        Common::new("eth0-id", "eth0"),
        Some(IpNetwork::from_str("10.0.0.50/24").unwrap()),
        32,
        super::container_network::bridge(),
    )
    .unwrap()
}

#[cfg(test)]
fn endpoint_with_static(ip: &str) -> Result<NetworkEndpoint> {
    NetworkEndpoint::new(
        Common::new("eth0-id", "eth0"),
        Some(IpNetwork::from_str(&format!("{}/24", ip)).unwrap()),
        32,
        super::container_network::bridge(),
    )
}

#[test]
fn network_endpoint_can_be_roundtripped() {
    let yaml = r#"---
id: "eth0-id"
name: eth0
staticip: 10.0.0.50/24
ip: 10.0.0.50
pcislot: 32
network:
  name: bridge
  gateway: 10.0.0.1/24
  default: true
  dns:
    - 8.8.8.8
  first_ip: 10.0.0.2
  last_ip: 10.0.0.254
"#;
    assert_roundtrip!(NetworkEndpoint, yaml);
}

#[test]
fn network_endpoint_serializes_with_declared_keys() {
    let value = serde_json::to_value(sample_endpoint()).unwrap();
    assert_eq!(value["name"], "eth0");
    assert_eq!(value["staticip"], "10.0.0.50/24");
    assert_eq!(value["pcislot"], 32);
    assert_eq!(value["network"]["name"], "bridge");
    assert_eq!(value["network"]["gateway"], "10.0.0.1/24");
    assert_eq!(value["network"]["default"], true);
    assert_eq!(value["network"]["dns"], serde_json::json!(["8.8.8.8"]));

    let mut endpoint = sample_endpoint();
    endpoint.assign(IpAddr::from_str("10.0.0.50").unwrap()).unwrap();
    let value = serde_json::to_value(&endpoint).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    let mut expected = NetworkEndpoint::keys();
    expected.sort();
    assert_eq!(keys, expected);
}

#[test]
fn network_endpoint_survives_json() {
    let mut endpoint = sample_endpoint();
    endpoint.assign(IpAddr::from_str("10.0.0.50").unwrap()).unwrap();
    let json = super::to_json(&endpoint).unwrap();
    let back: NetworkEndpoint = super::from_json(&json).unwrap();
    assert_eq!(back, endpoint);
}

#[test]
fn dhcp_endpoints_have_no_static_address() {
    let endpoint = NetworkEndpoint::new(
        Common::new("eth1-id", "eth1"),
        None,
        33,
        super::container_network::bridge(),
    )
    .unwrap();
    assert!(endpoint.is_dhcp());
    let value = serde_json::to_value(&endpoint).unwrap();
    assert!(value.get("staticip").is_none());
    assert!(value.get("ip").is_none());
}

#[test]
fn static_address_must_be_inside_the_network_range() {
    let net = super::container_network::bridge();
    let first = net.first_ip();
    let last = net.last_ip();
    let below = prev_ip(first).unwrap();
    let above = next_ip(last).unwrap();

    assert!(endpoint_with_static(&first.to_string()).is_ok());
    assert!(endpoint_with_static(&last.to_string()).is_ok());
    assert!(endpoint_with_static(&below.to_string()).unwrap_err().is_validation());
    assert!(endpoint_with_static(&above.to_string()).unwrap_err().is_validation());
    assert!(endpoint_with_static("192.168.1.10").unwrap_err().is_validation());
}

#[test]
fn static_range_check_can_be_disabled() {
    let endpoint = NetworkEndpoint::with_policy(
        Common::new("eth0-id", "eth0"),
        Some(IpNetwork::from_str("192.168.1.10/24").unwrap()),
        32,
        super::container_network::bridge(),
        &ValidationPolicy::permissive(),
    )
    .unwrap();
    assert_eq!(endpoint.static_ip().unwrap().ip(), IpAddr::from_str("192.168.1.10").unwrap());
}

#[test]
fn deserializing_checks_the_static_range() {
    let yaml = r#"---
id: "eth0-id"
name: eth0
staticip: 10.0.1.50/24
pcislot: 32
network:
  name: bridge
  gateway: 10.0.0.1/24
  default: true
  first_ip: 10.0.0.2
  last_ip: 10.0.0.254
"#;
    assert!(NetworkEndpoint::from_str(yaml).unwrap_err().is_validation());
    let policy = ValidationPolicy {
        require_static_in_range: false,
        ..ValidationPolicy::default()
    };
    let endpoint = NetworkEndpoint::read_with_policy(io::Cursor::new(yaml), &policy).unwrap();
    assert_eq!(endpoint.static_ip().unwrap().to_string(), "10.0.1.50/24");
}

#[test]
fn structured_decode_errors_are_classified() {
    let json = r#"{"id":"eth0-id","name":"eth0","pcislot":"thirty-two","network":{
        "name":"bridge","gateway":"10.0.0.1/24","default":true,
        "first_ip":"10.0.0.2","last_ip":"10.0.0.254"}}"#;
    assert!(super::from_json::<NetworkEndpoint>(json).unwrap_err().is_schema());

    let json = r#"{"id":"eth0-id","name":"eth0","pcislot":32}"#;
    assert!(super::from_json::<NetworkEndpoint>(json).unwrap_err().is_schema());

    let json = r#"{"id":"eth0-id","name":"eth0","staticip":"10.0.1.50/24","pcislot":32,
        "network":{"name":"bridge","gateway":"10.0.0.1/24","default":true,
        "first_ip":"10.0.0.2","last_ip":"10.0.0.254"}}"#;
    assert!(super::from_json::<NetworkEndpoint>(json).unwrap_err().is_validation());

    assert!(NetworkEndpoint::from_str("pcislot: [32]\n").unwrap_err().is_schema());
    assert!(NetworkEndpoint::from_str("not: [valid").unwrap_err().is_schema());
}

#[test]
fn endpoints_built_under_a_policy_round_trip_under_it() {
    let policy = ValidationPolicy::permissive();
    let mut endpoint = NetworkEndpoint::with_policy(
        Common::new("eth0-id", "eth0"),
        Some(IpNetwork::from_str("192.168.1.10/24").unwrap()),
        32,
        super::container_network::bridge(),
        &policy,
    )
    .unwrap();
    endpoint.assign(IpAddr::from_str("192.168.1.10").unwrap()).unwrap();

    let json = super::to_json(&endpoint).unwrap();
    let back: NetworkEndpoint = super::from_json_with_policy(&json, &policy).unwrap();
    assert_eq!(back, endpoint);
    assert!(super::from_json::<NetworkEndpoint>(&json).unwrap_err().is_validation());

    let mut yaml = vec![];
    endpoint.write(&mut yaml).unwrap();
    let back = NetworkEndpoint::read_with_policy(&yaml[..], &policy).unwrap();
    assert_eq!(back, endpoint);

    let flat = key_value::encode(&endpoint);
    let back: NetworkEndpoint = key_value::decode_with_policy(&flat, &policy).unwrap();
    assert_eq!(back, endpoint);
}

#[test]
fn assigning_moves_from_unassigned_to_assigned_once() {
    let ip = IpAddr::from_str("10.0.0.50").unwrap();
    let other = IpAddr::from_str("10.0.0.51").unwrap();
    let mut endpoint = sample_endpoint();
    assert_eq!(endpoint.assigned(), None);

    assert!(endpoint.assign(ip).unwrap());
    assert_eq!(endpoint.assigned(), Some(ip));

    // Idempotent.
    let before = endpoint.clone();
    assert!(!endpoint.assign(ip).unwrap());
    assert_eq!(endpoint, before);

    let err = endpoint.assign(other).unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(endpoint.assigned(), Some(ip));
}

#[test]
fn overwrite_policy_replaces_the_assigned_address() {
    let other = IpAddr::from_str("10.0.0.51").unwrap();
    let mut endpoint = sample_endpoint();
    endpoint.assign(IpAddr::from_str("10.0.0.50").unwrap()).unwrap();
    let policy = ValidationPolicy::permissive();
    assert!(endpoint.assign_with_policy(other, &policy).unwrap());
    assert_eq!(endpoint.assigned(), Some(other));
}

#[test]
fn only_read_write_keys_can_be_set() {
    let policy = ValidationPolicy::default();
    let mut endpoint = sample_endpoint();
    for key in &["staticip", "pcislot", "network", "network/gateway", "name", "id"] {
        let err = endpoint.set(key, "10.0.0.9", &policy).unwrap_err();
        assert!(err.is_invalid_state(), "{} gave {}", key, err);
    }
    assert!(endpoint.set("mac", "x", &policy).unwrap_err().is_schema());
    for key in &["ip/anything", "pcislot/x", "network/mtu", "network/gateway/ip"] {
        let err = endpoint.set(key, "10.0.0.9", &policy).unwrap_err();
        assert!(err.is_schema(), "{} gave {}", key, err);
    }
    assert_eq!(endpoint.assigned(), None);
    assert!(endpoint.set("ip", "not-an-ip", &policy).unwrap_err().is_schema());

    assert!(endpoint.set("ip", "10.0.0.9", &policy).unwrap());
    assert_eq!(endpoint.assigned(), Some(IpAddr::from_str("10.0.0.9").unwrap()));
    assert_eq!(endpoint, {
        let mut expected = sample_endpoint();
        expected.assign(IpAddr::from_str("10.0.0.9").unwrap()).unwrap();
        expected
    });
}

#[test]
fn descriptor_scopes_match_the_mutable_fields() {
    use super::scope::Scope;
    let writable: Vec<&str> = NetworkEndpoint::fields()
        .iter()
        .filter(|f| f.scope == Scope::ReadWrite)
        .map(|f| f.key)
        .collect();
    assert_eq!(writable, vec!["ip"]);
    assert!(ContainerNetwork::fields().iter().all(|f| f.scope == Scope::ReadOnly));
    assert!(NetworkEndpoint::fields().iter().all(|f| f.version == SchemaVersion::V0_1));
}

#[test]
fn only_one_default_network_per_container() {
    let gateway = IpNetwork::from_str("172.16.0.1/16").unwrap();
    let second = |default: bool| {
        let net = ContainerNetwork::new(
            "backend",
            gateway,
            default,
            vec![],
            IpAddr::from_str("172.16.0.2").unwrap(),
            IpAddr::from_str("172.16.255.254").unwrap(),
        )
        .unwrap();
        NetworkEndpoint::new(Common::new("eth1-id", "eth1"), None, 33, net).unwrap()
    };

    let ok = vec![sample_endpoint(), second(false), sample_endpoint()];
    assert!(check_single_default(&ok).is_ok());

    let clash = vec![sample_endpoint(), second(true)];
    assert!(check_single_default(&clash).unwrap_err().is_validation());
    assert!(ValidationPolicy::default().validate_container(&clash).is_err());
    assert!(ValidationPolicy::permissive().validate_container(&clash).is_ok());
}

#[test]
fn network_endpoint_writes_yaml() {
    let mut out = vec![];
    sample_endpoint().write(&mut out).unwrap();
    let written: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str(
        r#"---
id: "eth0-id"
name: eth0
staticip: 10.0.0.50/24
pcislot: 32
network:
  name: bridge
  gateway: 10.0.0.1/24
  default: true
  dns: ["8.8.8.8"]
  first_ip: 10.0.0.2
  last_ip: 10.0.0.254
"#,
    )
    .unwrap();
    assert_eq!(written, expected);
}

#[test]
fn network_endpoint_can_be_written_to_and_read_from_a_file() {
    let path = std::env::temp_dir().join(format!("vnic-endpoint-{}.yml", std::process::id()));
    let mut endpoint = sample_endpoint();
    endpoint.assign(IpAddr::from_str("10.0.0.50").unwrap()).unwrap();
    endpoint.write_to_path(&path).unwrap();
    let back = NetworkEndpoint::read_from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(back, endpoint);
}

#[cfg(target_os = "linux")]
#[test]
fn failing_to_flush_is_a_write_error() {
    let err = sample_endpoint().write_to_path("/dev/full").unwrap_err();
    match err.kind() {
        ErrorKind::WriteFile(p) => assert_eq!(p, Path::new("/dev/full")),
        other => panic!("unexpected error: {}", other),
    }
}
