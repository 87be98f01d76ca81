//! A flat key-value encoding of schema records.
//!
//! Configuration stores that only hold strings (hypervisor extra-config,
//! guest info variables and the like) cannot carry nested documents, so
//! records are flattened into a `BTreeMap<String, String>`:
//!
//! - Each field is stored under its declared key.
//! - Fields of a nested record are stored under the parent's key, a `/`
//!   and their own key, as in `network/gateway`.
//! - Lists are joined with `|` and omitted entirely when empty.
//! - Absent optional values are omitted.
//!
//! The encoder walks each record's descriptor table and can target an
//! older schema version, in which case newer fields are left out.  The
//! decoder ignores keys it does not know, so older readers can consume
//! maps written by newer ones.  Decoded records are checked against a
//! `ValidationPolicy`, the default one unless the caller passes its own.

use std::cell::RefCell;
use std::collections::BTreeSet;

use super::common::*;
use super::policy::ValidationPolicy;
use super::schema::{Field, Schema};
use super::version::SchemaVersion;

/// The separator between a nested record's key and its fields' keys.
pub const NESTED_SEPARATOR: &str = "/";

/// The separator between list items.
pub const LIST_SEPARATOR: char = '|';

/// A record that can be written to and read from a flat key-value map.
pub trait KeyValue: Schema + Sized {
    /// Write every field of this record.  The writer drops fields that are
    /// too new for its target version.
    fn write_fields(&self, w: &mut Writer<'_>);

    /// Rebuild a record from its fields.
    fn read_fields(r: &Reader<'_>) -> Result<Self>;
}

/// Encode `record` using the current schema version.
pub fn encode<T: KeyValue>(record: &T) -> BTreeMap<String, String> {
    encode_at(record, SchemaVersion::CURRENT)
}

/// Encode `record` for a consumer that understands `version`.
pub fn encode_at<T: KeyValue>(record: &T, version: SchemaVersion) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    {
        let mut writer = Writer {
            out: &mut out,
            prefix: String::new(),
            version,
        };
        record.write_fields(&mut writer);
    }
    trace!("encoded {} as {} keys at version {}", T::RECORD, out.len(), version);
    out
}

/// Decode a record from `map`.  Keys that do not belong to the record are
/// ignored.
pub fn decode<T: KeyValue>(map: &BTreeMap<String, String>) -> Result<T> {
    decode_with_policy(map, &ValidationPolicy::default())
}

/// Decode a record from `map`, checking it against `policy`.
pub fn decode_with_policy<T: KeyValue>(
    map: &BTreeMap<String, String>,
    policy: &ValidationPolicy,
) -> Result<T> {
    let seen = RefCell::new(BTreeSet::new());
    let record = {
        let reader = Reader {
            map,
            prefix: String::new(),
            seen: &seen,
            policy,
        };
        T::read_fields(&reader)?
    };
    let seen = seen.into_inner();
    for key in map.keys().filter(|k| !seen.contains(k.as_str())) {
        debug!("ignoring unknown key '{}' while decoding {}", key, T::RECORD);
    }
    Ok(record)
}

/// Collects the fields of a record into a flat map.
#[derive(Debug)]
pub struct Writer<'a> {
    out: &'a mut BTreeMap<String, String>,
    prefix: String,
    version: SchemaVersion,
}

impl<'a> Writer<'a> {
    /// Should `field` be written at all?
    fn visible(&self, field: &Field) -> bool {
        if self.version.understands(field.version) {
            true
        } else {
            debug!(
                "skipping key '{}{}' introduced in {}, target is {}",
                self.prefix, field.key, field.version, self.version
            );
            false
        }
    }

    fn put(&mut self, field: &Field, value: String) {
        let key = format!("{}{}", self.prefix, field.key);
        trace!("{} = {}", key, value);
        self.out.insert(key, value);
    }

    /// Write a single value.
    pub fn value<V: fmt::Display>(&mut self, field: &Field, value: &V) {
        if self.visible(field) {
            self.put(field, value.to_string());
        }
    }

    /// Write a value if it is present.
    pub fn optional<V: fmt::Display>(&mut self, field: &Field, value: Option<&V>) {
        if let Some(value) = value {
            self.value(field, value);
        }
    }

    /// Write a list of values, or nothing if the list is empty.
    pub fn list<V: fmt::Display>(&mut self, field: &Field, values: &[V]) {
        if values.is_empty() || !self.visible(field) {
            return;
        }
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string());
        self.put(field, joined);
    }

    /// Write a nested record under `field`'s key.
    pub fn record<R: KeyValue>(&mut self, field: &Field, record: &R) {
        if !self.visible(field) {
            return;
        }
        let mut nested = Writer {
            out: &mut *self.out,
            prefix: format!("{}{}{}", self.prefix, field.key, NESTED_SEPARATOR),
            version: self.version,
        };
        record.write_fields(&mut nested);
    }
}

/// Looks up the fields of a record in a flat map.
#[derive(Debug)]
pub struct Reader<'a> {
    map: &'a BTreeMap<String, String>,
    prefix: String,
    seen: &'a RefCell<BTreeSet<String>>,
    policy: &'a ValidationPolicy,
}

impl<'a> Reader<'a> {
    /// The policy records read from this map are checked against.
    pub fn policy(&self) -> &'a ValidationPolicy {
        self.policy
    }

    fn key(&self, field: &Field) -> String {
        format!("{}{}", self.prefix, field.key)
    }

    fn raw(&self, field: &Field) -> Option<&'a str> {
        let key = self.key(field);
        let raw = self.map.get(&key).map(|s| s.as_str());
        if raw.is_some() {
            self.seen.borrow_mut().insert(key);
        }
        raw
    }

    fn parse<V>(&self, field: &Field, raw: &str) -> Result<V>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        V::from_str(raw)
            .map_err(|err| Error::schema(self.key(field), format!("<{}>: {}", raw, err)))
    }

    /// Read a value which must be present.
    pub fn value<V>(&self, field: &Field) -> Result<V>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        match self.raw(field) {
            Some(raw) => self.parse(field, raw),
            None => Err(Error::schema(self.key(field), "missing required key")),
        }
    }

    /// Read a value which may be absent.  Required fields are still
    /// reported as missing.
    pub fn optional<V>(&self, field: &Field) -> Result<Option<V>>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        match self.raw(field) {
            Some(raw) => Ok(Some(self.parse(field, raw)?)),
            None if field.required => {
                Err(Error::schema(self.key(field), "missing required key"))
            }
            None => Ok(None),
        }
    }

    /// Read a list of values.  An absent optional list is empty.
    pub fn list<V>(&self, field: &Field) -> Result<Vec<V>>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        let raw = match self.raw(field) {
            Some(raw) => raw,
            None if field.required => {
                return Err(Error::schema(self.key(field), "missing required key"))
            }
            None => return Ok(vec![]),
        };
        raw.split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| self.parse(field, item))
            .collect()
    }

    /// Read a nested record stored under `field`'s key.
    pub fn record<R: KeyValue>(&self, field: &Field) -> Result<R> {
        let prefix = format!("{}{}{}", self.prefix, field.key, NESTED_SEPARATOR);
        if !self.map.keys().any(|k| k.starts_with(&prefix)) {
            return Err(Error::schema(self.key(field), "missing required key"));
        }
        let nested = Reader {
            map: self.map,
            prefix,
            seen: self.seen,
            policy: self.policy,
        };
        R::read_fields(&nested)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::container_network::bridge;
    use crate::metadata::network_endpoint::sample_endpoint;
    use crate::metadata::{Common, ContainerNetwork, NetworkEndpoint};

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn network_is_encoded_under_its_declared_keys() {
        let encoded = encode(&bridge());
        assert_eq!(
            encoded,
            map(&[
                ("default", "true"),
                ("dns", "8.8.8.8"),
                ("first_ip", "10.0.0.2"),
                ("gateway", "10.0.0.1/24"),
                ("last_ip", "10.0.0.254"),
                ("name", "bridge"),
            ])
        );
        assert_eq!(decode::<ContainerNetwork>(&encoded).unwrap(), bridge());
    }

    #[test]
    fn endpoint_nests_its_network() {
        let encoded = encode(&sample_endpoint());
        assert_eq!(encoded["id"], "eth0-id");
        assert_eq!(encoded["name"], "eth0");
        assert_eq!(encoded["staticip"], "10.0.0.50/24");
        assert_eq!(encoded["pcislot"], "32");
        assert_eq!(encoded["network/name"], "bridge");
        assert_eq!(encoded["network/gateway"], "10.0.0.1/24");
        assert_eq!(encoded["network/default"], "true");
        assert_eq!(encoded["network/dns"], "8.8.8.8");
        assert!(!encoded.contains_key("ip"));

        let decoded: NetworkEndpoint = decode(&encoded).unwrap();
        assert_eq!(decoded, sample_endpoint());
    }

    #[test]
    fn assigned_address_survives_encoding() {
        let mut endpoint = sample_endpoint();
        endpoint.assign(IpAddr::from_str("10.0.0.50").unwrap()).unwrap();
        let encoded = encode(&endpoint);
        assert_eq!(encoded["ip"], "10.0.0.50");
        assert_eq!(decode::<NetworkEndpoint>(&encoded).unwrap(), endpoint);
    }

    #[test]
    fn multiple_nameservers_are_joined() {
        let mut encoded = encode(&bridge());
        encoded.insert("dns".to_owned(), "8.8.8.8|2001:4860:4860::8888".to_owned());
        let net: ContainerNetwork = decode(&encoded).unwrap();
        assert_eq!(net.nameservers().len(), 2);
        assert_eq!(encode(&net)["dns"], "8.8.8.8|2001:4860:4860::8888");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut encoded = encode(&sample_endpoint());
        encoded.insert("mac".to_owned(), "00:50:56:00:00:01".to_owned());
        encoded.insert("network/mtu".to_owned(), "1500".to_owned());
        assert_eq!(decode::<NetworkEndpoint>(&encoded).unwrap(), sample_endpoint());
    }

    #[test]
    fn missing_required_keys_are_schema_errors() {
        let mut encoded = encode(&sample_endpoint());
        encoded.remove("pcislot");
        let err = decode::<NetworkEndpoint>(&encoded).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("'pcislot'"));

        let mut encoded = encode(&sample_endpoint());
        encoded.remove("network/gateway");
        let err = decode::<NetworkEndpoint>(&encoded).unwrap_err();
        assert!(err.to_string().contains("'network/gateway'"));

        let encoded: BTreeMap<String, String> = encode(&sample_endpoint())
            .into_iter()
            .filter(|(k, _)| !k.starts_with("network/"))
            .collect();
        let err = decode::<NetworkEndpoint>(&encoded).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("'network'"));
    }

    #[test]
    fn unparseable_values_are_schema_errors() {
        for (key, bad) in [
            ("pcislot", "thirty-two"),
            ("staticip", "10.0.0.50/99"),
            ("ip", "10.0.0"),
            ("network/default", "yes"),
            ("network/dns", "8.8.8.8|eight"),
        ] {
            let mut encoded = encode(&sample_endpoint());
            encoded.insert(key.to_owned(), bad.to_owned());
            let err = decode::<NetworkEndpoint>(&encoded).unwrap_err();
            assert!(err.is_schema(), "{} = {} gave {}", key, bad, err);
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn older_targets_omit_newer_fields() {
        let encoded = encode_at(&sample_endpoint(), SchemaVersion::new(0, 0));
        assert!(encoded.is_empty());
        let encoded = encode_at(&sample_endpoint(), SchemaVersion::V0_1);
        assert_eq!(encoded, encode(&sample_endpoint()));
    }

    #[test]
    fn records_built_under_a_policy_decode_under_it() {
        let policy = ValidationPolicy::permissive();
        let endpoint = NetworkEndpoint::with_policy(
            Common::new("eth0-id", "eth0"),
            Some(IpNetwork::from_str("192.168.1.10/24").unwrap()),
            32,
            bridge(),
            &policy,
        )
        .unwrap();
        let encoded = encode(&endpoint);

        let decoded: NetworkEndpoint = decode_with_policy(&encoded, &policy).unwrap();
        assert_eq!(decoded, endpoint);
        assert!(decode::<NetworkEndpoint>(&encoded).unwrap_err().is_validation());
    }

    #[test]
    fn the_policy_reaches_nested_records() {
        let strict = ValidationPolicy {
            require_gateway_outside_range: true,
            ..ValidationPolicy::default()
        };
        let mut encoded = encode(&sample_endpoint());
        encoded.insert("network/first_ip".to_owned(), "10.0.0.1".to_owned());
        assert!(decode::<NetworkEndpoint>(&encoded).is_ok());
        let err = decode_with_policy::<NetworkEndpoint>(&encoded, &strict).unwrap_err();
        assert!(err.is_validation());
    }
}
