//! Helper functions and types we use for (de)serialization.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Nameserver lists may be written either as a list or, for the common
/// case of a single server, as a bare string:
///
/// ```yaml
/// dns: 8.8.8.8
/// ```
///
/// Both forms deserialize to a `Vec<IpAddr>`.
pub fn deserialize_ip_or_list<'de, D>(deserializer: D) -> Result<Vec<IpAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    /// Declare an internal visitor type to handle our input.
    struct IpOrListVisitor;

    impl<'de> Visitor<'de> for IpOrListVisitor {
        type Value = Vec<IpAddr>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "an IP address or a list of IP addresses")
        }

        // Handle a single item.
        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let ip = parse_ip(value).map_err(E::custom)?;
            Ok(vec![ip])
        }

        // Handle a list of items.
        fn visit_seq<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
        where
            V: SeqAccess<'de>,
        {
            let mut items = vec![];
            while let Some(item) = visitor.next_element::<String>()? {
                items.push(parse_ip(&item).map_err(<V::Error as de::Error>::custom)?);
            }
            Ok(items)
        }
    }

    deserializer.deserialize_any(IpOrListVisitor)
}

/// Parse an IP address, producing a message naming the bad input.
pub fn parse_ip(s: &str) -> Result<IpAddr, String> {
    IpAddr::from_str(s.trim()).map_err(|_| format!("invalid IP address: <{}>", s))
}

/// The address one step past `ip` in its family, or `None` at the top of
/// the address space.  Used by unit tests.
#[cfg(test)]
pub fn next_ip(ip: IpAddr) -> Option<IpAddr> {
    match ip {
        IpAddr::V4(v4) => u32::from(v4).checked_add(1).map(|n| IpAddr::V4(n.into())),
        IpAddr::V6(v6) => u128::from(v6).checked_add(1).map(|n| IpAddr::V6(n.into())),
    }
}

/// The address one step before `ip` in its family, or `None` at the
/// bottom of the address space.  Used by unit tests.
#[cfg(test)]
pub fn prev_ip(ip: IpAddr) -> Option<IpAddr> {
    match ip {
        IpAddr::V4(v4) => u32::from(v4).checked_sub(1).map(|n| IpAddr::V4(n.into())),
        IpAddr::V6(v6) => u128::from(v6).checked_sub(1).map(|n| IpAddr::V6(n.into())),
    }
}

#[test]
fn dns_may_be_a_single_address_or_a_list() {
    #[derive(Debug, serde::Deserialize)]
    struct Dns {
        #[serde(deserialize_with = "deserialize_ip_or_list")]
        dns: Vec<IpAddr>,
    }

    let single: Dns = serde_yaml::from_str("dns: 8.8.8.8").unwrap();
    assert_eq!(single.dns, vec![IpAddr::from_str("8.8.8.8").unwrap()]);

    let list: Dns = serde_yaml::from_str("dns: [\"8.8.8.8\", \"::1\"]").unwrap();
    assert_eq!(list.dns.len(), 2);
    assert!(list.dns[1].is_ipv6());

    assert!(serde_yaml::from_str::<Dns>("dns: [\"8.8.8.x\"]").is_err());
}

#[test]
fn stepping_addresses_stops_at_the_edges() {
    let ip = |s: &str| IpAddr::from_str(s).unwrap();
    assert_eq!(next_ip(ip("10.0.0.254")), Some(ip("10.0.0.255")));
    assert_eq!(next_ip(ip("10.0.0.255")), Some(ip("10.0.1.0")));
    assert_eq!(prev_ip(ip("10.0.0.2")), Some(ip("10.0.0.1")));
    assert_eq!(next_ip(ip("255.255.255.255")), None);
    assert_eq!(prev_ip(ip("::")), None);
}
