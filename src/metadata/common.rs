//! Imports shared by nearly every module in `metadata`.

pub use regex::Regex;
pub use serde::de;
pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
pub use std::collections::BTreeMap;
pub use std::fmt;
pub use std::net::IpAddr;
pub use std::str::FromStr;

pub use super::helpers::*;
pub use super::IpNetwork;
pub use crate::errors::*;
