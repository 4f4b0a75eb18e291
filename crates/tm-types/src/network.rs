use std::str::FromStr;

use ipnet::IpNet;
use mac_address::MacAddress;
use serde::{Deserialize, Serialize};

use crate::error::SharedTypeError;

/// Fabrics that exist on every MAAS region and must never be created.
pub const IMPLICIT_FABRICS: [&str; 2] = ["default", "fabric-1"];

pub fn is_implicit_fabric(name: &str) -> bool {
    IMPLICIT_FABRICS.contains(&name)
}

/// Space name derived from a topology row label.
pub fn space_name(label: &str) -> String {
    format!("{}-space", label.replace(' ', "-"))
}

pub fn vlan_name(vid: u16) -> String {
    format!("vlan-{}", vid)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vlan {
    pub vid: u16,
    pub name: String,
    pub fabric: String,
    pub space: String,
    pub mtu: u32,
}

impl Vlan {
    pub const DEFAULT_MTU: u32 = 1500;

    pub fn new(vid: u16, fabric: String, space: String, mtu: u32) -> Self {
        Self {
            vid,
            name: vlan_name(vid),
            fabric,
            space,
            mtu,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subnet {
    pub name: String,
    pub fabric: String,
    pub vlan: String,
    pub cidr: String,
    pub gateway_ip: String,
    #[serde(default)]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub ip_ranges: Vec<IpRange>,
}

impl Subnet {
    /// Parsed CIDR, if the cell holds one.
    pub fn network(&self) -> Option<IpNet> {
        self.cidr.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IpRangeKind {
    Dynamic,
    Reserved,
}

impl std::fmt::Display for IpRangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpRangeKind::Dynamic => write!(f, "dynamic"),
            IpRangeKind::Reserved => write!(f, "reserved"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpRange {
    pub kind: IpRangeKind,
    pub start_ip: String,
    pub end_ip: String,
}

impl IpRange {
    pub fn new(kind: IpRangeKind, start_ip: impl Into<String>, end_ip: impl Into<String>) -> Self {
        Self {
            kind,
            start_ip: start_ip.into(),
            end_ip: end_ip.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacAddr(pub MacAddress);

struct MacAddrVisitor;

impl<'de> serde::de::Visitor<'de> for MacAddrVisitor {
    type Value = MacAddr;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a MAC address string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse::<MacAddress>()
            .map(MacAddr)
            .map_err(|_| E::custom(format!("invalid MAC address: {}", v)))
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(MacAddrVisitor)
    }
}

impl Serialize for MacAddr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl FromStr for MacAddr {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<MacAddress>()
            .map(MacAddr)
            .map_err(|_| SharedTypeError::InvalidValue {
                field: "mac_address",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // MAAS reports MACs in lower case; keep plans free of case-only diffs.
        write!(f, "{}", self.0.to_string().to_lowercase())
    }
}
