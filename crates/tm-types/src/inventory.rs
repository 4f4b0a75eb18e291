use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedTypeError;
use crate::network::MacAddr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub resource_name: String,
    pub power_type: String,
    #[serde(default)]
    pub power_user: Option<String>,
    pub power_pass: String,
    pub power_address: String,
    pub pxe_mac_address: MacAddr,
    pub id_path: String,
    /// Partition resource names, in declaration order.
    #[serde(default)]
    pub partition_schema: Vec<String>,
    /// NIC resource names, in declaration order.
    #[serde(default)]
    pub nics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partition {
    pub resource_name: String,
    pub size_gigabytes: u64,
    pub fs_type: String,
    pub label: String,
    #[serde(default)]
    pub bootable: bool,
    #[serde(default)]
    pub mount_point: String,
}

/// Link mode of a network interface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NicMode {
    Static,
    Dhcp,
    Auto,
    LinkUp,
}

impl NicMode {
    /// Value expected by the provider's `mode` attribute.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            NicMode::Static => "STATIC",
            NicMode::Dhcp => "DHCP",
            NicMode::Auto => "AUTO",
            NicMode::LinkUp => "LINK_UP",
        }
    }
}

impl FromStr for NicMode {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(NicMode::Static),
            "dynamic" | "dhcp" => Ok(NicMode::Dhcp),
            "auto" => Ok(NicMode::Auto),
            "link_up" | "link-up" => Ok(NicMode::LinkUp),
            _ => Err(SharedTypeError::InvalidValue {
                field: "mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nic {
    pub resource_name: String,
    pub name: String,
    pub mac_address: MacAddr,
    #[serde(default)]
    pub vlan: Option<u16>,
    pub mode: NicMode,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub default_gateway: bool,
    pub subnet: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Nic {
    /// Address to pin on the link; only static links carry one.
    pub fn static_address(&self) -> Option<&str> {
        match (self.mode, self.ip_address.as_deref()) {
            (NicMode::Static, Some(addr)) if !addr.trim().is_empty() => Some(addr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub resource_name: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// A machine joined with the partitions and NICs it references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineBundle {
    pub machine: Machine,
    pub partitions: Vec<Partition>,
    pub nics: Vec<Nic>,
}

impl MachineBundle {
    /// Sum of partition sizes, `None` when it does not fit in a `u64`.
    pub fn total_size_gigabytes(&self) -> Option<u64> {
        self.partitions
            .iter()
            .try_fold(0u64, |total, p| total.checked_add(p.size_gigabytes))
    }
}
