//! VLAN id and MTU rules

use std::ops::RangeInclusive;

use crate::error::{ConfigError, TerramaasError};
use crate::types::Vlan;
use crate::Result;

/// Legal 802.1Q ids. MAAS uses 0 for the untagged VLAN of a fabric.
pub const VLAN_ID_RANGE: RangeInclusive<u16> = 0..=4094;

/// VLAN cell validation
pub struct VlanManager;

impl VlanManager {
    /// Parse a VLAN cell, returning the id when it is an integer within range
    pub fn parse_vid(cell: &str) -> Option<u16> {
        let value = cell.trim().parse::<i64>().ok()?;
        let vid = u16::try_from(value).ok()?;
        VLAN_ID_RANGE.contains(&vid).then_some(vid)
    }

    /// Parse a VLAN cell that must hold a valid id
    pub fn require_vid(field: &str, cell: &str) -> Result<u16> {
        Self::parse_vid(cell).ok_or_else(|| {
            TerramaasError::Configuration(ConfigError::InvalidValue {
                field: field.to_string(),
                value: cell.to_string(),
            })
        })
    }

    /// Parse an MTU cell, falling back to the provider default
    pub fn parse_mtu(cell: &str) -> u32 {
        let cell = cell.trim();
        if cell.is_empty() {
            return Vlan::DEFAULT_MTU;
        }
        match cell.parse::<u32>() {
            Ok(mtu) => mtu,
            Err(_) => {
                log::warn!(
                    "Invalid MTU '{}', using default {}",
                    cell,
                    Vlan::DEFAULT_MTU
                );
                Vlan::DEFAULT_MTU
            }
        }
    }
}
