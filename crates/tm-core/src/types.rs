//! Core record types

use crate::error::{ConfigError, TerramaasError};
use terramaas_types::SharedTypeError;

pub use terramaas_types::{
    IpRange, IpRangeKind, MacAddr, Machine, MachineBundle, Nic, NicMode, Partition, Subnet, User,
    Vlan,
};

impl From<SharedTypeError> for TerramaasError {
    fn from(err: SharedTypeError) -> Self {
        match err {
            SharedTypeError::InvalidValue { field, value } => {
                TerramaasError::Configuration(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                })
            }
        }
    }
}
