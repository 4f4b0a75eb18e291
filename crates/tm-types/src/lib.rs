pub mod error;
pub mod inventory;
pub mod network;

pub use error::SharedTypeError;
pub use inventory::{Machine, MachineBundle, Nic, NicMode, Partition, User};
pub use network::{
    is_implicit_fabric, space_name, vlan_name, IpRange, IpRangeKind, MacAddr, Subnet, Vlan,
    IMPLICIT_FABRICS,
};
