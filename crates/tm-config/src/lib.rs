//! Terramaas Configuration
//!
//! Loads the CSV sheets describing the network topology and the machine
//! inventory into typed records, and resolves MAAS API credentials.

pub mod credentials;
pub mod inventory;
pub mod sheet;
pub mod topology;


pub use credentials::Credentials;
pub use inventory::{load_users, Inventory};
pub use sheet::{read_rows, read_source_rows, Row, Sheet, SheetSchema, SourceRow};
pub use topology::NetworkTopology;
