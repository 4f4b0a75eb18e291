//! Terramaas Render
//!
//! Pure generators turning extracted records into MAAS provider blocks, and
//! the assembler that orders them into one terraform document.

pub mod machine;
pub mod network;
pub mod provider;
pub mod script;
pub mod user;

pub use script::TerraformScript;

/// `<type>.<name>.<attribute>` traversal to a resource
pub fn resource_ref(resource_type: &str, name: &str, attribute: &str) -> String {
    format!("{}.{}.{}", resource_type, name, attribute)
}

/// `data.<type>.<name>.<attribute>` traversal to a data source
pub fn data_ref(data_type: &str, name: &str, attribute: &str) -> String {
    format!("data.{}.{}.{}", data_type, name, attribute)
}
