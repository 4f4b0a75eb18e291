//! Terraform settings and provider blocks

use terramaas_config::Credentials;
use terramaas_core::{Block, Value};

pub const PROVIDER_NAME: &str = "maas";
pub const PROVIDER_SOURCE: &str = "maas/maas";
pub const PROVIDER_VERSION: &str = "~>1.0";
pub const API_VERSION: &str = "2.0";

/// `terraform { required_providers { maas = {...} } }`
pub fn terraform_block() -> Block {
    Block::new("terraform").block(Block::new("required_providers").attr(
        PROVIDER_NAME,
        Value::Map(vec![
            ("source".to_string(), PROVIDER_SOURCE.into()),
            ("version".to_string(), PROVIDER_VERSION.into()),
        ]),
    ))
}

pub fn provider_block(credentials: &Credentials) -> Block {
    Block::provider(PROVIDER_NAME)
        .attr("api_version", API_VERSION)
        .attr("api_key", credentials.api_key.as_str())
        .attr("api_url", credentials.api_url.as_str())
}
