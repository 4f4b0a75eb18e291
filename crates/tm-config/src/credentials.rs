//! MAAS API credentials
//!
//! Credentials come either from two direct values or from a YAML file with
//! `api_key` and `api_url`. When a file is given it takes precedence;
//! `TERRAMAAS_API_KEY` / `TERRAMAAS_API_URL` override the file's values.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use terramaas_core::error::ConfigError;
use terramaas_core::{Result, TerramaasError};

pub const ENV_PREFIX: &str = "TERRAMAAS";

#[derive(Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub api_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }

    /// Pick credentials from a config file or the direct values
    pub fn resolve(
        api_key: Option<&str>,
        api_url: Option<&str>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = config_file {
            return Self::load_from_file(path);
        }

        match (api_key, api_url) {
            (Some(key), Some(url)) => Ok(Self::new(key, url)),
            _ => Err(TerramaasError::Configuration(
                ConfigError::MissingCredentials,
            )),
        }
    }

    /// Load credentials from a YAML file with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading API credentials from {}", path.display());

        let file_error = |message: String| {
            TerramaasError::Configuration(ConfigError::CredentialFile {
                path: path.display().to_string(),
                message,
            })
        };

        if !path.is_file() {
            return Err(file_error("file not found".to_string()));
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| file_error(e.to_string()))?;

        settings
            .try_deserialize::<Credentials>()
            .map_err(|e| file_error(e.to_string()))
    }
}
