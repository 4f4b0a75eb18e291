//! Error types for terramaas operations

use thiserror::Error;

/// Main error type for terramaas operations
#[derive(Debug, Error)]
pub enum TerramaasError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Input sheet and credential errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Either an API key and URL or an API config file must be provided")]
    MissingCredentials,

    #[error("Error reading credential file {path}: {message}")]
    CredentialFile { path: String, message: String },

    #[error("Header row not found: no row has '{sentinel}' in column 2")]
    HeaderNotFound { sentinel: String },

    #[error("Missing required column '{column}' in {sheet} sheet")]
    MissingColumn { sheet: String, column: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Duplicate resource name '{name}' in {sheet} sheet")]
    DuplicateRecord { sheet: String, name: String },

    #[error("{owner} references unknown {kind} '{name}'")]
    UnresolvedReference {
        kind: String,
        name: String,
        owner: String,
    },
}

/// Generated document validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unresolved reference: {message}")]
    Reference { message: String },

    #[error("Duplicate block: {message}")]
    Duplicate { message: String },

    #[error("Invalid document: {message}")]
    Document { message: String },
}

/// Workspace and terraform invocation errors
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("{path} already exists, run destroy first or use update")]
    OutputConflict { path: String },

    #[error("No terraform state found in {dir}")]
    NoStateFound { dir: String },

    #[error("Command '{command}' failed with exit code {exit_code:?}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}
