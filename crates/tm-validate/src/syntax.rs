//! Syntax validation for terraform documents

use hcl::Body;
use log::debug;

use terramaas_core::error::ValidationError;
use terramaas_core::{Result, TerramaasError};

/// Parses document text with the HCL parser
#[derive(Debug, Default)]
pub struct SyntaxValidator;

impl SyntaxValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parse a whole document. Terraform files only allow blocks at the top
    /// level.
    pub fn parse(&self, text: &str) -> Result<Body> {
        let body = hcl::parse(text).map_err(syntax_error)?;

        if let Some(attribute) = body.attributes().next() {
            return Err(TerramaasError::Validation(ValidationError::Document {
                message: format!("unexpected top-level attribute '{}'", attribute.key()),
            }));
        }

        debug!("Parsed {} top-level blocks", body.blocks().count());
        Ok(body)
    }
}

fn syntax_error(err: hcl::Error) -> TerramaasError {
    let error = match err {
        hcl::Error::Parse(parse) => ValidationError::Syntax {
            line: parse.location().line(),
            message: format!("{} in `{}`", parse.message(), parse.line().trim()),
        },
        other => ValidationError::Syntax {
            line: 0,
            message: other.to_string(),
        },
    };
    TerramaasError::Validation(error)
}
