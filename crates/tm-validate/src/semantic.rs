//! Semantic validation for terraform documents

use std::collections::HashSet;

use hcl::expr::{Traversal, TraversalOperator};
use hcl::{Block, Body, Expression, Identifier};
use log::warn;

use terramaas_core::error::ValidationError;
use terramaas_core::{Result, TerramaasError};

/// Semantic validator: provider count, block names and references
#[derive(Debug, Default)]
pub struct SemanticValidator;

impl SemanticValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a parsed document, returning warnings on success
    pub fn validate_body(&self, body: &Body) -> Result<Vec<String>> {
        let blocks: Vec<&Block> = body.blocks().collect();
        let warnings = self.validate_singletons(&blocks)?;
        self.validate_names(&blocks)?;
        self.validate_unique_addresses(&blocks)?;
        self.validate_references(&blocks)?;
        Ok(warnings)
    }

    fn validate_singletons(&self, blocks: &[&Block]) -> Result<Vec<String>> {
        let providers = count_kind(blocks, "provider");
        if providers == 0 {
            return Err(TerramaasError::Validation(ValidationError::Document {
                message: "no provider block".to_string(),
            }));
        }
        if providers > 1 {
            return Err(TerramaasError::Validation(ValidationError::Duplicate {
                message: format!("{} provider blocks", providers),
            }));
        }

        let mut warnings = Vec::new();
        match count_kind(blocks, "terraform") {
            0 => {
                let message =
                    "no terraform settings block, provider source is not pinned".to_string();
                warn!("{}", message);
                warnings.push(message);
            }
            1 => {}
            _ => {
                return Err(TerramaasError::Validation(ValidationError::Duplicate {
                    message: "more than one terraform settings block".to_string(),
                }));
            }
        }
        Ok(warnings)
    }

    /// Terraform resource and data names must be identifiers
    fn validate_names(&self, blocks: &[&Block]) -> Result<()> {
        let invalid: Vec<String> = blocks
            .iter()
            .filter(|block| address(block).is_some())
            .filter_map(|block| block.labels().get(1))
            .map(|label| label.as_str())
            .filter(|name| Identifier::new(*name).is_err())
            .map(|name| format!("'{}'", name))
            .collect();

        if !invalid.is_empty() {
            return Err(TerramaasError::Validation(ValidationError::Document {
                message: format!("invalid block names: {}", invalid.join(", ")),
            }));
        }
        Ok(())
    }

    fn validate_unique_addresses(&self, blocks: &[&Block]) -> Result<()> {
        let mut seen = HashSet::new();
        let duplicates: Vec<String> = blocks
            .iter()
            .filter_map(|block| address(block))
            .filter(|address| !seen.insert(address.clone()))
            .collect();

        if !duplicates.is_empty() {
            return Err(TerramaasError::Validation(ValidationError::Duplicate {
                message: duplicates.join(", "),
            }));
        }
        Ok(())
    }

    /// Every reference must name a block defined earlier in the document
    fn validate_references(&self, blocks: &[&Block]) -> Result<()> {
        let mut defined: HashSet<String> = HashSet::new();
        let mut errors = Vec::new();

        for block in blocks {
            let owner = address(block).unwrap_or_else(|| block.identifier().to_string());
            let mut references = References::default();
            references.body(block.body());

            for problem in references.problems {
                errors.push(format!("{}: {}", owner, problem));
            }
            for target in references.targets {
                if !defined.contains(&target) {
                    errors.push(format!(
                        "{} references '{}' before it is defined",
                        owner, target
                    ));
                }
            }

            if let Some(address) = address(block) {
                defined.insert(address);
            }
        }

        if !errors.is_empty() {
            return Err(TerramaasError::Validation(ValidationError::Reference {
                message: errors.join("; "),
            }));
        }
        Ok(())
    }
}

fn count_kind(blocks: &[&Block], kind: &str) -> usize {
    blocks.iter().filter(|b| b.identifier() == kind).count()
}

/// Traversal prefix other blocks use to reference this one
fn address(block: &Block) -> Option<String> {
    match (block.identifier(), block.labels()) {
        ("resource", [ty, name]) => Some(format!("{}.{}", ty.as_str(), name.as_str())),
        ("data", [ty, name]) => Some(format!("data.{}.{}", ty.as_str(), name.as_str())),
        _ => None,
    }
}

/// Block addresses referenced from a body, plus expressions the generator
/// never emits
#[derive(Default)]
struct References {
    targets: Vec<String>,
    problems: Vec<String>,
}

impl References {
    fn body(&mut self, body: &Body) {
        for attribute in body.attributes() {
            self.expression(attribute.expr());
        }
        for block in body.blocks() {
            self.body(block.body());
        }
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Traversal(traversal) => self.traversal(traversal),
            Expression::Array(items) => {
                for item in items {
                    self.expression(item);
                }
            }
            Expression::Object(entries) => {
                for (_, value) in entries {
                    self.expression(value);
                }
            }
            Expression::Variable(variable) => self
                .problems
                .push(format!("bare variable '{}'", variable.as_str())),
            Expression::TemplateExpr(_) => self
                .problems
                .push("string template in a generated value".to_string()),
            _ => {}
        }
    }

    /// `<type>.<name>.<attr>` or `data.<type>.<name>.<attr>`
    fn traversal(&mut self, traversal: &Traversal) {
        let Expression::Variable(root) = &traversal.expr else {
            self.problems.push("traversal without a root name".to_string());
            return;
        };

        let mut segments = vec![root.as_str()];
        segments.extend(traversal.operators.iter().map_while(|op| match op {
            TraversalOperator::GetAttr(ident) => Some(ident.as_str()),
            _ => None,
        }));

        let address_len = if root.as_str() == "data" { 3 } else { 2 };
        if segments.len() <= address_len {
            self.problems
                .push(format!("incomplete reference '{}'", segments.join(".")));
            return;
        }
        self.targets.push(segments[..address_len].join("."));
    }
}
