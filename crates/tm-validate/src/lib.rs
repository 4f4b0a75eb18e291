//! Terramaas Validate
//!
//! Checks a rendered terraform document before it is written: the text must
//! parse, carry exactly one provider, define every address once and only
//! reference blocks that appear earlier.

pub mod semantic;
pub mod syntax;

pub use semantic::SemanticValidator;
pub use syntax::SyntaxValidator;

use log::info;

use terramaas_core::{Block, HclWriter, Result};

/// Outcome of a successful validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub blocks: usize,
    pub resources: usize,
    pub warnings: Vec<String>,
}

/// Syntax then semantic validation of a whole document
#[derive(Debug, Default)]
pub struct DocumentValidator {
    syntax_validator: SyntaxValidator,
    semantic_validator: SemanticValidator,
}

impl DocumentValidator {
    pub fn new() -> Self {
        Self {
            syntax_validator: SyntaxValidator::new(),
            semantic_validator: SemanticValidator::new(),
        }
    }

    /// Validate document text
    pub fn validate(&self, text: &str) -> Result<ValidationReport> {
        let body = self.syntax_validator.parse(text)?;
        let warnings = self.semantic_validator.validate_body(&body)?;

        let report = ValidationReport {
            blocks: body.blocks().count(),
            resources: body
                .blocks()
                .filter(|b| b.identifier() == "resource")
                .count(),
            warnings,
        };

        info!(
            "Document validation passed: {} blocks, {} resources, {} warnings",
            report.blocks,
            report.resources,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Render blocks and validate the resulting text
    pub fn validate_blocks(&self, blocks: &[Block]) -> Result<ValidationReport> {
        self.validate(&HclWriter::new().write_document(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terramaas_config::sheet::Row;
    use terramaas_config::{Credentials, Inventory, NetworkTopology};
    use terramaas_core::error::ValidationError;
    use terramaas_core::{Machine, MachineBundle, Nic, NicMode, Partition, TerramaasError, User};
    use terramaas_render::TerraformScript;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Row {
        row(&[
            "Network",
            "CIDR",
            "Gateway",
            "VLAN",
            "MTU",
            "Fabric",
            "Dynamic Range",
            "Reserved Range",
        ])
    }

    fn script() -> TerraformScript {
        let topology = NetworkTopology::from_rows(&[
            header(),
            row(&[
                "Lab net",
                "10.0.0.0/24",
                "10.0.0.1",
                "10",
                "9000",
                "default",
                "10.0.0.10-10.0.0.20",
                "",
            ]),
        ])
        .unwrap();

        let inventory = Inventory {
            machines: vec![MachineBundle {
                machine: Machine {
                    resource_name: "node1".into(),
                    power_type: "ipmi".into(),
                    power_user: Some("admin".into()),
                    power_pass: "p\"w".into(),
                    power_address: "10.1.0.5".into(),
                    pxe_mac_address: "00:11:22:33:44:55".parse().unwrap(),
                    id_path: "/dev/sda".into(),
                    partition_schema: vec!["root".into()],
                    nics: vec!["node1-eth0".into()],
                },
                partitions: vec![Partition {
                    resource_name: "root".into(),
                    size_gigabytes: 40,
                    fs_type: "ext4".into(),
                    label: "root".into(),
                    bootable: true,
                    mount_point: "/".into(),
                }],
                nics: vec![Nic {
                    resource_name: "node1-eth0".into(),
                    name: "eth0".into(),
                    mac_address: "00:11:22:33:44:55".parse().unwrap(),
                    vlan: Some(10),
                    mode: NicMode::Static,
                    ip_address: Some("10.0.0.50".into()),
                    default_gateway: true,
                    subnet: "Lab-net".into(),
                    tags: vec!["prod".into()],
                }],
            }],
        };
        let users = vec![User {
            resource_name: "ops".into(),
            password: "${not-a-template}".into(),
            email: "ops@example.com".into(),
            is_admin: false,
        }];

        TerraformScript::assemble(
            &Credentials::new("key", "http://maas:5240/MAAS"),
            &topology,
            &inventory,
            &users,
        )
    }

    #[test]
    fn test_assembled_script_validates() {
        let script = script();
        let report = DocumentValidator::new()
            .validate(&script.render())
            .unwrap();

        assert_eq!(report.blocks, script.blocks().len());
        assert_eq!(report.resources, script.resource_count());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_parsed_blocks_match_rendered_blocks() {
        let script = script();
        let body = SyntaxValidator::new().parse(&script.render()).unwrap();

        let parsed: Vec<(String, Vec<String>)> = body
            .blocks()
            .map(|b| {
                let labels = b.labels().iter().map(|l| l.as_str().to_string()).collect();
                (b.identifier().to_string(), labels)
            })
            .collect();
        let rendered: Vec<(String, Vec<String>)> = script
            .blocks()
            .iter()
            .map(|b| (b.kind.clone(), b.labels.clone()))
            .collect();
        assert_eq!(parsed, rendered);
    }

    #[test]
    fn test_blank_fabric_document_rejected() {
        let topology = NetworkTopology::from_rows(&[
            header(),
            row(&["Lab", "10.0.0.0/24", "", "10", "", "", "", ""]),
        ])
        .unwrap();
        let script = TerraformScript::assemble(
            &Credentials::new("key", "http://maas:5240/MAAS"),
            &topology,
            &Inventory::default(),
            &[],
        );

        let err = DocumentValidator::new()
            .validate(&script.render())
            .unwrap_err();
        assert!(matches!(
            err,
            TerramaasError::Validation(ValidationError::Syntax { .. })
        ));
        assert!(err.to_string().contains("maas_fabric..id"), "{}", err);
    }

    #[test]
    fn test_label_starting_with_digit_rejected() {
        let topology = NetworkTopology::from_rows(&[
            header(),
            row(&["10G net", "10.0.0.0/24", "", "10", "", "fab-a", "", ""]),
        ])
        .unwrap();
        let script = TerraformScript::assemble(
            &Credentials::new("key", "http://maas:5240/MAAS"),
            &topology,
            &Inventory::default(),
            &[],
        );

        let result = DocumentValidator::new().validate(&script.render());
        assert!(matches!(
            result,
            Err(TerramaasError::Validation(ValidationError::Syntax { .. }))
        ));
    }

    #[test]
    fn test_reordered_document_rejected() {
        let mut blocks = script().blocks().to_vec();
        let last = blocks.len() - 1;
        // VLAN moved behind the subnets that reference it
        let vlan_at = blocks
            .iter()
            .position(|b| b.labels.first().map(String::as_str) == Some("maas_vlan"))
            .unwrap();
        let vlan = blocks.remove(vlan_at);
        blocks.insert(last, vlan);

        let err = DocumentValidator::new()
            .validate_blocks(&blocks)
            .unwrap_err();
        assert!(matches!(
            err,
            TerramaasError::Validation(ValidationError::Reference { .. })
        ));
    }
}
