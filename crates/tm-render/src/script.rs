//! Terraform script assembly
//!
//! Later blocks reference earlier ones by address, so the order here is
//! fixed: settings, provider, implicit fabric lookups, fabrics, spaces,
//! VLANs, subnets, machines (each with its disk and NICs), users.

use log::{info, warn};

use terramaas_config::{Credentials, Inventory, NetworkTopology};
use terramaas_core::{Block, HclWriter, User};

use crate::machine::machine_blocks;
use crate::network::{fabric_block, implicit_fabric_block, space_block, subnet_block, vlan_block};
use crate::provider::{provider_block, terraform_block};
use crate::user::user_block;

/// An ordered terraform document
#[derive(Debug, Clone)]
pub struct TerraformScript {
    blocks: Vec<Block>,
}

impl TerraformScript {
    /// Assemble every block in dependency order
    pub fn assemble(
        credentials: &Credentials,
        topology: &NetworkTopology,
        inventory: &Inventory,
        users: &[User],
    ) -> Self {
        let mut blocks = vec![terraform_block(), provider_block(credentials)];

        blocks.extend(
            topology
                .referenced_implicit_fabrics()
                .into_iter()
                .map(implicit_fabric_block),
        );
        blocks.extend(topology.managed_fabrics().map(fabric_block));
        blocks.extend(topology.spaces.iter().map(|space| space_block(space)));
        blocks.extend(topology.vlans.iter().map(vlan_block));
        blocks.extend(topology.subnets.iter().map(subnet_block));
        for bundle in &inventory.machines {
            blocks.extend(machine_blocks(bundle));
        }
        blocks.extend(users.iter().map(user_block));

        let script = Self { blocks };
        for address in script.invalid_names() {
            warn!(
                "{} is not a valid terraform name; the document will be rejected",
                address
            );
        }
        info!(
            "Assembled terraform script with {} resources",
            script.resource_count()
        );
        script
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Addresses whose name cannot appear in a reference such as
    /// `maas_space.<name>.id`
    pub fn invalid_names(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|block| {
                block
                    .labels
                    .get(1)
                    .is_some_and(|name| hcl::Identifier::new(name.as_str()).is_err())
            })
            .filter_map(Block::address)
            .collect()
    }

    /// Number of `resource` blocks
    pub fn resource_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.kind == "resource").count()
    }

    /// Render the document text
    pub fn render(&self) -> String {
        HclWriter::new().write_document(&self.blocks)
    }
}

impl std::fmt::Display for TerraformScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
