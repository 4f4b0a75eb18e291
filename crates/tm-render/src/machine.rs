//! Machine, block device and network interface blocks

use terramaas_core::{Block, Machine, MachineBundle, Nic, Partition, Value};
use terramaas_types::vlan_name;

use crate::resource_ref;

pub fn machine_block(machine: &Machine) -> Block {
    let mut power = Vec::new();
    if let Some(user) = &machine.power_user {
        power.push(("power_user".to_string(), Value::from(user.as_str())));
    }
    power.push(("power_pass".to_string(), machine.power_pass.as_str().into()));
    power.push((
        "power_address".to_string(),
        machine.power_address.as_str().into(),
    ));

    Block::resource("maas_machine", &machine.resource_name)
        .attr("power_type", machine.power_type.as_str())
        .attr("power_parameters", Value::Map(power))
        .attr("pxe_mac_address", machine.pxe_mac_address.to_string())
}

/// One block device holding every partition of the machine
pub fn block_device_block(bundle: &MachineBundle) -> Block {
    let machine = &bundle.machine;
    let mut block = Block::resource("maas_block_device", &machine.resource_name)
        .reference(
            "machine",
            resource_ref("maas_machine", &machine.resource_name, "id"),
        )
        .attr("name", machine.resource_name.as_str())
        .attr("id_path", machine.id_path.as_str())
        .attr_opt("size_gigabytes", bundle.total_size_gigabytes());

    for partition in &bundle.partitions {
        block = block.block(partition_block(partition));
    }
    block
}

fn partition_block(partition: &Partition) -> Block {
    let mount_point = Some(partition.mount_point.as_str()).filter(|m| !m.is_empty());

    Block::new("partitions")
        .attr("size_gigabytes", partition.size_gigabytes)
        .attr("fs_type", partition.fs_type.as_str())
        .attr("label", partition.label.as_str())
        .attr("bootable", partition.bootable)
        .attr_opt("mount_point", mount_point)
}

/// Physical interface and its subnet link
pub fn nic_blocks(machine: &Machine, nic: &Nic) -> (Block, Block) {
    let machine_id = resource_ref("maas_machine", &machine.resource_name, "id");

    let mut physical = Block::resource("maas_network_interface_physical", &nic.resource_name)
        .reference("machine", machine_id.clone())
        .attr("mac_address", nic.mac_address.to_string())
        .attr("name", nic.name.as_str());
    if let Some(vid) = nic.vlan {
        physical = physical.reference("vlan", resource_ref("maas_vlan", &vlan_name(vid), "id"));
    }
    physical = physical.string_list("tags", &nic.tags);

    let link = Block::resource("maas_network_interface_link", &nic.resource_name)
        .reference("machine", machine_id)
        .reference(
            "network_interface",
            resource_ref("maas_network_interface_physical", &nic.resource_name, "id"),
        )
        .reference("subnet", resource_ref("maas_subnet", &nic.subnet, "id"))
        .attr("mode", nic.mode.as_provider_str())
        .attr_opt("ip_address", nic.static_address())
        .attr("default_gateway", nic.default_gateway);

    (physical, link)
}

/// Machine followed by its block device and NIC pairs
pub fn machine_blocks(bundle: &MachineBundle) -> Vec<Block> {
    let mut blocks = vec![machine_block(&bundle.machine), block_device_block(bundle)];
    for nic in &bundle.nics {
        let (physical, link) = nic_blocks(&bundle.machine, nic);
        blocks.push(physical);
        blocks.push(link);
    }
    blocks
}
