//! Fabric, space, VLAN and subnet blocks

use terramaas_core::{Block, IpRange, Subnet, Vlan};
use terramaas_types::is_implicit_fabric;

use crate::{data_ref, resource_ref};

/// Reference to a fabric's id. Implicit fabrics resolve through a data source.
pub fn fabric_id(fabric: &str) -> String {
    if is_implicit_fabric(fabric) {
        data_ref("maas_fabric", fabric, "id")
    } else {
        resource_ref("maas_fabric", fabric, "id")
    }
}

pub fn fabric_block(name: &str) -> Block {
    Block::resource("maas_fabric", name).attr("name", name)
}

/// Lookup of a fabric that already exists on the region
pub fn implicit_fabric_block(name: &str) -> Block {
    Block::data("maas_fabric", name).attr("name", name)
}

pub fn space_block(name: &str) -> Block {
    Block::resource("maas_space", name).attr("name", name)
}

pub fn vlan_block(vlan: &Vlan) -> Block {
    Block::resource("maas_vlan", &vlan.name)
        .reference("fabric", fabric_id(&vlan.fabric))
        .reference("space", resource_ref("maas_space", &vlan.space, "id"))
        .attr("vid", vlan.vid)
        .attr("name", vlan.name.as_str())
        .attr("mtu", vlan.mtu)
}

pub fn subnet_block(subnet: &Subnet) -> Block {
    let gateway = Some(subnet.gateway_ip.as_str()).filter(|gw| !gw.is_empty());

    let mut block = Block::resource("maas_subnet", &subnet.name)
        .reference("fabric", fabric_id(&subnet.fabric))
        .reference("vlan", resource_ref("maas_vlan", &subnet.vlan, "vid"))
        .attr("cidr", subnet.cidr.as_str())
        .attr_opt("gateway_ip", gateway)
        .string_list("dns_servers", &subnet.dns_servers);

    for range in &subnet.ip_ranges {
        block = block.block(ip_range_block(range));
    }
    block
}

fn ip_range_block(range: &IpRange) -> Block {
    Block::new("ip_ranges")
        .attr("type", range.kind.to_string())
        .attr("start_ip", range.start_ip.as_str())
        .attr("end_ip", range.end_ip.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terramaas_core::IpRangeKind;

    fn subnet() -> Subnet {
        Subnet {
            name: "Lab-net".into(),
            fabric: "fabric-a".into(),
            vlan: "vlan-10".into(),
            cidr: "10.0.0.0/24".into(),
            gateway_ip: "10.0.0.1".into(),
            dns_servers: Vec::new(),
            ip_ranges: vec![
                IpRange::new(IpRangeKind::Dynamic, "10.0.0.10", "10.0.0.20"),
                IpRange::new(IpRangeKind::Reserved, "10.0.0.2", "10.0.0.9"),
            ],
        }
    }

    #[test]
    fn test_vlan_block_unquoted_numbers() {
        let vlan = Vlan::new(10, "fabric-a".into(), "Lab-space".into(), 9000);
        assert_eq!(
            vlan_block(&vlan).to_string(),
            "resource \"maas_vlan\" \"vlan-10\" {\n  fabric = maas_fabric.fabric-a.id\n  space = maas_space.Lab-space.id\n  vid = 10\n  name = \"vlan-10\"\n  mtu = 9000\n}\n"
        );
    }

    #[test]
    fn test_implicit_fabric_uses_data_source() {
        let vlan = Vlan::new(0, "default".into(), "Lab-space".into(), 1500);
        assert!(vlan_block(&vlan)
            .to_string()
            .contains("fabric = data.maas_fabric.default.id"));
        assert_eq!(
            implicit_fabric_block("default").to_string(),
            "data \"maas_fabric\" \"default\" {\n  name = \"default\"\n}\n"
        );
    }

    #[test]
    fn test_subnet_block_with_ranges() {
        let text = subnet_block(&subnet()).to_string();
        assert!(text.starts_with("resource \"maas_subnet\" \"Lab-net\" {\n"));
        assert!(text.contains("  vlan = maas_vlan.vlan-10.vid\n"));
        assert!(text.contains("  gateway_ip = \"10.0.0.1\"\n"));
        assert!(text.contains(
            "  ip_ranges {\n    type = \"dynamic\"\n    start_ip = \"10.0.0.10\"\n    end_ip = \"10.0.0.20\"\n  }\n"
        ));
        assert_eq!(text.matches("ip_ranges {").count(), 2);
        assert!(!text.contains("dns_servers"));
    }

    #[test]
    fn test_subnet_blank_fabric_passed_through() {
        let mut subnet = subnet();
        subnet.fabric = String::new();
        subnet.gateway_ip = String::new();
        let text = subnet_block(&subnet).to_string();
        assert!(text.contains("  fabric = maas_fabric..id\n"));
        assert!(!text.contains("gateway_ip"));
    }

    #[test]
    fn test_fabric_and_space_blocks() {
        assert_eq!(
            fabric_block("fabric-a").to_string(),
            "resource \"maas_fabric\" \"fabric-a\" {\n  name = \"fabric-a\"\n}\n"
        );
        assert!(space_block("Lab-space")
            .to_string()
            .contains("name = \"Lab-space\""));
    }
}
