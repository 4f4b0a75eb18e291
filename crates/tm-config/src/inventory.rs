//! Machine, partition, NIC and user sheets

use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use terramaas_core::error::ConfigError;
use terramaas_core::vlan::VlanManager;
use terramaas_core::{
    MacAddr, Machine, MachineBundle, Nic, NicMode, Partition, Result, TerramaasError, User,
};

use crate::sheet::{Column, Sheet, SheetRecord, SheetSchema};

pub const MACHINE_SCHEMA: SheetSchema = SheetSchema {
    sheet: "machines",
    columns: &[
        Column::required("resource_name"),
        Column::required("power_type"),
        Column::optional("power_user"),
        Column::required("power_pass"),
        Column::required("power_address"),
        Column::required("pxe_mac_address"),
        Column::required("id_path"),
        Column::required("partition_schema"),
        Column::optional("nics"),
    ],
};

pub const PARTITION_SCHEMA: SheetSchema = SheetSchema {
    sheet: "partitions",
    columns: &[
        Column::required("resource_name"),
        Column::required("size_gigabytes"),
        Column::required("fs_type"),
        Column::required("label"),
        Column::optional("bootable"),
        Column::optional("mount_point"),
    ],
};

pub const NIC_SCHEMA: SheetSchema = SheetSchema {
    sheet: "nics",
    columns: &[
        Column::required("resource_name"),
        Column::required("name"),
        Column::required("mac_address"),
        Column::optional("vlan"),
        Column::required("mode"),
        Column::optional("ip_address"),
        Column::optional("default_gateway"),
        Column::required("subnet"),
        Column::optional("tags"),
    ],
};

pub const USER_SCHEMA: SheetSchema = SheetSchema {
    sheet: "users",
    columns: &[
        Column::required("resource_name"),
        Column::required("password"),
        Column::required("email"),
        Column::optional("is_admin"),
    ],
};

/// Machines joined with their partitions and NICs
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    pub machines: Vec<MachineBundle>,
}

impl Inventory {
    /// Load the three inventory sheets and join them
    pub fn load<P: AsRef<Path>>(machines: P, partitions: P, nics: P) -> Result<Self> {
        Self::from_sheets(
            &Sheet::load(MACHINE_SCHEMA, machines)?,
            &Sheet::load(PARTITION_SCHEMA, partitions)?,
            &Sheet::load(NIC_SCHEMA, nics)?,
        )
    }

    /// Join machine rows against partition and NIC rows by resource name
    pub fn from_sheets(machines: &Sheet, partitions: &Sheet, nics: &Sheet) -> Result<Self> {
        let partitions = index_by_name(partitions, partition_from_record)?;
        let nics = index_by_name(nics, nic_from_record)?;

        let mut bundles = Vec::new();
        for record in machines.records() {
            let machine = machine_from_record(&record)?;
            let bundle = MachineBundle {
                partitions: resolve(&machine, "partition", &machine.partition_schema, &partitions)?,
                nics: resolve(&machine, "nic", &machine.nics, &nics)?,
                machine,
            };
            if bundle.total_size_gigabytes().is_none() {
                return Err(TerramaasError::Configuration(ConfigError::InvalidValue {
                    field: format!(
                        "{}.partition_schema (line {}): total size overflows",
                        machines.name(),
                        record.line()
                    ),
                    value: bundle.machine.partition_schema.join(","),
                }));
            }
            debug!(
                "Machine {}: {} partitions, {} nics",
                bundle.machine.resource_name,
                bundle.partitions.len(),
                bundle.nics.len()
            );
            bundles.push(bundle);
        }

        Ok(Self { machines: bundles })
    }
}

/// Load the optional user sheet
pub fn load_users<P: AsRef<Path>>(path: P) -> Result<Vec<User>> {
    users_from_sheet(&Sheet::load(USER_SCHEMA, path)?)
}

pub fn users_from_sheet(sheet: &Sheet) -> Result<Vec<User>> {
    sheet
        .records()
        .map(|record| {
            Ok(User {
                resource_name: record.required("resource_name")?.to_string(),
                password: record.get("password").to_string(),
                email: record.get("email").to_string(),
                is_admin: parse_bool(record.get("is_admin")),
            })
        })
        .collect()
}

/// Truthy cell values: `true`, `yes`, `y`, `1` (any case). Blank is false.
pub fn parse_bool(cell: &str) -> bool {
    matches!(
        cell.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

/// Split a comma separated name list, dropping blanks
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn index_by_name<T, F>(sheet: &Sheet, build: F) -> Result<IndexMap<String, T>>
where
    F: Fn(&SheetRecord<'_>) -> Result<T>,
{
    let mut index = IndexMap::new();
    for record in sheet.records() {
        let name = record.required("resource_name")?.to_string();
        let item = build(&record)?;
        if index.insert(name.clone(), item).is_some() {
            return Err(TerramaasError::Configuration(ConfigError::DuplicateRecord {
                sheet: sheet.name().to_string(),
                name,
            }));
        }
    }
    Ok(index)
}

fn resolve<T: Clone>(
    machine: &Machine,
    kind: &str,
    names: &[String],
    available: &IndexMap<String, T>,
) -> Result<Vec<T>> {
    names
        .iter()
        .map(|name| {
            available.get(name).cloned().ok_or_else(|| {
                TerramaasError::Configuration(ConfigError::UnresolvedReference {
                    kind: kind.to_string(),
                    name: name.clone(),
                    owner: format!("machine '{}'", machine.resource_name),
                })
            })
        })
        .collect()
}

fn machine_from_record(record: &SheetRecord<'_>) -> Result<Machine> {
    Ok(Machine {
        resource_name: record.required("resource_name")?.to_string(),
        power_type: record.get("power_type").to_string(),
        power_user: record.optional("power_user").map(str::to_string),
        power_pass: record.get("power_pass").to_string(),
        power_address: record.get("power_address").to_string(),
        pxe_mac_address: record.parse::<MacAddr>("pxe_mac_address")?,
        id_path: record.get("id_path").to_string(),
        partition_schema: split_list(record.get("partition_schema")),
        nics: split_list(record.get("nics")),
    })
}

fn partition_from_record(record: &SheetRecord<'_>) -> Result<Partition> {
    Ok(Partition {
        resource_name: record.required("resource_name")?.to_string(),
        size_gigabytes: record.parse::<u64>("size_gigabytes")?,
        fs_type: record.get("fs_type").to_string(),
        label: record.get("label").to_string(),
        bootable: parse_bool(record.get("bootable")),
        mount_point: record.get("mount_point").to_string(),
    })
}

fn nic_from_record(record: &SheetRecord<'_>) -> Result<Nic> {
    let vlan = match record.optional("vlan") {
        Some(cell) => Some(VlanManager::require_vid("nics.vlan", cell)?),
        None => None,
    };

    Ok(Nic {
        resource_name: record.required("resource_name")?.to_string(),
        name: record.required("name")?.to_string(),
        mac_address: record.parse::<MacAddr>("mac_address")?,
        vlan,
        mode: record.parse::<NicMode>("mode")?,
        ip_address: record.optional("ip_address").map(str::to_string),
        default_gateway: parse_bool(record.get("default_gateway")),
        subnet: record.get("subnet").replace(' ', "-"),
        tags: record
            .get("tags")
            .split([',', ';'])
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::parse_rows;

    fn sheet(schema: SheetSchema, csv: &str) -> Sheet {
        Sheet::from_rows(schema, parse_rows(csv.as_bytes()).unwrap()).unwrap()
    }

    const MACHINES: &str = "\
Resource Name,Power Type,Power Pass,Power Address,PXE MAC Address,ID Path,Partition Schema,NICs
node1,ipmi,secret,10.1.0.5,00:11:22:33:44:55,/dev/sda,\"p1,p2\",node1-eth0
";

    const PARTITIONS: &str = "\
Resource Name,Size Gigabytes,FS Type,Label,Bootable,Mount Point
p1,10,ext4,root,true,/
p2,20,xfs,data,,/srv
";

    const NICS: &str = "\
Resource Name,Name,MAC Address,VLAN,Mode,IP Address,Default Gateway,Subnet,Tags
node1-eth0,eth0,00:11:22:33:44:66,10,Static,10.0.0.5,yes,Lab net,\"prod,edge\"
";

    #[test]
    fn test_join_partitions_and_nics() {
        let inventory = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, MACHINES),
            &sheet(PARTITION_SCHEMA, PARTITIONS),
            &sheet(NIC_SCHEMA, NICS),
        )
        .unwrap();

        assert_eq!(inventory.machines.len(), 1);
        let bundle = &inventory.machines[0];
        assert_eq!(bundle.machine.partition_schema, vec!["p1", "p2"]);
        assert_eq!(bundle.total_size_gigabytes(), Some(30));
        assert!(bundle.partitions[0].bootable);
        assert!(!bundle.partitions[1].bootable);

        let nic = &bundle.nics[0];
        assert_eq!(nic.mode, NicMode::Static);
        assert_eq!(nic.vlan, Some(10));
        assert_eq!(nic.subnet, "Lab-net");
        assert_eq!(nic.tags, vec!["prod", "edge"]);
        assert!(nic.default_gateway);
    }

    #[test]
    fn test_unresolved_partition_fails() {
        let machines = MACHINES.replace("\"p1,p2\"", "\"p1,p9\"");
        let err = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, &machines),
            &sheet(PARTITION_SCHEMA, PARTITIONS),
            &sheet(NIC_SCHEMA, NICS),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("p9"), "{}", message);
        assert!(message.contains("node1"), "{}", message);
    }

    #[test]
    fn test_unresolved_nic_fails() {
        let machines = MACHINES.replace("node1-eth0", "node1-eth1");
        let result = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, &machines),
            &sheet(PARTITION_SCHEMA, PARTITIONS),
            &sheet(NIC_SCHEMA, NICS),
        );
        assert!(matches!(
            result,
            Err(TerramaasError::Configuration(
                ConfigError::UnresolvedReference { .. }
            ))
        ));
    }

    #[test]
    fn test_duplicate_partition_rejected() {
        let partitions = format!("{}p1,5,ext4,dup,,\n", PARTITIONS);
        let result = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, MACHINES),
            &sheet(PARTITION_SCHEMA, &partitions),
            &sheet(NIC_SCHEMA, NICS),
        );
        assert!(matches!(
            result,
            Err(TerramaasError::Configuration(ConfigError::DuplicateRecord { .. }))
        ));
    }

    #[test]
    fn test_invalid_partition_size() {
        let partitions = PARTITIONS.replace(",10,", ",ten,");
        let result = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, MACHINES),
            &sheet(PARTITION_SCHEMA, &partitions),
            &sheet(NIC_SCHEMA, NICS),
        );
        assert!(result.unwrap_err().to_string().contains("size_gigabytes"));
    }

    #[test]
    fn test_partition_total_overflow_rejected() {
        let partitions = PARTITIONS.replace(",20,", ",18446744073709551615,");
        let err = Inventory::from_sheets(
            &sheet(MACHINE_SCHEMA, MACHINES),
            &sheet(PARTITION_SCHEMA, &partitions),
            &sheet(NIC_SCHEMA, NICS),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TerramaasError::Configuration(ConfigError::InvalidValue { .. })
        ));
        let message = err.to_string();
        assert!(message.contains("machines.partition_schema (line 2)"), "{}", message);
        assert!(message.contains("p1,p2"), "{}", message);
    }

    #[test]
    fn test_users_default_to_non_admin() {
        let users = users_from_sheet(&sheet(
            USER_SCHEMA,
            "Resource Name,Password,Email,Is Admin\nalice,pw,a@example.com,TRUE\nbob,pw,b@example.com,\n",
        ))
        .unwrap();

        assert_eq!(users.len(), 2);
        assert!(users[0].is_admin);
        assert!(!users[1].is_admin);
    }

    #[test]
    fn test_user_sheet_without_is_admin_column() {
        let users = users_from_sheet(&sheet(
            USER_SCHEMA,
            "resource_name,password,email\ncarol,pw,c@example.com\n",
        ))
        .unwrap();
        assert!(!users[0].is_admin);
    }

    #[test]
    fn test_split_list_and_bools() {
        assert_eq!(split_list(" a , ,b"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }
}
