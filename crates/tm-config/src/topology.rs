//! Network topology sheet extraction
//!
//! The topology sheet starts with a free-form preamble. The real header is
//! the first row with `CIDR` in its second column; everything after it
//! describes one subnet per row.

use std::collections::HashMap;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde::Serialize;

use terramaas_core::error::ConfigError;
use terramaas_core::vlan::VlanManager;
use terramaas_core::{IpRange, IpRangeKind, Result, Subnet, TerramaasError, Vlan};
use terramaas_types::{is_implicit_fabric, space_name, vlan_name};

use crate::sheet::{read_source_rows, Row, SourceRow};

pub const HEADER_SENTINEL: &str = "CIDR";
/// Header of the first column, used in error messages
pub const NAME_COLUMN: &str = "Network";
pub const CIDR_COLUMN: &str = "CIDR";
pub const GATEWAY_COLUMN: &str = "Gateway";
pub const MTU_COLUMN: &str = "MTU";
pub const DYNAMIC_RANGE_COLUMN: &str = "Dynamic Range";
pub const RESERVED_RANGE_COLUMN: &str = "Reserved Range";
pub const VLAN_COLUMN: &str = "VLAN";
pub const FABRIC_COLUMN: &str = "Fabric";
pub const DNS_COLUMN: &str = "DNS Servers";

const REQUIRED_COLUMNS: [&str; 7] = [
    CIDR_COLUMN,
    GATEWAY_COLUMN,
    MTU_COLUMN,
    DYNAMIC_RANGE_COLUMN,
    RESERVED_RANGE_COLUMN,
    VLAN_COLUMN,
    FABRIC_COLUMN,
];

/// Spaces, fabrics, VLANs and subnets described by a topology sheet
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkTopology {
    pub spaces: Vec<String>,
    pub fabrics: Vec<String>,
    pub vlans: Vec<Vlan>,
    pub subnets: Vec<Subnet>,
}

/// Header column positions, keyed by exact header text
struct ColumnIndex(HashMap<String, usize>);

impl ColumnIndex {
    fn cell<'a>(&self, row: &'a Row, column: &str) -> &'a str {
        self.0
            .get(column)
            .and_then(|&index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl NetworkTopology {
    /// Load a topology sheet from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source_rows(&read_source_rows(path)?)
    }

    /// Extract the topology from raw sheet rows
    pub fn from_rows(rows: &[Row]) -> Result<Self> {
        Self::from_source_rows(&SourceRow::numbered(rows.to_vec()))
    }

    /// Extract the topology from rows carrying their file lines
    pub fn from_source_rows(rows: &[SourceRow]) -> Result<Self> {
        let (header_at, columns) = locate_header(rows)?;
        let data = &rows[header_at + 1..];
        check_labels(data, &columns)?;

        let topology = Self {
            spaces: extract_spaces(data),
            fabrics: extract_fabrics(data, &columns),
            vlans: extract_vlans(data, &columns),
            subnets: extract_subnets(data, &columns),
        };

        debug!(
            "Topology: {} spaces, {} fabrics, {} vlans, {} subnets",
            topology.spaces.len(),
            topology.fabrics.len(),
            topology.vlans.len(),
            topology.subnets.len()
        );
        Ok(topology)
    }

    /// Fabrics that need a resource block
    pub fn managed_fabrics(&self) -> impl Iterator<Item = &str> {
        self.fabrics
            .iter()
            .map(String::as_str)
            .filter(|name| !is_implicit_fabric(name))
    }

    /// Implicit fabrics referenced by a VLAN or subnet, in first-use order
    pub fn referenced_implicit_fabrics(&self) -> Vec<&str> {
        let referenced: IndexSet<&str> = self
            .vlans
            .iter()
            .map(|vlan| vlan.fabric.as_str())
            .chain(self.subnets.iter().map(|subnet| subnet.fabric.as_str()))
            .filter(|name| is_implicit_fabric(name))
            .collect();
        referenced.into_iter().collect()
    }
}

/// Find the header row and map its column names to indices
fn locate_header(rows: &[SourceRow]) -> Result<(usize, ColumnIndex)> {
    let header_at = rows
        .iter()
        .position(|row| row.cells.get(1).map(|cell| cell.trim()) == Some(HEADER_SENTINEL))
        .ok_or_else(|| {
            TerramaasError::Configuration(ConfigError::HeaderNotFound {
                sentinel: HEADER_SENTINEL.to_string(),
            })
        })?;

    let columns: HashMap<String, usize> = rows[header_at]
        .cells
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_string(), index))
        .collect();

    for column in REQUIRED_COLUMNS {
        if !columns.contains_key(column) {
            return Err(TerramaasError::Configuration(ConfigError::MissingColumn {
                sheet: "network".to_string(),
                column: column.to_string(),
            }));
        }
    }

    Ok((header_at, ColumnIndex(columns)))
}

fn label(row: &SourceRow) -> &str {
    row.cells.first().map(String::as_str).unwrap_or("")
}

/// A row with a VLAN names its space and subnet after the first cell
fn check_labels(data: &[SourceRow], columns: &ColumnIndex) -> Result<()> {
    for row in data {
        let has_vlan = VlanManager::parse_vid(columns.cell(&row.cells, VLAN_COLUMN)).is_some();
        if has_vlan && label(row).trim().is_empty() {
            return Err(TerramaasError::Configuration(ConfigError::InvalidValue {
                field: format!("network.{} (line {})", NAME_COLUMN, row.line),
                value: String::new(),
            }));
        }
    }
    Ok(())
}

fn extract_spaces(data: &[SourceRow]) -> Vec<String> {
    let spaces: IndexSet<String> = data
        .iter()
        .map(label)
        .filter(|cell| !cell.is_empty())
        .map(space_name)
        .collect();
    spaces.into_iter().collect()
}

fn extract_fabrics(data: &[SourceRow], columns: &ColumnIndex) -> Vec<String> {
    let fabrics: IndexSet<String> = data
        .iter()
        .map(|row| columns.cell(&row.cells, FABRIC_COLUMN))
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect();
    fabrics.into_iter().collect()
}

fn extract_vlans(data: &[SourceRow], columns: &ColumnIndex) -> Vec<Vlan> {
    let mut vlans: IndexMap<u16, Vlan> = IndexMap::new();
    for row in data {
        let cells = &row.cells;
        let Some(vid) = VlanManager::parse_vid(columns.cell(cells, VLAN_COLUMN)) else {
            continue;
        };
        let vlan = Vlan::new(
            vid,
            columns.cell(cells, FABRIC_COLUMN).to_string(),
            space_name(label(row)),
            VlanManager::parse_mtu(columns.cell(cells, MTU_COLUMN)),
        );
        if let Some(previous) = vlans.insert(vid, vlan) {
            debug!("VLAN {} redefined on line {}, replacing {:?}", vid, row.line, previous);
        }
    }
    vlans.into_values().collect()
}

fn extract_subnets(data: &[SourceRow], columns: &ColumnIndex) -> Vec<Subnet> {
    let mut subnets = Vec::new();
    for row in data {
        let cells = &row.cells;
        let has_content = cells.iter().skip(1).any(|cell| !cell.trim().is_empty());
        let Some(vid) = VlanManager::parse_vid(columns.cell(cells, VLAN_COLUMN)) else {
            continue;
        };
        if !has_content {
            continue;
        }

        let name = label(row).replace(' ', "-");
        let fabric = columns.cell(cells, FABRIC_COLUMN).to_string();
        if fabric.is_empty() {
            warn!(
                "Subnet '{}' on line {} has no fabric; its fabric reference will not parse",
                name, row.line
            );
        }

        let mut ip_ranges = parse_ip_ranges(
            columns.cell(cells, DYNAMIC_RANGE_COLUMN),
            IpRangeKind::Dynamic,
        );
        ip_ranges.extend(parse_ip_ranges(
            columns.cell(cells, RESERVED_RANGE_COLUMN),
            IpRangeKind::Reserved,
        ));

        let subnet = Subnet {
            name,
            fabric,
            vlan: vlan_name(vid),
            cidr: columns.cell(cells, CIDR_COLUMN).trim().to_string(),
            gateway_ip: columns.cell(cells, GATEWAY_COLUMN).trim().to_string(),
            dns_servers: split_servers(columns.cell(cells, DNS_COLUMN)),
            ip_ranges,
        };
        if !subnet.cidr.is_empty() && subnet.network().is_none() {
            warn!(
                "Subnet '{}' on line {} has an unparsable CIDR '{}'",
                subnet.name, row.line, subnet.cidr
            );
        }
        subnets.push(subnet);
    }
    subnets
}

/// Parse `start-end[;start-end...]`. Segments that are not exactly two
/// dash-separated parts are dropped with a warning.
pub fn parse_ip_ranges(cell: &str, kind: IpRangeKind) -> Vec<IpRange> {
    if cell.trim().is_empty() {
        return Vec::new();
    }

    cell.split(';')
        .filter_map(|segment| {
            let parts: Vec<&str> = segment.split('-').collect();
            match parts.as_slice() {
                [start, end] => Some(IpRange::new(kind, start.trim(), end.trim())),
                _ => {
                    warn!("Dropping malformed {} range '{}'", kind, segment);
                    None
                }
            }
        })
        .collect()
}

fn split_servers(cell: &str) -> Vec<String> {
    cell.split([';', ','])
        .map(str::trim)
        .filter(|server| !server.is_empty())
        .map(str::to_string)
        .collect()
}
