//! CSV sheet loading
//!
//! Sheets are read as raw rows first. The topology sheet is interpreted
//! directly from rows; inventory sheets go through a [`SheetSchema`] that maps
//! normalized header names to columns and rejects missing required columns at
//! load time.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{Position, ReaderBuilder};
use log::debug;

use terramaas_core::error::ConfigError;
use terramaas_core::{Result, TerramaasError};

/// Ordered cells of one CSV record
pub type Row = Vec<String>;

/// A record together with the file line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub line: usize,
    pub cells: Row,
}

impl SourceRow {
    /// Number in-memory rows consecutively from line 1
    pub fn numbered(rows: Vec<Row>) -> Vec<SourceRow> {
        rows.into_iter()
            .enumerate()
            .map(|(index, cells)| SourceRow {
                line: index + 1,
                cells,
            })
            .collect()
    }
}

/// Read every row of a CSV file
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    Ok(into_cells(read_source_rows(path)?))
}

/// Read every row of a CSV file with its line number
pub fn read_source_rows<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    debug!("Reading CSV sheet {}", path.display());
    let file = std::fs::File::open(path)?;
    parse_source_rows(file)
}

/// Parse CSV rows from a reader. Quoted cells may contain delimiters.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    Ok(into_cells(parse_source_rows(reader)?))
}

/// Parse CSV rows keeping the line each record starts on. Quoted cells may
/// span lines and blank lines are skipped.
pub fn parse_source_rows<R: Read>(mut reader: R) -> Result<Vec<SourceRow>> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_slice());

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        let line = record
            .position()
            .map(|position| start_line(&input, position))
            .unwrap_or(rows.len() + 1);
        rows.push(SourceRow {
            line,
            cells: record.iter().map(|cell| cell.to_string()).collect(),
        });
    }
    Ok(rows)
}

/// The reader positions a record right after the previous terminator, so
/// blank lines skipped before the record still need counting.
fn start_line(input: &[u8], position: &Position) -> usize {
    let mut line = position.line() as usize;
    let rest = input.get(position.byte() as usize..).unwrap_or(&[]);
    for &byte in rest {
        match byte {
            b'\n' => line += 1,
            b'\r' => {}
            _ => break,
        }
    }
    line
}

fn into_cells(rows: Vec<SourceRow>) -> Vec<Row> {
    rows.into_iter().map(|row| row.cells).collect()
}

/// Normalize a header cell: trimmed, lower-case, spaces to underscores
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// A column expected in a sheet
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub required: bool,
}

impl Column {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Column mapping table for one kind of sheet
#[derive(Debug, Clone, Copy)]
pub struct SheetSchema {
    pub sheet: &'static str,
    pub columns: &'static [Column],
}

/// A header-keyed sheet validated against its schema
#[derive(Debug, Clone)]
pub struct Sheet {
    schema: SheetSchema,
    columns: HashMap<String, usize>,
    rows: Vec<SourceRow>,
}

impl Sheet {
    /// Load and validate a sheet from disk
    pub fn load<P: AsRef<Path>>(schema: SheetSchema, path: P) -> Result<Self> {
        Self::from_source_rows(schema, read_source_rows(path)?)
    }

    /// Build a sheet using the first row as header
    pub fn from_rows(schema: SheetSchema, rows: Vec<Row>) -> Result<Self> {
        Self::from_source_rows(schema, SourceRow::numbered(rows))
    }

    /// Build a sheet from numbered rows using the first one as header
    pub fn from_source_rows(schema: SheetSchema, mut rows: Vec<SourceRow>) -> Result<Self> {
        let header = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0).cells
        };

        let columns: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(index, name)| (normalize_header(name), index))
            .collect();

        for column in schema.columns.iter().filter(|c| c.required) {
            if !columns.contains_key(column.name) {
                return Err(TerramaasError::Configuration(ConfigError::MissingColumn {
                    sheet: schema.sheet.to_string(),
                    column: column.name.to_string(),
                }));
            }
        }

        for name in columns.keys() {
            if !schema.columns.iter().any(|c| c.name == name) {
                debug!("Ignoring unknown column '{}' in {} sheet", name, schema.sheet);
            }
        }

        Ok(Self {
            schema,
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &'static str {
        self.schema.sheet
    }

    /// Data rows as records, skipping rows whose cells are all blank
    pub fn records(&self) -> impl Iterator<Item = SheetRecord<'_>> {
        self.rows
            .iter()
            .filter(|row| row.cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(move |row| SheetRecord {
                sheet: self,
                row: &row.cells,
                line: row.line,
            })
    }
}

/// One data row of a [`Sheet`]
#[derive(Debug, Clone, Copy)]
pub struct SheetRecord<'a> {
    sheet: &'a Sheet,
    row: &'a Row,
    line: usize,
}

impl<'a> SheetRecord<'a> {
    /// 1-based line number in the source file
    pub fn line(&self) -> usize {
        self.line
    }

    /// Trimmed cell for a column; empty when the column or cell is absent
    pub fn get(&self, column: &str) -> &'a str {
        self.sheet
            .columns
            .get(column)
            .and_then(|&index| self.row.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }

    /// Non-blank cell for a column
    pub fn optional(&self, column: &str) -> Option<&'a str> {
        Some(self.get(column)).filter(|value| !value.is_empty())
    }

    /// Cell that must not be blank
    pub fn required(&self, column: &str) -> Result<&'a str> {
        self.optional(column).ok_or_else(|| {
            TerramaasError::Configuration(ConfigError::InvalidValue {
                field: format!("{}.{} (line {})", self.sheet.name(), column, self.line),
                value: String::new(),
            })
        })
    }

    /// Parse a cell, reporting the column on failure
    pub fn parse<T: std::str::FromStr>(&self, column: &str) -> Result<T> {
        let raw = self.get(column);
        raw.parse::<T>().map_err(|_| {
            TerramaasError::Configuration(ConfigError::InvalidValue {
                field: format!("{}.{} (line {})", self.sheet.name(), column, self.line),
                value: raw.to_string(),
            })
        })
    }
}
