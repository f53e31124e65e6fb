//! Spreadsheet grid access
//!
//! Parsers only need a read-only view of a workbook: sheet names and the value of
//! a cell at a zero-based `(column, row)` position. That view is the
//! [`GridAccessor`] trait. [`Workbook`] is the in-memory implementation, filled
//! either by hand or by the `.xlsx` loader in [`xlsx`].

pub(crate) mod reference;
pub mod sheet;
pub mod xlsx;

use crate::error::TableError;
use crate::spreadsheet::sheet::Sheet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a workbook.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{0}'")]
    UnsupportedFormat(String),

    /// A mandatory part of the package does not exist
    #[error("The package part '{0}' is missing")]
    MissingPart(String),

    /// The workbook declares no sheet at all
    #[error("The workbook '{0}' does not contain any sheet")]
    EmptyWorkbook(String),

    /// A cell points outside of the shared string table
    #[error("Shared string index '{index}' in cell '{reference}' is out of range")]
    SharedStringIndex { index: usize, reference: String },
}

/// Value of a present cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    /// Numbers without a fractional part print like integers, as a spreadsheet shows them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            CellValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Read-only cell lookup by sheet name, column and row.
pub trait GridAccessor {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<&str>;

    /// Returns the cell value, `None` for absent cells and unknown sheets.
    fn cell_value(&self, sheet: &str, column: usize, row: usize) -> Option<&CellValue>;

    /// Returns the cell value rendered as a string, `None` when absent or empty.
    fn cell_string(&self, sheet: &str, column: usize, row: usize) -> Option<String> {
        self.cell_value(sheet, column, row)
            .map(ToString::to_string)
            .filter(|value| !value.is_empty())
    }
}

/// An in-memory workbook.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    name: String,
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            sheets: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a sheet; a sheet with the same name is replaced in place.
    pub fn push(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|existing| existing.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.push(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

impl GridAccessor for Workbook {
    fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    fn cell_value(&self, sheet: &str, column: usize, row: usize) -> Option<&CellValue> {
        self.sheet(sheet)?.get(column, row)
    }
}

/// Opens a workbook file, choosing the loader by file extension.
///
/// # Arguments
/// * `path` - Path of the spreadsheet file
///
/// # Returns
/// The materialized workbook, named after the given path
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook, TableError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => xlsx::open(path),
        _ => Err(WorkbookError::UnsupportedFormat(path.display().to_string()))?,
    }
}
