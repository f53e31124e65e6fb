//! Sheet parsers
//!
//! Every parser turns one sheet of a [`GridAccessor`] into a [`Table`]. Recoverable
//! problems are pushed into the caller's [`Diagnostics`]; a [`ParserError`] means the
//! sheet could not be parsed at all and yields no table.

pub mod boundary;
pub mod coerce;
pub mod decision;
pub mod matrix;
pub(crate) mod section;
pub mod specification;

use crate::diagnostics::Diagnostics;
use crate::error::TableError;
use crate::model::Table;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::GridAccessor;
use thiserror::Error;

/// Default sentinel marking the last row and column of a table
pub const KEY_TABLE_END: &str = "<END>";

/// Fatal errors which abort the parse of a single sheet.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("SheetEndRow: Could not find the end sheet identifier '{end_key}' in the sheet '{sheet}' in column '{column}'")]
    EndRowNotFound {
        sheet: String,
        end_key: String,
        column: usize,
    },

    #[error("SheetEndColumn: Could not find the end sheet identifier '{end_key}' in the sheet '{sheet}' in row '{row}'")]
    EndColumnNotFound {
        sheet: String,
        end_key: String,
        row: usize,
    },

    #[error("The specification sheet '{sheet}' does not contain the marker row(s) {markers}")]
    MissingMarkers { sheet: String, markers: String },

    #[error("The specification sheet '{sheet}' does not contain any rule")]
    NoRules { sheet: String },

    #[error("The specification sheet '{sheet}' contains empty rule columns")]
    EmptyRuleColumns { sheet: String },

    #[error("The sheet '{sheet}' does not contain any section")]
    NoSection { sheet: String },

    #[error("Could not parse the sheet '{sheet}' because of {count} invalid section definition(s)")]
    InvalidSections { sheet: String, count: usize },

    #[error("The matrix sheet '{sheet}' has invalid metadata headers")]
    InvalidMatrixHeader { sheet: String },
}

/// Where a table starts inside its sheet and which key ends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub start_row: usize,
    pub start_column: usize,
    pub end_key: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            start_row: 0,
            start_column: 0,
            end_key: KEY_TABLE_END.to_owned(),
        }
    }
}

/// Everything a parser needs to read one sheet
#[derive(Clone, Copy)]
pub struct ParseRequest<'a> {
    pub file_name: &'a str,
    pub sheet_name: &'a str,
    pub grid: &'a dyn GridAccessor,
    pub layout: &'a SheetLayout,
}

impl<'a> ParseRequest<'a> {
    pub fn new(file_name: &'a str, sheet_name: &'a str, grid: &'a dyn GridAccessor, layout: &'a SheetLayout) -> Self {
        Self {
            file_name,
            sheet_name,
            grid,
            layout,
        }
    }

    /// Cell of the requested sheet rendered as string, `None` when absent or empty
    pub(crate) fn cell(&self, column: usize, row: usize) -> Option<String> {
        self.grid.cell_string(self.sheet_name, column, row)
    }

    pub(crate) fn cell_value(&self, column: usize, row: usize) -> Option<&'a CellValue> {
        self.grid.cell_value(self.sheet_name, column, row)
    }
}

/// A parser for one table type
pub trait TableParser {
    /// Parses the sheet named in the request.
    ///
    /// # Arguments
    /// * `request` - The sheet to parse and how to find the table in it
    /// * `diagnostics` - Sink for every recoverable problem found on the way
    ///
    /// # Returns
    /// The table, or an error when the sheet structure could not be recognized
    fn parse(&mut self, request: &ParseRequest<'_>, diagnostics: &mut Diagnostics) -> Result<Table, TableError>;
}
