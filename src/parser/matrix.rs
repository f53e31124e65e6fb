//! Parser of `<MATRIX_TABLE>` sheets
//!
//! The metadata names are written once along the start row (column metadata is
//! stored below them) and once down the start column (row metadata is stored to
//! the right of them). The data block starts eight rows and columns after the
//! start cell.

use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::error::TableError;
use crate::model::matrix::MatrixTable;
use crate::model::matrix::MetaEntry;
use crate::model::matrix::META_KEYS;
use crate::model::Table;
use crate::parser::boundary::find_end_column;
use crate::parser::boundary::find_end_row;
use crate::parser::boundary::MAX_EMPTY_COLUMNS;
use crate::parser::boundary::MAX_EMPTY_ROWS;
use crate::parser::ParseRequest;
use crate::parser::ParserError;
use crate::parser::TableParser;
use crate::spreadsheet::CellValue;

/// Table type key of matrix sheets
pub const KEY_MATRIX_TABLE: &str = "<MATRIX_TABLE>";

/// Offset of the data block from the start row and column
const DATA_OFFSET: usize = META_KEYS.len() + 2;

#[derive(Debug)]
pub struct MatrixParser {
    max_empty_rows: usize,
    max_empty_columns: usize,
}

impl Default for MatrixParser {
    fn default() -> Self {
        Self {
            max_empty_rows: MAX_EMPTY_ROWS,
            max_empty_columns: MAX_EMPTY_COLUMNS,
        }
    }
}

impl MatrixParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_empty_rows(mut self, max_empty_rows: usize) -> Self {
        self.max_empty_rows = max_empty_rows;
        self
    }

    pub fn with_max_empty_columns(mut self, max_empty_columns: usize) -> Self {
        self.max_empty_columns = max_empty_columns;
        self
    }
}

impl TableParser for MatrixParser {
    fn parse(&mut self, request: &ParseRequest<'_>, diagnostics: &mut Diagnostics) -> Result<Table, TableError> {
        tracing::debug!(sheet = request.sheet_name, "Parse matrix table");
        let end_row = find_end_row(request, self.max_empty_rows)?;
        let end_column = find_end_column(request, self.max_empty_columns)?;

        let columns_valid = check_meta_data_header(request, Axis::Column, diagnostics);
        let rows_valid = check_meta_data_header(request, Axis::Row, diagnostics);
        if !columns_valid || !rows_valid {
            Err(ParserError::InvalidMatrixHeader {
                sheet: request.sheet_name.to_owned(),
            })?
        }

        let mut table = MatrixTable::new(request.sheet_name, request.file_name);
        table.columns = parse_meta_data_columns(request, end_row, end_column, diagnostics);
        table.rows = parse_meta_data_rows(request, end_row, end_column, diagnostics);
        table.data = parse_field_data(request, end_row, end_column);
        tracing::info!(
            sheet = request.sheet_name,
            columns = table.columns.len(),
            rows = table.rows.len(),
            data = table.data.len(),
            "Parsed matrix table"
        );
        Ok(Table::Matrix(table))
    }
}

/// Direction of a metadata header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Names along the start row, describing the data columns
    Column,
    /// Names down the start column, describing the data rows
    Row,
}

/// Checks the six metadata names of one header, ignoring case.
fn check_meta_data_header(request: &ParseRequest<'_>, axis: Axis, diagnostics: &mut Diagnostics) -> bool {
    let layout = request.layout;
    let function = match axis {
        Axis::Column => "check_meta_data_column",
        Axis::Row => "check_meta_data_row",
    };
    let mut valid = true;
    for (index, key) in META_KEYS.iter().enumerate() {
        let (column, row) = match axis {
            Axis::Column => (layout.start_column + 1 + index, layout.start_row),
            Axis::Row => (layout.start_column, layout.start_row + 1 + index),
        };
        let message = match request.cell(column, row) {
            None => format!("The cell column:'{}' row:'{}' must not be empty", column, row),
            Some(value) if !value.eq_ignore_ascii_case(key) => {
                format!("The cell column:'{}' row:'{}' must have the name '{}'", column, row, key)
            }
            Some(_) => continue,
        };
        diagnostics.push(
            Diagnostic::error(function, message)
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(column),
        );
        valid = false;
    }
    valid
}

fn present(value: Option<&CellValue>) -> Option<CellValue> {
    match value {
        Some(CellValue::Text(text)) if text.is_empty() => None,
        other => other.cloned(),
    }
}

/// Reads the metadata of every data column. A column without a name must be empty.
fn parse_meta_data_columns(
    request: &ParseRequest<'_>,
    end_row: usize,
    end_column: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<MetaEntry> {
    let layout = request.layout;
    let mut columns = Vec::new();
    for column in layout.start_column + DATA_OFFSET..end_column {
        let mut meta = MetaEntry::default();
        for index in 0..META_KEYS.len() {
            meta.set(index, present(request.cell_value(column, layout.start_row + 1 + index)));
        }
        if meta.name.is_none() {
            for row in (layout.start_row..end_row).filter(|row| request.cell(column, *row).is_some()) {
                diagnostics.push(
                    Diagnostic::error(
                        "check_for_empty_column",
                        "If the name is null there must be no data for the complete column",
                    )
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(column),
                );
            }
        }
        columns.push(meta);
    }
    columns
}

/// Reads the metadata of every data row. Rows without a name must be empty and are skipped.
fn parse_meta_data_rows(
    request: &ParseRequest<'_>,
    end_row: usize,
    end_column: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<MetaEntry> {
    let layout = request.layout;
    let mut rows = Vec::new();
    for row in layout.start_row + DATA_OFFSET..end_row {
        let mut meta = MetaEntry::default();
        for index in 0..META_KEYS.len() {
            meta.set(index, present(request.cell_value(layout.start_column + 1 + index, row)));
        }
        if meta.name.is_some() {
            rows.push(meta);
            continue;
        }
        for column in (layout.start_column..end_column).filter(|column| request.cell(*column, row).is_some()) {
            diagnostics.push(
                Diagnostic::error(
                    "check_for_empty_row",
                    "If the name is null there must be no data for the complete row",
                )
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(column),
            );
        }
    }
    rows
}

/// Reads the data block, rows without any value are dropped.
fn parse_field_data(request: &ParseRequest<'_>, end_row: usize, end_column: usize) -> Vec<Vec<Option<CellValue>>> {
    let layout = request.layout;
    (layout.start_row + DATA_OFFSET..end_row)
        .map(|row| {
            (layout.start_column + DATA_OFFSET..end_column)
                .map(|column| present(request.cell_value(column, row)))
                .collect::<Vec<_>>()
        })
        .filter(|values| values.iter().any(Option::is_some))
        .collect()
}
