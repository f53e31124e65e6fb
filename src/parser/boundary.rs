//! Detection of the last row and column of a table
//!
//! A table ends at the first cell equal to the end key, searched downward in the
//! start column or rightward in the start row. Runs of absent cells are tolerated
//! up to a limit; hitting the limit means the sentinel is missing.

use crate::parser::ParseRequest;
use crate::parser::ParserError;

/// Consecutive empty rows tolerated while searching the end row
pub const MAX_EMPTY_ROWS: usize = 100;

/// Consecutive empty columns tolerated while searching the end column
pub const MAX_EMPTY_COLUMNS: usize = 20;

/// Finds the row holding the end key in the start column.
///
/// # Arguments
/// * `request` - The sheet and its layout
/// * `max_empty` - Number of consecutive absent cells after which the search fails
///
/// # Returns
/// Index of the end row
pub fn find_end_row(request: &ParseRequest<'_>, max_empty: usize) -> Result<usize, ParserError> {
    let layout = request.layout;
    let end_row = scan(layout.start_row + 1, &layout.end_key, max_empty, |row| request.cell(layout.start_column, row))
        .ok_or_else(|| ParserError::EndRowNotFound {
            sheet: request.sheet_name.to_owned(),
            end_key: layout.end_key.to_owned(),
            column: layout.start_column,
        })?;
    tracing::info!(sheet = request.sheet_name, row = end_row, "SheetEndRow: Detect sheetEnd '{}'", layout.end_key);
    Ok(end_row)
}

/// Finds the column holding the end key in the start row.
///
/// # Arguments
/// * `request` - The sheet and its layout
/// * `max_empty` - Number of consecutive absent cells after which the search fails
///
/// # Returns
/// Index of the end column
pub fn find_end_column(request: &ParseRequest<'_>, max_empty: usize) -> Result<usize, ParserError> {
    let layout = request.layout;
    let end_column = scan(layout.start_column + 1, &layout.end_key, max_empty, |column| request.cell(column, layout.start_row))
        .ok_or_else(|| ParserError::EndColumnNotFound {
            sheet: request.sheet_name.to_owned(),
            end_key: layout.end_key.to_owned(),
            row: layout.start_row,
        })?;
    tracing::info!(sheet = request.sheet_name, column = end_column, "SheetEndColumn: Detect sheetEnd '{}'", layout.end_key);
    Ok(end_column)
}

fn scan<F>(start: usize, end_key: &str, max_empty: usize, cell: F) -> Option<usize>
where
    F: Fn(usize) -> Option<String>,
{
    let mut empty = 0usize;
    let mut index = start;
    while empty < max_empty.max(1) {
        match cell(index) {
            None => empty += 1,
            Some(value) if value == end_key => return Some(index),
            Some(_) => empty = 0,
        }
        index += 1;
    }
    None
}
