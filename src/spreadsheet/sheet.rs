use crate::spreadsheet::CellValue;
use std::collections::BTreeMap;

/// Represents one materialized sheet of a workbook.
/// Only present cells are stored; lookups outside of them return `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Cells keyed by `(row, column)`
    pub(crate) cells: BTreeMap<(usize, usize), CellValue>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: BTreeMap::new(),
        }
    }

    /// Builds a sheet from rows of text, an empty string leaves the cell absent.
    pub fn from_rows<R, S>(name: &str, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sheet = Self::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                let value = value.as_ref();
                if !value.is_empty() {
                    sheet.push(row, col, CellValue::Text(value.to_owned()));
                }
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a cell, replacing any previous value at the same position.
    pub fn push(&mut self, row: usize, col: usize, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns the last used row and column, if any cell is present.
    pub fn dimension(&self) -> Option<(usize, usize)> {
        let last_row = self.cells.keys().next_back().map(|(row, _)| *row)?;
        let last_col = self.cells.keys().map(|(_, col)| *col).max()?;
        Some((last_row, last_col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_from_rows() {
        let sheet = Sheet::from_rows("Sheet1", [vec!["a", "", "c"], vec![], vec!["", "e"]]);

        assert_eq!(sheet.name(), "Sheet1");
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.get(0, 0), Some(&CellValue::Text("a".to_owned())));
        assert_eq!(sheet.get(1, 0), None);
        assert_eq!(sheet.get(2, 0), Some(&CellValue::Text("c".to_owned())));
        assert_eq!(sheet.get(1, 2), Some(&CellValue::Text("e".to_owned())));
        assert_eq!(sheet.dimension(), Some((2, 2)));
    }

    #[test]
    fn sheet_push_replaces() {
        let mut sheet = Sheet::new("");
        assert!(sheet.is_empty());
        assert_eq!(sheet.dimension(), None);

        sheet.push(4, 1, CellValue::Number(1.0));
        sheet.push(4, 1, CellValue::Number(2.0));
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get(1, 4), Some(&CellValue::Number(2.0)));
        assert_eq!(sheet.dimension(), Some((4, 1)));
    }
}
