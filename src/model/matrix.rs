use crate::spreadsheet::CellValue;

/// Metadata names, in the order they appear in the header row and column.
pub const META_KEYS: [&str; 6] = ["name", "shortName", "position", "execute", "generator", "description"];

/// Metadata of one matrix row or column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaEntry {
    pub name: Option<CellValue>,
    pub short_name: Option<CellValue>,
    pub position: Option<CellValue>,
    pub execute: Option<CellValue>,
    pub generator: Option<CellValue>,
    pub description: Option<CellValue>,
}

impl MetaEntry {
    /// Sets the value of the metadata at `index` in [`META_KEYS`].
    pub(crate) fn set(&mut self, index: usize, value: Option<CellValue>) {
        let slot = match index {
            0 => &mut self.name,
            1 => &mut self.short_name,
            2 => &mut self.position,
            3 => &mut self.execute,
            4 => &mut self.generator,
            _ => &mut self.description,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixTable {
    pub name: String,
    pub file_name: String,
    pub columns: Vec<MetaEntry>,
    pub rows: Vec<MetaEntry>,
    /// Data rows which contain at least one value
    pub data: Vec<Vec<Option<CellValue>>>,
}

impl MatrixTable {
    pub fn new(name: &str, file_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            file_name: file_name.to_owned(),
            columns: Vec::new(),
            rows: Vec::new(),
            data: Vec::new(),
        }
    }
}
