//! Dispatch of workbook sheets to the table parsers
//!
//! The value of the start cell of a sheet (its table type key) selects the parser.
//! Problems are isolated per file and per sheet: a file which cannot be opened or
//! a sheet which cannot be parsed is reported and processing goes on.

use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::error::ResultMessage;
use crate::error::TableError;
use crate::model::Table;
use crate::parser::decision::DecisionParser;
use crate::parser::decision::KEY_DECISION_TABLE;
use crate::parser::matrix::MatrixParser;
use crate::parser::matrix::KEY_MATRIX_TABLE;
use crate::parser::specification::SpecificationParser;
use crate::parser::specification::KEY_SPECIFICATION;
use crate::parser::ParseRequest;
use crate::parser::SheetLayout;
use crate::parser::TableParser;
use crate::spreadsheet::open_workbook;
use crate::spreadsheet::GridAccessor;
use anyhow::Context;
use glob::Pattern;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

/// Options of a [`FileProcessor`]
#[derive(Clone, Debug, Default)]
pub struct ProcessorOptions {
    /// Sheet name patterns for filtering which sheets to process, all sheets when absent
    pub sheet_name_patterns: Option<Vec<Pattern>>,
    /// Drop the table of a sheet which produced error diagnostics (default: false)
    pub strict: Option<bool>,
}

impl ProcessorOptions {
    /// Returns true if no patterns are specified or if the name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        match &self.sheet_name_patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }
}

pub struct FileProcessor {
    options: ProcessorOptions,
    /// Parsers keyed by the lower-cased table type key
    parsers: HashMap<String, Box<dyn TableParser>>,
    default_layout: SheetLayout,
    layouts: HashMap<String, SheetLayout>,
    tables: BTreeMap<String, Table>,
    diagnostics: Diagnostics,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new(ProcessorOptions::default())
    }
}

impl FileProcessor {
    /// Creates a processor with the decision, matrix and specification parsers registered.
    pub fn new(options: ProcessorOptions) -> Self {
        let mut processor = Self::without_parsers(options);
        processor.register_parser(KEY_DECISION_TABLE, Box::new(DecisionParser::new()));
        processor.register_parser(KEY_MATRIX_TABLE, Box::new(MatrixParser::new()));
        processor.register_parser(KEY_SPECIFICATION, Box::new(SpecificationParser::new()));
        processor
    }

    pub fn without_parsers(options: ProcessorOptions) -> Self {
        Self {
            options,
            parsers: HashMap::new(),
            default_layout: SheetLayout::default(),
            layouts: HashMap::new(),
            tables: BTreeMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Registers a parser for a table type key, ignoring its case.
    /// An existing parser for the same key is replaced.
    pub fn register_parser(&mut self, key: &str, parser: Box<dyn TableParser>) {
        if self.parsers.insert(key.to_lowercase(), parser).is_some() {
            self.diagnostics.push(Diagnostic::warning(
                "register_parser",
                format!("A parser for the key '{}' is already registered, it is replaced", key),
            ));
        }
    }

    /// Layout used by sheets without an own layout
    pub fn set_default_layout(&mut self, layout: SheetLayout) {
        self.default_layout = layout;
    }

    pub fn set_sheet_layout(&mut self, sheet_name: &str, layout: SheetLayout) {
        self.layouts.insert(sheet_name.to_owned(), layout);
    }

    /// Loads and processes every file matching the given glob patterns.
    ///
    /// # Arguments
    /// * `patterns` - File glob patterns, a plain path matches itself
    ///
    /// # Returns
    /// The number of files which could be opened, or an error for a malformed pattern
    pub fn load(&mut self, patterns: &[&str]) -> Result<usize, TableError> {
        let mut loaded = 0;
        for pattern in patterns {
            let mut matched = false;
            for entry in glob::glob(pattern)? {
                matched = true;
                match entry.context("Could not read the directory entry") {
                    Ok(path) => loaded += usize::from(self.load_file(&path)),
                    Err(error) => self.diagnostics.push(Diagnostic::error("load", format!("{:#}", error))),
                }
            }
            if !matched {
                self.diagnostics.push(Diagnostic::warning(
                    "load",
                    format!("No file matches the pattern '{}'", pattern),
                ));
            }
        }
        Ok(loaded)
    }

    fn load_file(&mut self, path: &Path) -> bool {
        tracing::debug!(file = %path.display(), "Load file");
        match open_workbook(path).with_context(|| format!("Could not open the file '{}'", path.display())) {
            Ok(workbook) => {
                self.process_workbook(workbook.name(), &workbook);
                true
            }
            Err(error) => {
                self.diagnostics.push(Diagnostic::error("load", format!("{:#}", error)));
                false
            }
        }
    }

    /// Parses every accepted sheet of a workbook and stores the tables by sheet name.
    pub fn process_workbook(&mut self, file_name: &str, grid: &dyn GridAccessor) {
        let strict = self.options.strict.unwrap_or(false);
        for sheet_name in grid.sheet_names() {
            if !self.options.accept(sheet_name) {
                continue;
            }
            let layout = self.layouts.get(sheet_name).unwrap_or(&self.default_layout);
            let Some(key) = grid.cell_string(sheet_name, layout.start_column, layout.start_row) else {
                self.diagnostics.push(
                    Diagnostic::info(
                        "process_workbook",
                        format!("Ignore the sheet because it has no table type in the file '{}'", file_name),
                    )
                    .with_sheet(sheet_name),
                );
                continue;
            };
            let Some(parser) = self.parsers.get_mut(&key.to_lowercase()) else {
                self.diagnostics.push(
                    Diagnostic::info(
                        "process_workbook",
                        format!("Ignore the sheet because there is no parser for the table type '{}'", key),
                    )
                    .with_sheet(sheet_name),
                );
                continue;
            };

            let errors_before = self.diagnostics.error_count();
            let request = ParseRequest::new(file_name, sheet_name, grid, layout);
            let table = match parser.parse(&request, &mut self.diagnostics).with_prefix(file_name) {
                Ok(table) => table,
                Err(error) => {
                    self.diagnostics.push(
                        Diagnostic::error("process_workbook", error.to_string()).with_sheet(sheet_name),
                    );
                    continue;
                }
            };

            if strict && self.diagnostics.error_count() > errors_before {
                self.diagnostics.push(
                    Diagnostic::warning("process_workbook", "The table contains errors, it is dropped")
                        .with_sheet(sheet_name),
                );
                continue;
            }
            if self.tables.insert(sheet_name.to_owned(), table).is_some() {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "process_workbook",
                        format!(
                            "The table '{}' was already loaded, it is overwritten by the one in '{}'",
                            sheet_name, file_name
                        ),
                    )
                    .with_sheet(sheet_name),
                );
            }
        }
    }

    /// Tables by sheet name
    pub fn tables(&self) -> &BTreeMap<String, Table> {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn clear_tables(&mut self) {
        self.tables.clear();
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the processor, returning its tables and diagnostics.
    pub fn into_parts(self) -> (BTreeMap<String, Table>, Diagnostics) {
        (self.tables, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::model::matrix::MatrixTable;
    use crate::spreadsheet::sheet::Sheet;
    use crate::spreadsheet::xlsx::tests::build_package;
    use crate::spreadsheet::Workbook;

    const DECISION: &[&[&str]] = &[
        &["<DECISION_TABLE>", "", "", "", "", "tc1"],
        &["Tags", "TagSection"],
        &["", "", "smoke", "", "", "x"],
        &["<END>"],
    ];

    const SPECIFICATION: &[&[&str]] = &[
        &["<SPECIFICATION>"],
        &["Field", "Internal", "C1"],
        &["Name", "name", "x"],
        &["Severity"],
        &["Abort", "", "x"],
        &["Rule"],
        &["C1", "Mandatory", "The field must be filled"],
        &["<END>"],
    ];

    const MATRIX: &[&[&str]] = &[
        &["<MATRIX_TABLE>", "name", "shortName", "position", "execute", "generator", "description", "", "", "<END>"],
        &["name", "", "", "", "", "", "", "", "first"],
        &["shortName"],
        &["position"],
        &["execute"],
        &["generator"],
        &["description"],
        &["<END>"],
    ];

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        Sheet::from_rows(name, rows.iter().map(|row| row.iter()))
    }

    fn workbook() -> Workbook {
        Workbook::new("book.xlsx")
            .with_sheet(sheet("Decision", DECISION))
            .with_sheet(sheet("Spec", SPECIFICATION))
            .with_sheet(sheet("Matrix", MATRIX))
            .with_sheet(sheet("Notes", &[&["Some notes"]]))
            .with_sheet(sheet("Empty", &[]))
    }

    struct DummyParser;

    impl TableParser for DummyParser {
        fn parse(&mut self, request: &ParseRequest<'_>, _diagnostics: &mut Diagnostics) -> Result<Table, TableError> {
            Ok(Table::Matrix(MatrixTable::new(request.sheet_name, request.file_name)))
        }
    }

    #[test]
    fn test_process_workbook() {
        let mut processor = FileProcessor::default();
        let workbook = workbook();
        processor.process_workbook("book.xlsx", &workbook);

        let names: Vec<&str> = processor.tables().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Decision", "Matrix", "Spec"]);
        assert!(processor.table("Decision").unwrap().as_decision().is_some());
        assert!(processor.table("Matrix").unwrap().as_matrix().is_some());
        assert_eq!(processor.table("Spec").unwrap().file_name(), "book.xlsx");

        let ignored: Vec<(Level, Option<&str>)> = processor
            .diagnostics()
            .iter()
            .map(|diagnostic| (diagnostic.level(), diagnostic.sheet()))
            .collect();
        assert_eq!(ignored, vec![(Level::Info, Some("Notes")), (Level::Info, Some("Empty"))]);
    }

    #[test]
    fn test_failing_sheet_is_isolated() {
        let mut processor = FileProcessor::default();
        let workbook = Workbook::new("book.xlsx")
            .with_sheet(sheet("Broken", &[&["<DECISION_TABLE>"], &["Tags", "TagSection"]]))
            .with_sheet(sheet("Decision", DECISION));
        processor.process_workbook("book.xlsx", &workbook);

        assert!(processor.table("Broken").is_none());
        assert!(processor.table("Decision").is_some());
        let error = processor.diagnostics().errors().next().unwrap();
        assert_eq!(error.sheet(), Some("Broken"));
        assert!(error.message().starts_with("book.xlsx: SheetEndRow: Could not find the end sheet identifier '<END>'"));
    }

    #[test]
    fn test_strict_mode() {
        let rows: &[&[&str]] = &[
            &["<DECISION_TABLE>"],
            &["Person", "FieldSection"],
            &["Name", "FieldSubSection"],
            &["Name", "FieldSubSection"],
            &["<END>"],
        ];
        let workbook = Workbook::new("book.xlsx").with_sheet(sheet("Decision", rows));

        let mut lenient = FileProcessor::default();
        lenient.process_workbook("book.xlsx", &workbook);
        assert!(lenient.table("Decision").is_some());

        let mut strict = FileProcessor::new(ProcessorOptions {
            strict: Some(true),
            ..ProcessorOptions::default()
        });
        strict.process_workbook("book.xlsx", &workbook);
        assert!(strict.table("Decision").is_none());
        assert_eq!(strict.diagnostics().warning_count(), 1);
    }

    #[test]
    fn test_sheet_name_patterns() {
        let mut processor = FileProcessor::new(ProcessorOptions {
            sheet_name_patterns: Some(vec![Pattern::new("D*").unwrap(), Pattern::new("Sp?c").unwrap()]),
            ..ProcessorOptions::default()
        });
        processor.process_workbook("book.xlsx", &workbook());

        let names: Vec<&str> = processor.tables().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Decision", "Spec"]);
        assert!(processor.diagnostics().is_empty());
    }

    #[test]
    fn test_register_parser_ignores_case() {
        let mut processor = FileProcessor::new(ProcessorOptions::default());
        processor.register_parser("<decision_table>", Box::new(DummyParser));
        assert_eq!(processor.diagnostics().warning_count(), 1);

        processor.process_workbook("book.xlsx", &Workbook::new("book.xlsx").with_sheet(sheet("Decision", DECISION)));
        assert!(processor.table("Decision").unwrap().as_matrix().is_some());
    }

    #[test]
    fn test_sheet_layout() {
        let mut processor = FileProcessor::without_parsers(ProcessorOptions::default());
        processor.register_parser(KEY_DECISION_TABLE, Box::new(DecisionParser::new()));
        processor.set_sheet_layout(
            "Shifted",
            SheetLayout {
                start_row: 1,
                start_column: 1,
                end_key: "<STOP>".to_owned(),
            },
        );
        let shifted: &[&[&str]] = &[
            &[],
            &["", "<DECISION_TABLE>"],
            &["", "Summary", "SummarySection"],
            &["", "<STOP>"],
        ];
        processor.process_workbook("book.xlsx", &Workbook::new("book.xlsx").with_sheet(sheet("Shifted", shifted)));

        let table = processor.table("Shifted").unwrap().as_decision().unwrap();
        assert_eq!(table.sections()[0].name, "Summary");
    }

    #[test]
    fn test_duplicate_table_name() {
        let mut processor = FileProcessor::default();
        let workbook = Workbook::new("book.xlsx").with_sheet(sheet("Decision", DECISION));
        processor.process_workbook("first.xlsx", &workbook);
        processor.process_workbook("second.xlsx", &workbook);

        assert_eq!(processor.tables().len(), 1);
        assert_eq!(processor.table("Decision").unwrap().file_name(), "second.xlsx");
        assert_eq!(processor.diagnostics().warning_count(), 1);

        processor.clear_tables();
        assert!(processor.tables().is_empty());
    }

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Decision" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>&lt;DECISION_TABLE&gt;</t></is></c><c r="F1" t="inlineStr"><is><t>tc1</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Tags</t></is></c><c r="B2" t="inlineStr"><is><t>TagSection</t></is></c></row>
<row r="3"><c r="C3" t="inlineStr"><is><t>smoke</t></is></c><c r="F3" t="inlineStr"><is><t>x</t></is></c></row>
<row r="4"><c r="A4" t="inlineStr"><is><t>&lt;END&gt;</t></is></c></row>
</sheetData></worksheet>"#;

    #[test]
    fn test_load_files() {
        let directory = tempfile::tempdir().unwrap();
        let package = build_package(&[
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/worksheets/sheet1.xml", SHEET),
        ]);
        std::fs::write(directory.path().join("book.xlsx"), package).unwrap();
        std::fs::write(directory.path().join("broken.xlsx"), b"not a zip file").unwrap();
        std::fs::write(directory.path().join("notes.txt"), b"ignored").unwrap();

        let pattern = directory.path().join("*.xlsx").display().to_string();
        let missing = directory.path().join("missing.xlsx").display().to_string();
        let mut processor = FileProcessor::default();
        let loaded = processor.load(&[&pattern, &missing]).unwrap();

        assert_eq!(loaded, 1);
        let table = processor.table("Decision").unwrap().as_decision().unwrap();
        assert!(table.file_name.ends_with("book.xlsx"));
        let tag = &table.section("Tags").unwrap().keyed_rows()[0];
        assert_eq!(tag.key.as_deref(), Some("smoke"));
        assert_eq!(table.testcases()[0].value(tag.id), Some("x"));

        let errors: Vec<&str> = processor.diagnostics().errors().map(Diagnostic::message).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Could not open the file"));
        assert!(errors[0].contains("broken.xlsx"));
        assert_eq!(processor.diagnostics().warning_count(), 1);
    }

    #[test]
    fn test_load_invalid_pattern() {
        let mut processor = FileProcessor::default();
        assert!(matches!(processor.load(&["[invalid"]), Err(TableError::PatternError(_))));
    }
}
