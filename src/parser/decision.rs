//! Parser of `<DECISION_TABLE>` sheets
//!
//! Column layout relative to the start column `S`:
//!
//! | column  | content                                              |
//! |---------|------------------------------------------------------|
//! | `S`     | section or field name                                |
//! | `S + 1` | section type code / `FieldSubSection`                |
//! | `S + 2` | key, tag, filter processor, equivalence class        |
//! | `S + 3` | other, expression, generator values, generator call  |
//! | `S + 4` | comment                                              |
//! | `S + 5` | first test case column, named in the start row       |

use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::error::TableError;
use crate::model::decision::DecisionTable;
use crate::model::decision::ModelError;
use crate::model::decision::RowId;
use crate::model::decision::SectionKind;
use crate::model::Table;
use crate::parser::boundary::find_end_row;
use crate::parser::boundary::MAX_EMPTY_ROWS;
use crate::parser::coerce::get_boolean;
use crate::parser::coerce::get_multiplicity_from_value;
use crate::parser::section::next_sub_section;
use crate::parser::section::scan_sections;
use crate::parser::section::SectionRange;
use crate::parser::ParseRequest;
use crate::parser::ParserError;
use crate::parser::TableParser;
use std::collections::HashSet;
use std::ops::Range;

/// Table type key of decision sheets
pub const KEY_DECISION_TABLE: &str = "<DECISION_TABLE>";

const COLUMN_TYPE: usize = 1;
const COLUMN_KEY: usize = 2;
const COLUMN_OTHER: usize = 3;
const COLUMN_COMMENT: usize = 4;
const COLUMN_TESTCASE: usize = 5;

#[derive(Debug)]
pub struct DecisionParser {
    /// Counter for names of fields without a name
    field_name_sequence: usize,
    max_empty_rows: usize,
}

impl Default for DecisionParser {
    fn default() -> Self {
        Self {
            field_name_sequence: 0,
            max_empty_rows: MAX_EMPTY_ROWS,
        }
    }
}

impl DecisionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_empty_rows(mut self, max_empty_rows: usize) -> Self {
        self.max_empty_rows = max_empty_rows;
        self
    }

    fn field_name(&mut self) -> String {
        self.field_name_sequence += 1;
        format!("__Field_{}", self.field_name_sequence)
    }

    fn handle_section(
        &mut self,
        request: &ParseRequest<'_>,
        table: &mut DecisionTable,
        name: &str,
        range: SectionRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ModelError> {
        tracing::debug!(sheet = request.sheet_name, section = %range.kind, row = range.start_row, "Handle section");
        match range.kind {
            SectionKind::MultiRow | SectionKind::Tag | SectionKind::Filter | SectionKind::GeneratorSwitch => {
                handle_keyed_section(request, table, name, range)
            }
            SectionKind::Summary => {
                table.add_section(name, SectionKind::Summary);
                Ok(())
            }
            SectionKind::Multiplicity | SectionKind::Execute | SectionKind::NeverExecute => {
                handle_single_section(request, table, name, range, diagnostics)
            }
            SectionKind::Field => self.handle_field_section(request, table, name, range, diagnostics),
        }
    }

    /// Splits a field section into its fields and reads their equivalence class rows.
    fn handle_field_section(
        &mut self,
        request: &ParseRequest<'_>,
        table: &mut DecisionTable,
        name: &str,
        range: SectionRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ModelError> {
        let start_column = request.layout.start_column;
        let section = table.add_section(name, SectionKind::Field);
        let mut field_names = HashSet::new();
        let mut current_row = range.start_row + 1;
        while current_row < range.end_row {
            let sub_section = next_sub_section(request, current_row, range.end_row);
            let skipped_end = sub_section.as_ref().map_or(range.end_row, |sub_section| sub_section.start_row);
            report_rows_outside_field(request, table, name, current_row..skipped_end, diagnostics);
            let Some(sub_section) = sub_section else {
                break;
            };

            let field_name = match request.cell(start_column, sub_section.start_row) {
                Some(field_name) => field_name,
                None => {
                    diagnostics.push(
                        Diagnostic::error("next_sub_section", "No field name defined.")
                            .with_sheet(request.sheet_name)
                            .with_row(sub_section.start_row)
                            .with_column(start_column + COLUMN_TYPE),
                    );
                    self.field_name()
                }
            };
            if !field_names.insert(field_name.clone()) {
                diagnostics.push(
                    Diagnostic::error(
                        "handle_field_section",
                        format!(
                            "Double FieldSubSection name '{}' in section '{}' in table '{}'",
                            field_name, name, request.sheet_name
                        ),
                    )
                    .with_sheet(request.sheet_name)
                    .with_row(sub_section.start_row)
                    .with_column(start_column + COLUMN_TYPE),
                );
            }

            let field = table.add_field(section, &field_name)?;
            for row in sub_section.start_row + 1..sub_section.end_row {
                let row_id = table.add_equivalence_row(
                    section,
                    field,
                    request.cell(start_column + COLUMN_KEY, row),
                    request.cell(start_column + COLUMN_OTHER, row),
                    request.cell(start_column + COLUMN_COMMENT, row),
                )?;
                read_testcase_values(request, table, row, row_id)?;
            }
            current_row = sub_section.end_row;
        }

        if field_names.is_empty() {
            diagnostics.push(
                Diagnostic::error("handle_field_section", format!("The field section '{}' does not contain any field", name))
                    .with_sheet(request.sheet_name)
                    .with_row(range.start_row)
                    .with_column(start_column),
            );
        }
        Ok(())
    }
}

impl TableParser for DecisionParser {
    fn parse(&mut self, request: &ParseRequest<'_>, diagnostics: &mut Diagnostics) -> Result<Table, TableError> {
        tracing::debug!(sheet = request.sheet_name, "Parse decision table");
        let mut table = DecisionTable::new(request.sheet_name, request.file_name);
        parse_for_testcases(request, &mut table);
        let sheet_end_row = find_end_row(request, self.max_empty_rows)?;

        let mut errors = Vec::new();
        let sections = scan_sections(request, sheet_end_row, &mut errors);
        let mut named_sections = Vec::new();
        for range in sections.iter().flatten() {
            match request.cell(request.layout.start_column, range.start_row) {
                Some(name) => named_sections.push((name, *range)),
                None => errors.push(
                    Diagnostic::error("parse", format!("No section name defined in row '{}'", range.start_row))
                        .with_sheet(request.sheet_name)
                        .with_row(range.start_row)
                        .with_column(request.layout.start_column),
                ),
            }
        }
        let count = errors.len();
        errors.into_iter().for_each(|error| diagnostics.push(error));
        if let Err(error) = sections {
            Err(error)?
        }
        if count > 0 {
            Err(ParserError::InvalidSections {
                sheet: request.sheet_name.to_owned(),
                count,
            })?
        }

        for (name, range) in named_sections {
            self.handle_section(request, &mut table, &name, range, diagnostics)?;
        }
        update_testcases(&mut table);
        Ok(Table::Decision(table))
    }
}

/// Creates a test case for every name in the start row, up to the first absent cell.
///
/// # Returns
/// The number of test cases found
fn parse_for_testcases(request: &ParseRequest<'_>, table: &mut DecisionTable) -> usize {
    let first_column = request.layout.start_column + COLUMN_TESTCASE;
    let mut column = first_column;
    while let Some(name) = request.cell(column, request.layout.start_row) {
        table.add_testcase(&name);
        column += 1;
    }
    tracing::info!(
        sheet = request.sheet_name,
        count = column - first_column,
        end_column = column,
        "Read testcases"
    );
    column - first_column
}

/// Reads the mark of every test case in `row` and stores it under `row_id`.
fn read_testcase_values(
    request: &ParseRequest<'_>,
    table: &mut DecisionTable,
    row: usize,
    row_id: RowId,
) -> Result<(), ModelError> {
    let first_column = request.layout.start_column + COLUMN_TESTCASE;
    for testcase in 0..table.testcases().len() {
        table.set_value(testcase, row_id, request.cell(first_column + testcase, row))?;
    }
    Ok(())
}

fn handle_keyed_section(
    request: &ParseRequest<'_>,
    table: &mut DecisionTable,
    name: &str,
    range: SectionRange,
) -> Result<(), ModelError> {
    let start_column = request.layout.start_column;
    let section = table.add_section(name, range.kind);
    for row in range.start_row + 1..range.end_row {
        let row_id = table.add_keyed_row(
            section,
            request.cell(start_column + COLUMN_KEY, row),
            request.cell(start_column + COLUMN_OTHER, row),
            request.cell(start_column + COLUMN_COMMENT, row),
        )?;
        read_testcase_values(request, table, row, row_id)?;
    }
    Ok(())
}

/// Warns about rows of a field section which belong to no field, their marks are lost.
fn report_rows_outside_field(
    request: &ParseRequest<'_>,
    table: &DecisionTable,
    section_name: &str,
    rows: Range<usize>,
    diagnostics: &mut Diagnostics,
) {
    let start_column = request.layout.start_column;
    let end_column = start_column + COLUMN_TESTCASE + table.testcases().len();
    for row in rows {
        if (start_column..end_column).any(|column| request.cell(column, row).is_some()) {
            diagnostics.push(
                Diagnostic::warning(
                    "handle_field_section",
                    format!(
                        "The row '{}' in the field section '{}' is not part of a FieldSubSection, it is ignored",
                        row, section_name
                    ),
                )
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(start_column),
            );
        }
    }
}

/// Execute, never execute and multiplicity sections only carry the marks of their header row.
fn handle_single_section(
    request: &ParseRequest<'_>,
    table: &mut DecisionTable,
    name: &str,
    range: SectionRange,
    diagnostics: &mut Diagnostics,
) -> Result<(), ModelError> {
    if let Some(existing) = table.single_check(range.kind) {
        diagnostics.push(
            Diagnostic::error(
                "handle_single_section",
                format!(
                    "The {} '{}' is defined more than once, the section '{}' is used",
                    range.kind, name, existing.name
                ),
            )
            .with_sheet(request.sheet_name)
            .with_row(range.start_row)
            .with_column(request.layout.start_column + COLUMN_TYPE),
        );
    }
    let section = table.add_section(name, range.kind);
    let header_row = table.sections()[section].header_row;
    read_testcase_values(request, table, range.start_row, header_row)
}

/// Copies execute, never execute and multiplicity marks into the test cases.
fn update_testcases(table: &mut DecisionTable) {
    let header_row = |kind| table.single_check(kind).map(|section| section.header_row);
    let execute = header_row(SectionKind::Execute);
    let never_execute = header_row(SectionKind::NeverExecute);
    let multiplicity = header_row(SectionKind::Multiplicity);
    for testcase in table.testcases_mut() {
        if let Some(row) = execute {
            testcase.execute = get_boolean(testcase.value(row));
        }
        if let Some(row) = never_execute {
            testcase.never_execute = get_boolean(testcase.value(row));
        }
        if let Some(row) = multiplicity {
            testcase.multiplicity = get_multiplicity_from_value(testcase.value(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::parser::tests::grid;
    use crate::parser::SheetLayout;

    fn parse(rows: &[&[&str]], parser: &mut DecisionParser, diagnostics: &mut Diagnostics) -> Result<DecisionTable, TableError> {
        let workbook = grid("Decision", rows);
        let layout = SheetLayout::default();
        let request = ParseRequest::new("test.xlsx", "Decision", &workbook, &layout);
        match parser.parse(&request, diagnostics)? {
            Table::Decision(table) => Ok(table),
            table => panic!("unexpected table {:?}", table),
        }
    }

    const FULL_SHEET: &[&[&str]] = &[
        &["<DECISION_TABLE>", "", "", "", "", "tc1", "tc2", "tc3"],
        &["Execute", "ExecuteSection", "", "", "", "yes", "no"],
        &["Never", "NeverExecuteSection", "", "", "", "", "", "t"],
        &["Times", "MultiplicitySection", "", "", "", "3", "x", "-1"],
        &["Rows", "MultiRowSection"],
        &["", "", "key1", "other1", "first", "x", "", "x"],
        &["", "", "key2"],
        &["Tags", "TagSection"],
        &["", "", "smoke", "", "", "x"],
        &["Filters", "FilterSection"],
        &["", "", "processor", "a > 1", "filter", "", "x"],
        &["Generators", "GeneratorSwitchSection"],
        &["", "", "gen", "1,2", "switch"],
        &["Person", "FieldSection"],
        &["Name", "FieldSubSection"],
        &["", "", "valid name", "gen:name", "ok", "x", "", ""],
        &["", "", "empty", "", "", "", "x", ""],
        &["Email", "FieldSubSection"],
        &["", "", "invalid", "", "", "", "", "e"],
        &["Summary", "SummarySection"],
        &["<END>"],
    ];

    #[test]
    fn test_parse_full_sheet() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(FULL_SHEET, &mut DecisionParser::new(), &mut diagnostics).unwrap();

        assert_eq!(diagnostics.error_count(), 0);
        assert_eq!(table.name, "Decision");
        assert_eq!(table.file_name, "test.xlsx");
        assert_eq!(table.testcase_order(), vec!["tc1", "tc2", "tc3"]);

        let kinds: Vec<SectionKind> = table.sections().iter().map(|section| section.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Execute,
                SectionKind::NeverExecute,
                SectionKind::Multiplicity,
                SectionKind::MultiRow,
                SectionKind::Tag,
                SectionKind::Filter,
                SectionKind::GeneratorSwitch,
                SectionKind::Field,
                SectionKind::Summary,
            ]
        );

        let rows = table.section("Rows").unwrap().keyed_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.as_deref(), Some("key1"));
        assert_eq!(rows[0].other.as_deref(), Some("other1"));
        assert_eq!(rows[0].comment.as_deref(), Some("first"));
        assert_eq!(rows[1].key.as_deref(), Some("key2"));
        assert_eq!(rows[1].comment, None);

        let filter = &table.section("Filters").unwrap().keyed_rows()[0];
        assert_eq!(filter.key.as_deref(), Some("processor"));
        assert_eq!(filter.other.as_deref(), Some("a > 1"));

        let fields = table.section("Person").unwrap().fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Name");
        assert_eq!(fields[0].rows.len(), 2);
        assert_eq!(fields[0].rows[0].equivalence_class.as_deref(), Some("valid name"));
        assert_eq!(fields[0].rows[0].generator.as_deref(), Some("gen:name"));
        assert_eq!(fields[1].name, "Email");

        let testcases = table.testcases();
        assert_eq!(testcases[0].value(rows[0].id), Some("x"));
        assert_eq!(testcases[1].value(rows[0].id), None);
        assert_eq!(testcases[2].value(rows[0].id), Some("x"));
        assert_eq!(testcases[1].value(fields[0].rows[1].id), Some("x"));
        assert_eq!(testcases[2].value(fields[1].rows[0].id), Some("e"));
    }

    #[test]
    fn test_testcase_flags() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(FULL_SHEET, &mut DecisionParser::new(), &mut diagnostics).unwrap();
        let testcases = table.testcases();

        assert!(testcases[0].execute);
        assert!(!testcases[1].execute);
        assert!(!testcases[2].execute);
        assert!(!testcases[0].never_execute);
        assert!(testcases[2].never_execute);
        assert_eq!(testcases[0].multiplicity, 3);
        assert_eq!(testcases[1].multiplicity, 1);
        assert_eq!(testcases[2].multiplicity, 1);
    }

    #[test]
    fn test_defaults_without_single_sections() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(
            &[
                &["<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["Summary", "SummarySection"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        )
        .unwrap();

        let testcase = &table.testcases()[0];
        assert!(testcase.execute);
        assert!(!testcase.never_execute);
        assert_eq!(testcase.multiplicity, 1);
    }

    #[test]
    fn test_double_field_name() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(
            &[
                &["<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["Person", "FieldSection"],
                &["Name", "FieldSubSection"],
                &["", "", "valid"],
                &["Name", "FieldSubSection"],
                &["", "", "invalid"],
                &["Address", "FieldSection"],
                &["Name", "FieldSubSection"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(diagnostics.error_count(), 1);
        let error = diagnostics.errors().next().unwrap();
        assert_eq!(
            error.message(),
            "Double FieldSubSection name 'Name' in section 'Person' in table 'Decision'"
        );
        assert_eq!(error.row(), Some(4));
        assert_eq!(table.section("Person").unwrap().fields().len(), 2);
    }

    #[test]
    fn test_synthetic_field_names() {
        let rows: &[&[&str]] = &[
            &["<DECISION_TABLE>"],
            &["Person", "FieldSection"],
            &["", "FieldSubSection"],
            &["", "", "valid"],
            &["<END>"],
        ];
        let mut parser = DecisionParser::new();
        let mut diagnostics = Diagnostics::new();
        let first = parse(rows, &mut parser, &mut diagnostics).unwrap();
        let second = parse(rows, &mut parser, &mut diagnostics).unwrap();

        assert_eq!(first.section("Person").unwrap().fields()[0].name, "__Field_1");
        assert_eq!(second.section("Person").unwrap().fields()[0].name, "__Field_2");
        assert_eq!(diagnostics.error_count(), 2);
        assert!(diagnostics.errors().all(|error| error.message() == "No field name defined."));
    }

    #[test]
    fn test_empty_field_section() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(
            &[
                &["<DECISION_TABLE>"],
                &["Person", "FieldSection"],
                &["Summary", "SummarySection"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        )
        .unwrap();

        assert!(table.section("Person").unwrap().fields().is_empty());
        assert_eq!(
            diagnostics.errors().next().unwrap().message(),
            "The field section 'Person' does not contain any field"
        );
    }

    #[test]
    fn test_double_execute_section() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(
            &[
                &["<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["Run", "ExecuteSection", "", "", "", "no"],
                &["Run again", "ExecuteSection", "", "", "", "yes"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(table.single_check(SectionKind::Execute).unwrap().name, "Run");
        assert!(!table.testcases()[0].execute);
    }

    #[test]
    fn test_invalid_sections_abort() {
        let mut diagnostics = Diagnostics::new();
        let result = parse(
            &[
                &["<DECISION_TABLE>"],
                &["Tags", "TagSection"],
                &["Broken", "WrongSection"],
                &["Lost"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        );

        assert!(matches!(
            result,
            Err(TableError::ParserError(ParserError::InvalidSections { count: 2, .. }))
        ));
        assert_eq!(diagnostics.error_count(), 2);
        assert!(diagnostics.iter().all(|diagnostic| diagnostic.level() == Level::Error));
    }

    #[test]
    fn test_missing_section_name() {
        let mut diagnostics = Diagnostics::new();
        let result = parse(
            &[
                &["<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["", "TagSection"],
                &["", "", "smoke", "", "", "x"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        );

        assert!(matches!(
            result,
            Err(TableError::ParserError(ParserError::InvalidSections { count: 1, .. }))
        ));
        let messages: Vec<&str> = diagnostics.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, vec!["No section name defined in row '1'"]);
        assert_eq!(diagnostics.errors().next().unwrap().row(), Some(1));
    }

    #[test]
    fn test_rows_before_first_field() {
        let mut diagnostics = Diagnostics::new();
        let table = parse(
            &[
                &["<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["Person", "FieldSection"],
                &["", "", "orphan", "", "", "x"],
                &[],
                &["Name", "FieldSubSection"],
                &["", "", "valid", "", "", "x"],
                &["<END>"],
            ],
            &mut DecisionParser::new(),
            &mut diagnostics,
        )
        .unwrap();

        let fields = table.section("Person").unwrap().fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].rows.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        let warning = diagnostics.iter().next().unwrap();
        assert_eq!(warning.level(), Level::Warning);
        assert_eq!(warning.row(), Some(2));
        assert_eq!(
            warning.message(),
            "The row '2' in the field section 'Person' is not part of a FieldSubSection, it is ignored"
        );
    }

    #[test]
    fn test_missing_end_row() {
        let mut diagnostics = Diagnostics::new();
        let result = parse(
            &[&["<DECISION_TABLE>"], &["Tags", "TagSection"]],
            &mut DecisionParser::new().with_max_empty_rows(5),
            &mut diagnostics,
        );
        assert!(matches!(
            result,
            Err(TableError::ParserError(ParserError::EndRowNotFound { .. }))
        ));
    }

    #[test]
    fn test_shifted_layout() {
        let workbook = grid(
            "Decision",
            &[
                &[],
                &["", "<DECISION_TABLE>", "", "", "", "", "tc1"],
                &["", "Tags", "TagSection", "", "", "", ""],
                &["", "", "", "smoke", "", "", "x"],
                &["", "<END>"],
            ],
        );
        let layout = SheetLayout {
            start_row: 1,
            start_column: 1,
            ..SheetLayout::default()
        };
        let request = ParseRequest::new("test.xlsx", "Decision", &workbook, &layout);
        let mut diagnostics = Diagnostics::new();
        let table = match DecisionParser::new().parse(&request, &mut diagnostics).unwrap() {
            Table::Decision(table) => table,
            table => panic!("unexpected table {:?}", table),
        };

        let tag = &table.section("Tags").unwrap().keyed_rows()[0];
        assert_eq!(tag.key.as_deref(), Some("smoke"));
        assert_eq!(table.testcases()[0].value(tag.id), Some("x"));
    }
}
