//! Parser of `<SPECIFICATION>` sheets
//!
//! ```text
//!          S            S+1             S+2 ..= end column
//! start    <SPECIFICATION>
//! +1       (header)     (header)        rule names
//! +2..     field name   internal name   rule values of the field
//!          Severity
//!          severity                     one mark per rule column
//!          Rule
//!          rule name    short desc      long desc
//!          <END>
//! ```
//!
//! The parsed [`Specification`] is converted into a decision table. Missing marker
//! rows and a malformed rule header abort the sheet, everything else is reported
//! and parsing goes on.

use crate::converter::convert;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::error::TableError;
use crate::model::specification::FieldRule;
use crate::model::specification::Rule;
use crate::model::specification::SpecField;
use crate::model::specification::Specification;
use crate::model::Table;
use crate::parser::boundary::find_end_row;
use crate::parser::boundary::MAX_EMPTY_ROWS;
use crate::parser::ParseRequest;
use crate::parser::ParserError;
use crate::parser::TableParser;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

/// Table type key of specification sheets
pub const KEY_SPECIFICATION: &str = "<SPECIFICATION>";
/// First column value of the row opening the severity block
pub const KEY_SEVERITY: &str = "Severity";
/// First column value of the row opening the rule block
pub const KEY_RULE: &str = "Rule";

/// Columns after the last rule column which must stay empty
const MAX_EMPTY_RULE_COLUMNS: usize = 100;

/// Row and column boundaries of one specification sheet
#[derive(Debug, Clone, Copy)]
struct SheetRows {
    end_row: usize,
    end_column: usize,
    severity_row: usize,
    rule_row: usize,
}

impl SheetRows {
    fn rule_columns(&self, start_column: usize) -> std::ops::RangeInclusive<usize> {
        start_column + 2..=self.end_column
    }
}

#[derive(Debug)]
pub struct SpecificationParser {
    max_empty_rows: usize,
}

impl Default for SpecificationParser {
    fn default() -> Self {
        Self {
            max_empty_rows: MAX_EMPTY_ROWS,
        }
    }
}

impl SpecificationParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_empty_rows(mut self, max_empty_rows: usize) -> Self {
        self.max_empty_rows = max_empty_rows;
        self
    }

    /// Reads the specification model of a sheet without converting it.
    pub fn parse_specification(
        &self,
        request: &ParseRequest<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Specification, TableError> {
        tracing::debug!(sheet = request.sheet_name, "Parse specification");
        let end_row = find_end_row(request, self.max_empty_rows)?;
        let end_column = find_rule_end_column(request)?;
        let (severity_row, rule_row) = find_marker_rows(request, end_row, diagnostics)?;
        let rows = SheetRows {
            end_row,
            end_column,
            severity_row,
            rule_row,
        };

        let mut specification = Specification::new(request.sheet_name);
        let severities = resolve_severities(request, &rows, diagnostics);
        for (row, field) in parse_fields(request, &rows, &severities, diagnostics) {
            if specification.fields.contains_key(&field.name) {
                diagnostics.push(
                    Diagnostic::error("parse_fields", format!("The field '{}' is double defined", field.name))
                        .with_sheet(request.sheet_name)
                        .with_row(row)
                        .with_column(request.layout.start_column),
                );
            }
            specification.add_field(field);
        }
        specification.rules = parse_rules(request, &rows, diagnostics);
        specification.severities = parse_severities(request, &rows, diagnostics);
        check_for_unused_rules(request, &rows, &specification.rules, diagnostics);

        tracing::info!(
            sheet = request.sheet_name,
            fields = specification.field_order.len(),
            rules = specification.rules.len(),
            severities = specification.severities.len(),
            "Parsed specification"
        );
        Ok(specification)
    }
}

impl TableParser for SpecificationParser {
    fn parse(&mut self, request: &ParseRequest<'_>, diagnostics: &mut Diagnostics) -> Result<Table, TableError> {
        let specification = self.parse_specification(request, diagnostics)?;
        Ok(Table::Decision(convert(&specification, request.file_name, diagnostics)?))
    }
}

/// Finds the last rule column in the rule name row.
///
/// The rule names start at `S + 2` and end at the first absent cell. Any further
/// rule name within the next columns means a gap in the header.
fn find_rule_end_column(request: &ParseRequest<'_>) -> Result<usize, ParserError> {
    let row = request.layout.start_row + 1;
    let first_column = request.layout.start_column + 2;
    let mut column = first_column;
    while request.cell(column, row).is_some() {
        column += 1;
    }
    if column == first_column {
        Err(ParserError::NoRules {
            sheet: request.sheet_name.to_owned(),
        })?
    }

    let end_column = column - 1;
    if (end_column + 1..end_column + MAX_EMPTY_RULE_COLUMNS).any(|column| request.cell(column, row).is_some()) {
        Err(ParserError::EmptyRuleColumns {
            sheet: request.sheet_name.to_owned(),
        })?
    }
    Ok(end_column)
}

/// Locates the `Severity` and `Rule` marker rows, a later marker wins.
fn find_marker_rows(
    request: &ParseRequest<'_>,
    end_row: usize,
    diagnostics: &mut Diagnostics,
) -> Result<(usize, usize), ParserError> {
    let mut severity_row = None;
    let mut rule_row = None;
    for row in request.layout.start_row + 1..end_row {
        match request.cell(request.layout.start_column, row).as_deref() {
            Some(KEY_SEVERITY) => severity_row = Some(row),
            Some(KEY_RULE) => rule_row = Some(row),
            _ => {}
        }
    }

    let mut missing = Vec::new();
    for (marker, row) in [(KEY_SEVERITY, severity_row), (KEY_RULE, rule_row)] {
        if row.is_none() {
            diagnostics.push(
                Diagnostic::error("find_marker_rows", format!("The '{}' section could not be found", marker))
                    .with_sheet(request.sheet_name),
            );
            missing.push(format!("'{}'", marker));
        }
    }
    match (severity_row, rule_row) {
        (Some(severity_row), Some(rule_row)) => Ok((severity_row, rule_row)),
        _ => Err(ParserError::MissingMarkers {
            sheet: request.sheet_name.to_owned(),
            markers: missing.join(", "),
        }),
    }
}

/// Resolves the severity of every rule column, the first marked severity wins.
fn resolve_severities(
    request: &ParseRequest<'_>,
    rows: &SheetRows,
    diagnostics: &mut Diagnostics,
) -> HashMap<usize, String> {
    let start_column = request.layout.start_column;
    let mut severities = HashMap::new();
    for column in rows.rule_columns(start_column) {
        let mut severity: Option<String> = None;
        for row in rows.severity_row + 1..rows.rule_row {
            if request.cell(column, row).is_none() {
                continue;
            }
            if severity.is_none() {
                severity = request.cell(start_column, row);
            } else {
                diagnostics.push(
                    Diagnostic::error(
                        "resolve_severities",
                        format!("The rule in column '{}' has more than one severity assigned", column),
                    )
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(column),
                );
            }
        }
        match severity {
            Some(severity) => {
                severities.insert(column, severity);
            }
            None => diagnostics.push(
                Diagnostic::error(
                    "resolve_severities",
                    format!("The rule in column '{}' has no severity assigned", column),
                )
                .with_sheet(request.sheet_name)
                .with_column(column),
            ),
        }
    }
    severities
}

/// Reads the field rows together with their row index.
fn parse_fields(
    request: &ParseRequest<'_>,
    rows: &SheetRows,
    severities: &HashMap<usize, String>,
    diagnostics: &mut Diagnostics,
) -> Vec<(usize, SpecField)> {
    let start_column = request.layout.start_column;
    let rule_name_row = request.layout.start_row + 1;
    let mut fields = Vec::new();
    for row in request.layout.start_row + 2..rows.severity_row {
        let name = request.cell(start_column, row);
        let internal_name = request.cell(start_column + 1, row);
        let (Some(name), Some(internal_name)) = (name, internal_name) else {
            diagnostics.push(
                Diagnostic::error("parse_fields", format!("In the row '{}' there is no field name defined", row))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
            continue;
        };

        let rules: Vec<FieldRule> = rows
            .rule_columns(start_column)
            .filter_map(|column| {
                Some(FieldRule {
                    rule_name: request.cell(column, rule_name_row)?,
                    value: request.cell(column, row)?,
                    severity: severities.get(&column)?.clone(),
                })
            })
            .collect();
        if rules.is_empty() {
            diagnostics.push(
                Diagnostic::error(
                    "parse_fields",
                    format!(
                        "No rules defined for the field '{}' or the rules are not complete.",
                        internal_name
                    ),
                )
                .with_sheet(request.sheet_name)
                .with_row(row),
            );
        }
        fields.push((
            row,
            SpecField {
                name,
                internal_name,
                rules,
            },
        ));
    }
    fields
}

/// Reads the rule block. A rule needs a name and a short description.
fn parse_rules(request: &ParseRequest<'_>, rows: &SheetRows, diagnostics: &mut Diagnostics) -> BTreeMap<String, Rule> {
    let start_column = request.layout.start_column;
    let mut rules = BTreeMap::new();
    for row in rows.rule_row + 1..rows.end_row {
        let name = request.cell(start_column, row);
        let short_desc = request.cell(start_column + 1, row);
        let long_desc = request.cell(start_column + 2, row);
        let label = name.as_deref().unwrap_or_default();

        if short_desc.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "parse_rules",
                    format!("The short description for the rule '{}' is not defined", label),
                )
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(start_column + 1),
            );
        }
        if long_desc.is_none() {
            diagnostics.push(
                Diagnostic::warning(
                    "parse_rules",
                    format!("The long description for the rule '{}' is not defined", label),
                )
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(start_column + 2),
            );
        }
        if name.is_none() {
            diagnostics.push(
                Diagnostic::error("parse_rules", "The rule name is not defined")
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
        }

        let (Some(name), Some(short_desc)) = (name, short_desc) else {
            continue;
        };
        if rules.contains_key(&name) {
            diagnostics.push(
                Diagnostic::error("parse_rules", format!("The rule '{}' is double defined", name))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
        }
        rules.insert(
            name.clone(),
            Rule {
                name,
                short_desc,
                long_desc,
            },
        );
    }
    rules
}

/// Reads the severity names in declaration order.
fn parse_severities(request: &ParseRequest<'_>, rows: &SheetRows, diagnostics: &mut Diagnostics) -> Vec<String> {
    let start_column = request.layout.start_column;
    let mut severities: Vec<String> = Vec::new();
    for row in rows.severity_row + 1..rows.rule_row {
        let Some(severity) = request.cell(start_column, row) else {
            diagnostics.push(
                Diagnostic::error("parse_severities", format!("In the row '{}' is no severity name defined", row))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
            continue;
        };

        if severities.contains(&severity) {
            diagnostics.push(
                Diagnostic::error("parse_severities", format!("The severity '{}' is double defined", severity))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
            continue;
        }
        if !rows.rule_columns(start_column).any(|column| request.cell(column, row).is_some()) {
            diagnostics.push(
                Diagnostic::error("parse_severities", format!("The severity '{}' is not used", severity))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(start_column),
            );
        }
        severities.push(severity);
    }
    severities
}

/// Every rule column must name a declared rule and carry at least one field value,
/// and every declared rule must be referenced by a column.
fn check_for_unused_rules(
    request: &ParseRequest<'_>,
    rows: &SheetRows,
    rules: &BTreeMap<String, Rule>,
    diagnostics: &mut Diagnostics,
) {
    let start_row = request.layout.start_row;
    let mut used_rules = HashSet::new();
    for column in rows.rule_columns(request.layout.start_column) {
        let Some(rule_name) = request.cell(column, start_row + 1) else {
            continue;
        };
        if !rules.contains_key(&rule_name) {
            diagnostics.push(
                Diagnostic::error(
                    "check_for_unused_rules",
                    format!("The rule '{}' does not exist in the rule section", rule_name),
                )
                .with_sheet(request.sheet_name)
                .with_column(column),
            );
        }
        if !(start_row + 2..rows.severity_row).any(|row| request.cell(column, row).is_some()) {
            diagnostics.push(
                Diagnostic::error("check_for_unused_rules", format!("The rule '{}' is not used", rule_name))
                    .with_sheet(request.sheet_name)
                    .with_column(column),
            );
        }
        used_rules.insert(rule_name);
    }

    for rule_name in rules.keys().filter(|rule_name| !used_rules.contains(*rule_name)) {
        diagnostics.push(
            Diagnostic::error(
                "check_for_unused_rules",
                format!("The defined rule '{}' in the rule section is not used", rule_name),
            )
            .with_sheet(request.sheet_name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::model::decision::DecisionTable;
    use crate::parser::tests::grid;
    use crate::parser::SheetLayout;

    const SPECIFICATION: &[&[&str]] = &[
        &["<SPECIFICATION>"],
        &["Field", "Internal", "C1", "C4"],
        &["A", "a", "", "x"],
        &["B", "b", "x", "x"],
        &["Severity"],
        &["Abort", "", "x", "x"],
        &["Rule"],
        &["C1", "Mandatory", "The field must be filled"],
        &["C4", "Email", "The field must be an email"],
        &["<END>"],
    ];

    fn parse_model(rows: &[&[&str]], diagnostics: &mut Diagnostics) -> Result<Specification, TableError> {
        let workbook = grid("Spec", rows);
        let layout = SheetLayout::default();
        let request = ParseRequest::new("spec.xlsx", "Spec", &workbook, &layout);
        SpecificationParser::new().parse_specification(&request, diagnostics)
    }

    fn parse_table(rows: &[&[&str]], diagnostics: &mut Diagnostics) -> Result<DecisionTable, TableError> {
        let workbook = grid("Spec", rows);
        let layout = SheetLayout::default();
        let request = ParseRequest::new("spec.xlsx", "Spec", &workbook, &layout);
        match SpecificationParser::new().parse(&request, diagnostics)? {
            Table::Decision(table) => Ok(table),
            table => panic!("unexpected table {:?}", table),
        }
    }

    fn messages(diagnostics: &Diagnostics) -> Vec<&str> {
        diagnostics.iter().map(Diagnostic::message).collect()
    }

    #[test]
    fn test_parse_specification() {
        let mut diagnostics = Diagnostics::new();
        let specification = parse_model(SPECIFICATION, &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
        assert_eq!(specification.name, "Spec");
        assert_eq!(specification.field_order, vec!["A", "B"]);
        assert_eq!(specification.severities, vec!["Abort"]);
        assert_eq!(specification.rules["C4"].short_desc, "Email");
        assert_eq!(specification.rules["C4"].long_desc.as_deref(), Some("The field must be an email"));

        let a = &specification.fields["A"];
        assert_eq!(a.internal_name, "a");
        assert_eq!(
            a.rules,
            vec![FieldRule {
                rule_name: "C4".to_owned(),
                value: "x".to_owned(),
                severity: "Abort".to_owned(),
            }]
        );
        assert_eq!(specification.fields["B"].rules.len(), 2);
    }

    #[test]
    fn test_two_field_conversion() {
        let mut diagnostics = Diagnostics::new();
        let table = parse_table(SPECIFICATION, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.error_count(), 0);
        assert_eq!(table.name, "Spec");
        assert_eq!(table.file_name, "spec.xlsx");

        let fields = table.section("Primary Data").unwrap().fields();
        let class_row = |field: usize, label: &str| {
            fields[field]
                .rows
                .iter()
                .find(|row| row.equivalence_class.as_deref() == Some(label))
                .map(|row| row.id)
                .unwrap()
        };
        let a_valid = [class_row(0, "valid not null"), class_row(0, "valid null")];
        let a_error = class_row(0, "error C4");
        let b_valid = class_row(1, "valid not null");
        let b_errors = [class_row(1, "error C1"), class_row(1, "error C4")];

        assert_eq!(table.testcase_order(), vec!["1", "2", "3"]);
        let testcases = table.testcases();
        assert_eq!(testcases[0].value(a_error), Some("x"));
        assert_eq!(testcases[0].value(b_errors[0]), Some("e"));
        assert_eq!(testcases[0].value(b_errors[1]), Some("e"));
        assert_eq!(testcases[0].value(b_valid), Some("a"));

        for (index, testcase) in testcases[1..].iter().enumerate() {
            assert_eq!(testcase.value(b_errors[index]), Some("x"));
            assert_eq!(testcase.value(b_errors[1 - index]), None);
            assert_eq!(testcase.value(a_valid[0]), Some("a"));
            assert_eq!(testcase.value(a_valid[1]), Some("a"));
            assert_eq!(testcase.value(a_error), None);
        }
    }

    #[test]
    fn test_no_rules() {
        let mut diagnostics = Diagnostics::new();
        let result = parse_model(
            &[&["<SPECIFICATION>"], &["Field", "Internal"], &["Severity"], &["Rule"], &["<END>"]],
            &mut diagnostics,
        );
        let error = result.unwrap_err();
        assert!(matches!(error, TableError::ParserError(ParserError::NoRules { .. })));
        assert_eq!(error.to_string(), "The specification sheet 'Spec' does not contain any rule");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_empty_rule_columns() {
        let mut diagnostics = Diagnostics::new();
        let result = parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1", "", "C4"],
                &["Severity"],
                &["Rule"],
                &["<END>"],
            ],
            &mut diagnostics,
        );
        assert!(matches!(
            result,
            Err(TableError::ParserError(ParserError::EmptyRuleColumns { .. }))
        ));
    }

    #[test]
    fn test_missing_markers() {
        let mut diagnostics = Diagnostics::new();
        let result = parse_model(
            &[&["<SPECIFICATION>"], &["Field", "Internal", "C1"], &["A", "a", "x"], &["<END>"]],
            &mut diagnostics,
        );
        match result {
            Err(TableError::ParserError(ParserError::MissingMarkers { markers, .. })) => {
                assert_eq!(markers, "'Severity', 'Rule'")
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(
            messages(&diagnostics),
            vec!["The 'Severity' section could not be found", "The 'Rule' section could not be found"]
        );
    }

    #[test]
    fn test_rule_reciprocity() {
        let mut diagnostics = Diagnostics::new();
        let specification = parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1", "C9"],
                &["A", "a", "x", "x"],
                &["Severity"],
                &["Abort", "", "x", "x"],
                &["Rule"],
                &["C1", "Mandatory", "The field must be filled"],
                &["C5", "RegEx", "The field must match"],
                &["<END>"],
            ],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(
            messages(&diagnostics),
            vec![
                "The rule 'C9' does not exist in the rule section",
                "The defined rule 'C5' in the rule section is not used",
            ]
        );
        assert!(specification.rules.contains_key("C5"));
    }

    #[test]
    fn test_unused_rule_column() {
        let mut diagnostics = Diagnostics::new();
        parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1", "C4"],
                &["A", "a", "x"],
                &["Severity"],
                &["Abort", "", "x", "x"],
                &["Rule"],
                &["C1", "Mandatory", "The field must be filled"],
                &["C4", "Email", "The field must be an email"],
                &["<END>"],
            ],
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(messages(&diagnostics), vec!["The rule 'C4' is not used"]);
    }

    #[test]
    fn test_severity_problems() {
        let mut diagnostics = Diagnostics::new();
        let specification = parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1", "C4", "C5"],
                &["A", "a", "x", "x", "x"],
                &["Severity"],
                &["Abort", "", "x", "x"],
                &["Warning", "", "", "x"],
                &["", "", "", "", ""],
                &["Abort", "", "", "", ""],
                &["Info"],
                &["Rule"],
                &["C1", "Mandatory", "The field must be filled"],
                &["C4", "Email", "The field must be an email"],
                &["C5", "RegEx", "The field must match"],
                &["<END>"],
            ],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(
            messages(&diagnostics),
            vec![
                "The rule in column '3' has more than one severity assigned",
                "The rule in column '4' has no severity assigned",
                "In the row '6' is no severity name defined",
                "The severity 'Abort' is double defined",
                "The severity 'Info' is not used",
            ]
        );
        assert_eq!(specification.severities, vec!["Abort", "Warning", "Info"]);
        let rules = &specification.fields["A"].rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].severity, "Abort");
    }

    #[test]
    fn test_field_problems() {
        let mut diagnostics = Diagnostics::new();
        let specification = parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1"],
                &["A", "", "x"],
                &["B", "b"],
                &["C", "c", "x"],
                &["C", "c2", "x"],
                &["Severity"],
                &["Abort", "", "x"],
                &["Rule"],
                &["C1", "Mandatory", "The field must be filled"],
                &["<END>"],
            ],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(
            messages(&diagnostics),
            vec![
                "In the row '2' there is no field name defined",
                "No rules defined for the field 'b' or the rules are not complete.",
                "The field 'C' is double defined",
            ]
        );
        assert_eq!(specification.field_order, vec!["B", "C"]);
        assert_eq!(specification.fields["C"].internal_name, "c2");
    }

    #[test]
    fn test_rule_problems() {
        let mut diagnostics = Diagnostics::new();
        let specification = parse_model(
            &[
                &["<SPECIFICATION>"],
                &["Field", "Internal", "C1", "C2"],
                &["A", "a", "x", "3"],
                &["Severity"],
                &["Abort", "", "x", "x"],
                &["Rule"],
                &["C1", "Mandatory"],
                &["C2"],
                &["", "Orphan", "No name"],
                &["C1", "Mandatory again", "Later definition"],
                &["<END>"],
            ],
            &mut diagnostics,
        )
        .unwrap();

        let levels: Vec<(Level, &str)> = diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.level(), diagnostic.message()))
            .collect();
        assert_eq!(
            levels,
            vec![
                (Level::Warning, "The long description for the rule 'C1' is not defined"),
                (Level::Error, "The short description for the rule 'C2' is not defined"),
                (Level::Warning, "The long description for the rule 'C2' is not defined"),
                (Level::Error, "The rule name is not defined"),
                (Level::Error, "The rule 'C1' is double defined"),
                (Level::Error, "The rule 'C2' does not exist in the rule section"),
            ]
        );
        assert_eq!(specification.rules["C1"].short_desc, "Mandatory again");
        assert!(!specification.rules.contains_key("C2"));
    }

    #[test]
    fn test_shifted_layout() {
        let workbook = grid(
            "Spec",
            &[
                &[],
                &["", "<SPECIFICATION>"],
                &["", "Field", "Internal", "C1"],
                &["", "A", "a", "x"],
                &["", "Severity"],
                &["", "Abort", "", "x"],
                &["", "Rule"],
                &["", "C1", "Mandatory", "The field must be filled"],
                &["", "<END>"],
            ],
        );
        let layout = SheetLayout {
            start_row: 1,
            start_column: 1,
            ..SheetLayout::default()
        };
        let request = ParseRequest::new("spec.xlsx", "Spec", &workbook, &layout);
        let mut diagnostics = Diagnostics::new();
        let specification = SpecificationParser::new()
            .parse_specification(&request, &mut diagnostics)
            .unwrap();

        assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
        assert_eq!(specification.fields["A"].rules[0].rule_name, "C1");
        assert_eq!(specification.severities, vec!["Abort"]);
    }
}
