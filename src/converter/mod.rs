//! Conversion of a specification into a decision table
//!
//! The generated table has the sections
//!
//! 1. `Execute`, a multi-row section to tell test cases from pure data,
//! 2. `Secondary Data`, only when the rule `PK` is declared,
//! 3. `Primary Data`, one field per specification field in declaration order,
//! 4. `Summary`,
//! 5. `Severity`, a multi-row section with one row per severity,
//!
//! followed by the single-fault test cases.

pub mod classes;
pub mod testcases;

use crate::converter::classes::classes_for_rules;
use crate::converter::classes::EquivalenceClasses;
use crate::converter::classes::RULE_PK;
use crate::converter::testcases::create_testcases;
use crate::converter::testcases::RowIdObject;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::model::decision::DecisionTable;
use crate::model::decision::ModelError;
use crate::model::decision::SectionKind;
use crate::model::specification::Specification;

/// Converts a parsed specification into a decision table.
///
/// Custom rules missing from the rule table are reported and their class is skipped.
pub fn convert(
    specification: &Specification,
    file_name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<DecisionTable, ModelError> {
    tracing::debug!(specification = %specification.name, fields = specification.field_order.len(), "Convert specification");
    let mut table = DecisionTable::new(&specification.name, file_name);

    create_execute_section(&mut table)?;
    let secondary = create_secondary_data_section(specification, &mut table)?;
    let primary = create_primary_data_section(specification, &mut table, diagnostics)?;
    table.add_section("Summary", SectionKind::Summary);
    create_severity_section(specification, &mut table)?;

    create_testcases(&mut table, &primary, &secondary)?;
    Ok(table)
}

fn create_execute_section(table: &mut DecisionTable) -> Result<(), ModelError> {
    let section = table.add_section("Execute", SectionKind::MultiRow);
    table.add_keyed_row(
        section,
        Some("Testcase".to_owned()),
        None,
        Some("This is a testcase which should be executed".to_owned()),
    )?;
    table.add_keyed_row(
        section,
        Some("Data only".to_owned()),
        None,
        Some("This is only data referenced from other testcases".to_owned()),
    )?;
    Ok(())
}

fn create_secondary_data_section(
    specification: &Specification,
    table: &mut DecisionTable,
) -> Result<RowIdObject, ModelError> {
    let mut rows = RowIdObject::default();
    if !specification.has_rule(RULE_PK) {
        return Ok(rows);
    }

    let section = table.add_section("Secondary Data", SectionKind::Field);
    let field = table.add_field(section, &specification.name)?;
    rows.valid.push(table.add_equivalence_row(
        section,
        field,
        Some("Record already exists".to_owned()),
        None,
        Some("There is already a record with the same primary key".to_owned()),
    )?);
    rows.valid.push(table.add_equivalence_row(
        section,
        field,
        Some("Record is new".to_owned()),
        None,
        Some("There is no record with this primary key".to_owned()),
    )?);
    Ok(rows)
}

fn create_primary_data_section(
    specification: &Specification,
    table: &mut DecisionTable,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<RowIdObject>, ModelError> {
    let section = table.add_section("Primary Data", SectionKind::Field);
    let mut row_ids = Vec::new();
    for field in specification.fields_in_order() {
        let result = classes_for_rules(specification, field);
        for rule in result.unknown_rules {
            diagnostics.push(
                Diagnostic::error(
                    "convert",
                    format!(
                        "The rule '{}' of the field '{}' does not exist in the rule section, no equivalence class created",
                        rule, field.name
                    ),
                )
                .with_sheet(&specification.name),
            );
        }
        row_ids.push(create_field(table, section, &field.name, &result.classes)?);
    }
    Ok(row_ids)
}

/// Writes the classes of one field as rows labeled `valid <class>` and `error <class>`.
fn create_field(
    table: &mut DecisionTable,
    section: usize,
    name: &str,
    classes: &EquivalenceClasses,
) -> Result<RowIdObject, ModelError> {
    let field = table.add_field(section, name)?;
    let mut rows = RowIdObject::default();
    for class in &classes.valid {
        rows.valid.push(table.add_equivalence_row(
            section,
            field,
            Some(format!("valid {}", class.name)),
            None,
            Some(class.comment.join(", ")),
        )?);
    }
    for class in &classes.error {
        rows.error.push(table.add_equivalence_row(
            section,
            field,
            Some(format!("error {}", class.name)),
            None,
            Some(class.comment.join(", ")),
        )?);
    }
    Ok(rows)
}

fn create_severity_section(specification: &Specification, table: &mut DecisionTable) -> Result<(), ModelError> {
    let section = table.add_section("Severity", SectionKind::MultiRow);
    for severity in &specification.severities {
        table.add_keyed_row(section, Some(severity.clone()), None, None)?;
    }
    Ok(())
}
