//! Single-fault test case synthesis
//!
//! For every error class row of every field one test case is created. The row under
//! test is marked `x`, all fields after it are marked with their error rows inert
//! (`e`) and their valid rows as arbitrary (`a`), the fields before it only with
//! their valid rows. Secondary data valid rows are always `a`.

use crate::model::decision::DecisionTable;
use crate::model::decision::ModelError;
use crate::model::decision::RowId;

/// Marks the row whose error the test case triggers
pub const MARK_TRIGGER: &str = "x";
/// Marks an error row which must not trigger
pub const MARK_INERT: &str = "e";
/// Marks a row with an arbitrary valid value
pub const MARK_ANY: &str = "a";

/// Row ids of one field split by class type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowIdObject {
    pub valid: Vec<RowId>,
    pub error: Vec<RowId>,
}

/// Appends the single-fault test cases to the table.
///
/// Test cases are named `1`, `2`, ... in creation order.
///
/// # Returns
/// The number of created test cases
pub fn create_testcases(
    table: &mut DecisionTable,
    fields: &[RowIdObject],
    secondary: &RowIdObject,
) -> Result<usize, ModelError> {
    let mut count = 0;
    for (index, field) in fields.iter().enumerate() {
        for error_row in &field.error {
            count += 1;
            let testcase = table.add_testcase(&count.to_string());
            let mut mark = |rows: &[RowId], value: &str| {
                rows.iter()
                    .try_for_each(|row| table.set_value(testcase, *row, Some(value.to_owned())))
            };

            mark(std::slice::from_ref(error_row), MARK_TRIGGER)?;
            for next in &fields[index + 1..] {
                mark(&next.error, MARK_INERT)?;
                mark(&next.valid, MARK_ANY)?;
            }
            for previous in &fields[..index] {
                mark(&previous.valid, MARK_ANY)?;
            }
            mark(&secondary.valid, MARK_ANY)?;
        }
    }
    tracing::debug!(table = %table.name, count, "Created testcases");
    Ok(count)
}
