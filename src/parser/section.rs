//! Section and sub-section scanners of decision sheets
//!
//! A section starts at a row carrying a type code in column `S + 1` and ends right
//! before the next row carrying a section type code (or at the sheet end row). Rows
//! marked `FieldSubSection` open a field inside a field section and never end the
//! section around them.

use crate::diagnostics::Diagnostic;
use crate::model::decision::SectionKind;
use crate::model::decision::FIELD_SUB_SECTION;
use crate::parser::ParseRequest;
use crate::parser::ParserError;

/// Half-open row range `[start_row, end_row)` of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SectionRange {
    pub(crate) kind: SectionKind,
    pub(crate) start_row: usize,
    pub(crate) end_row: usize,
}

/// Half-open row range of a field inside a field section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubSectionRange {
    pub(crate) start_row: usize,
    pub(crate) end_row: usize,
}

/// Scans for the next section starting at `start_row`.
///
/// Unknown type codes and names without a type code are collected into `errors`
/// and do not stop the scan.
///
/// # Returns
/// The range of the section, `None` if no row up to the sheet end opens one
pub(crate) fn next_section(
    request: &ParseRequest<'_>,
    start_row: usize,
    sheet_end_row: usize,
    errors: &mut Vec<Diagnostic>,
) -> Option<SectionRange> {
    let name_column = request.layout.start_column;
    let type_column = name_column + 1;
    let mut opened: Option<(usize, SectionKind)> = None;
    let mut end_row = sheet_end_row;

    for row in start_row..sheet_end_row {
        let section_type = request.cell(type_column, row);
        if section_type.is_none() && row > request.layout.start_row + 1 && request.cell(name_column, row).is_some() {
            errors.push(
                Diagnostic::error(
                    "next_section",
                    format!(
                        "If a name is entered in column '{}' a sectionType must be provided in column '{}'",
                        name_column, type_column
                    ),
                )
                .with_sheet(request.sheet_name)
                .with_row(row)
                .with_column(name_column),
            );
        }

        let Some(section_type) = section_type else {
            continue;
        };
        if section_type == FIELD_SUB_SECTION {
            continue;
        }
        match SectionKind::from_type_code(&section_type) {
            Some(kind) if opened.is_none() => opened = Some((row, kind)),
            Some(_) => {
                end_row = row;
                break;
            }
            None => errors.push(
                Diagnostic::error("next_section", format!("Invalid section type '{}' found.", section_type))
                    .with_sheet(request.sheet_name)
                    .with_row(row)
                    .with_column(type_column),
            ),
        }
    }

    let (start_row, kind) = opened?;
    tracing::info!(
        sheet = request.sheet_name,
        section = %kind,
        start_row,
        end_row,
        "Section detected"
    );
    Some(SectionRange { kind, start_row, end_row })
}

/// Discovers all sections between the header row and the sheet end row.
///
/// Every problem found on the way ends up in `errors`; the caller decides whether
/// they abort the sheet.
pub(crate) fn scan_sections(
    request: &ParseRequest<'_>,
    sheet_end_row: usize,
    errors: &mut Vec<Diagnostic>,
) -> Result<Vec<SectionRange>, ParserError> {
    let mut sections = Vec::new();
    let mut current_row = request.layout.start_row + 1;
    while current_row < sheet_end_row {
        match next_section(request, current_row, sheet_end_row, errors) {
            Some(range) => {
                current_row = range.end_row;
                sections.push(range);
            }
            None => break,
        }
    }
    if sections.is_empty() {
        Err(ParserError::NoSection {
            sheet: request.sheet_name.to_owned(),
        })?
    }
    Ok(sections)
}

/// Scans for the next field inside a field section, any type code opens one.
pub(crate) fn next_sub_section(
    request: &ParseRequest<'_>,
    start_row: usize,
    section_end_row: usize,
) -> Option<SubSectionRange> {
    let type_column = request.layout.start_column + 1;
    let mut sub_section_start = None;
    for row in start_row..section_end_row {
        if request.cell(type_column, row).is_some() {
            match sub_section_start {
                None => sub_section_start = Some(row),
                Some(start_row) => return Some(SubSectionRange { start_row, end_row: row }),
            }
        }
    }
    sub_section_start.map(|start_row| SubSectionRange {
        start_row,
        end_row: section_end_row,
    })
}
