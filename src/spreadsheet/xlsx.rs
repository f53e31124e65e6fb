use crate::error::ResultMessage;
use crate::error::TableError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Workbook;
use crate::spreadsheet::WorkbookError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::ZipArchive;

// XML tag names of the worksheet and workbook parts
const TAG_RELATIONSHIP: &[u8] = b"Relationship";     // Package relationship
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");  // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");      // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                 // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");            // Worksheet definition
const TAG_ROW: QName = QName(b"row");                // Row in worksheet
const TAG_CELL: QName = QName(b"c");                 // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");       // Inline string value
const TAG_VALUE: QName = QName(b"v");                // Cell value content

/// How the content of a `<c>` element has to be interpreted
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum CellKind {
    #[default]
    Number,
    SharedString,
    InlineString,
    Boolean,
    Error,
}

/// Opens an `.xlsx` / `.xlsm` file and materializes all of its sheets.
pub(crate) fn open(path: &Path) -> Result<Workbook, TableError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(TableError::from).with_prefix(&name)?;
    read_workbook(&name, BufReader::new(file)).with_prefix(&name)
}

/// Reads a workbook package from any seekable source.
///
/// Text cells (shared and inline strings, formula strings, ISO dates) become
/// [`CellValue::Text`], numeric cells [`CellValue::Number`] and booleans the text
/// `true` / `false`. Error cells and empty strings are left absent.
///
/// # Arguments
/// * `name` - Name of the workbook, usually the file name
/// * `reader` - Source of the ZIP package
///
/// # Returns
/// The workbook with one [`Sheet`] per worksheet, in workbook order
pub fn read_workbook<R: Read + Seek>(name: &str, reader: R) -> Result<Workbook, TableError> {
    let mut zip = ZipArchive::new(reader)?;
    let sheets = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(WorkbookError::EmptyWorkbook(name.to_owned()))?
    }

    let shared_strings = load_shared_strings(&mut zip)?;
    let mut workbook = Workbook::new(name);
    for (sheet_name, zip_path) in &sheets {
        let sheet = read_sheet(&mut zip, sheet_name, zip_path, &shared_strings)
            .with_prefix(&format!("Sheet '{}'", sheet_name))?;
        tracing::debug!(workbook = name, sheet = %sheet_name, cells = sheet.len(), "Loaded sheet");
        workbook.push(sheet);
    }
    Ok(workbook)
}

/// Loads the worksheet relationships of the workbook part
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths inside the archive
fn load_relationships<R: Read + Seek>(zip: &mut ZipArchive<R>, path: &str) -> Result<HashMap<String, String>, TableError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| WorkbookError::MissingPart(path.to_owned()))?;
    let mut relationships = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target into a path inside the archive
fn to_zip_path(path: &str) -> String {
    if let Some(path) = path.strip_prefix('/') {
        path.to_owned()
    } else if path.starts_with("xl/") {
        path.to_owned()
    } else {
        format!("xl/{path}")
    }
}

/// Loads worksheet names and their part paths from `xl/workbook.xml`
///
/// # Returns
/// Worksheets as (name, zip_path) pairs in workbook order
fn load_workbook<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<(String, String)>, TableError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| WorkbookError::MissingPart("xl/workbook.xml".to_owned()))?;
    let mut sheets = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table, an absent part means an empty table
fn load_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>, TableError> {
    let mut shared_strings = Vec::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Reads all present cells of one worksheet part
fn read_sheet<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    sheet_name: &str,
    zip_path: &str,
    shared_strings: &[String],
) -> Result<Sheet, TableError> {
    let mut sheet = Sheet::new(sheet_name);
    let mut reader = zip.xml_reader(zip_path)?
        .ok_or_else(|| WorkbookError::MissingPart(zip_path.to_owned()))?;
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellKind::default();
    let mut value = String::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            row_count = event.get_attribute_value("r")?
                .and_then(|label| label.parse::<usize>().ok())
                .and_then(|label| label.checked_sub(1))
                .unwrap_or(row_count);
            col_count = 0;
        }
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            (row, col) = event.get_attribute_value("r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row_count, col_count));
            col_count = col + 1;
            kind = match event.get_attribute_value("t")?.as_deref() {
                Some("s") => CellKind::SharedString,
                Some("inlineStr") | Some("str") | Some("d") => CellKind::InlineString,
                Some("b") => CellKind::Boolean,
                Some("e") => CellKind::Error,
                _ => CellKind::Number,
            };
            value.clear();
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            value = read_string_value(&mut reader, TAG_VALUE, true)?;
        }
        Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
            if let Some(cell) = to_cell_value(kind, &value, row, col, shared_strings)? {
                sheet.push(row, col, cell);
            } else if kind == CellKind::Error {
                tracing::warn!(sheet = sheet_name, cell = %index_to_reference(row, col), value = %value, "Skipped error cell");
            }
            value.clear();
        }
    });
    Ok(sheet)
}

fn to_cell_value(
    kind: CellKind,
    value: &str,
    row: usize,
    col: usize,
    shared_strings: &[String],
) -> Result<Option<CellValue>, TableError> {
    let cell = match kind {
        CellKind::Number => Some(CellValue::Number(value.trim().parse::<f64>()?)),
        CellKind::InlineString => Some(CellValue::Text(value.to_owned())),
        CellKind::SharedString => {
            let index = value.trim().parse::<usize>()?;
            let text = shared_strings.get(index).ok_or_else(|| WorkbookError::SharedStringIndex {
                index,
                reference: index_to_reference(row, col),
            })?;
            Some(CellValue::Text(text.to_owned())).filter(|_| !text.is_empty())
        }
        CellKind::Boolean => {
            let flag = matches!(value.trim(), "1" | "true" | "TRUE");
            Some(CellValue::Text(flag.to_string()))
        }
        CellKind::Error => None,
    };
    Ok(cell)
}

/// Reads a string value up to the given end tag
///
/// Phonetic annotations are skipped, text nodes, CDATA sections and references are
/// concatenated.
///
/// # Arguments
/// * `reader` - XML reader positioned right after the start tag
/// * `end_tag` - Tag which closes the string content
/// * `is_text_content` - Whether the content is text without a nested `<t>` element
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
