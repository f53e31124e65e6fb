//! Decision table model
//!
//! A decision table is a list of named sections. Every data row of every section
//! gets a [`RowId`] minted by the table, and every [`Testcase`] stores its marks
//! keyed by those ids. Rows are appended through the table so ids stay unique.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Misuse of the table builder, an index which does not denote a matching element.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("The table '{table}' has no section with the index {section}")]
    UnknownSection { table: String, section: usize },

    #[error("The section '{section}' of the table '{table}' is a {kind}, not a {expected}")]
    WrongSectionKind {
        table: String,
        section: String,
        kind: SectionKind,
        expected: &'static str,
    },

    #[error("The section {section} of the table '{table}' has no field with the index {field}")]
    UnknownField { table: String, section: usize, field: usize },

    #[error("The table '{table}' has no testcase with the index {testcase}")]
    UnknownTestcase { table: String, testcase: usize },
}

/// Type code of the marker which opens a field inside a field section.
pub const FIELD_SUB_SECTION: &str = "FieldSubSection";

/// Opaque identifier of a table row, unique within one table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row{}", self.0)
    }
}

/// The closed set of section kinds, selected by the type code column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    MultiRow,
    Summary,
    Multiplicity,
    Execute,
    NeverExecute,
    Tag,
    Filter,
    GeneratorSwitch,
    Field,
}

impl SectionKind {
    pub const ALL: [SectionKind; 9] = [
        SectionKind::MultiRow,
        SectionKind::Summary,
        SectionKind::Multiplicity,
        SectionKind::Execute,
        SectionKind::NeverExecute,
        SectionKind::Tag,
        SectionKind::Filter,
        SectionKind::GeneratorSwitch,
        SectionKind::Field,
    ];

    pub fn type_code(&self) -> &'static str {
        match self {
            SectionKind::MultiRow => "MultiRowSection",
            SectionKind::Summary => "SummarySection",
            SectionKind::Multiplicity => "MultiplicitySection",
            SectionKind::Execute => "ExecuteSection",
            SectionKind::NeverExecute => "NeverExecuteSection",
            SectionKind::Tag => "TagSection",
            SectionKind::Filter => "FilterSection",
            SectionKind::GeneratorSwitch => "GeneratorSwitchSection",
            SectionKind::Field => "FieldSection",
        }
    }

    pub fn from_type_code(code: &str) -> Option<SectionKind> {
        SectionKind::ALL.into_iter().find(|kind| kind.type_code() == code)
    }

    /// Kinds of which a table designates at most one section.
    pub fn is_single(&self) -> bool {
        matches!(self, SectionKind::Multiplicity | SectionKind::Execute | SectionKind::NeverExecute)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_code())
    }
}

/// Row of a multi-row like section.
///
/// | kind            | key               | other      | comment |
/// |-----------------|-------------------|------------|---------|
/// | MultiRow        | key               | other      | comment |
/// | Tag             | tag               | other      | comment |
/// | Filter          | filter processor  | expression | comment |
/// | GeneratorSwitch | generator name    | values     | comment |
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRow {
    pub id: RowId,
    pub key: Option<String>,
    pub other: Option<String>,
    pub comment: Option<String>,
}

/// Row of a field sub-section
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceRow {
    pub id: RowId,
    pub equivalence_class: Option<String>,
    /// Test data generator call
    pub generator: Option<String>,
    pub comment: Option<String>,
}

/// One named field inside a field section
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSubSection {
    pub name: String,
    pub rows: Vec<EquivalenceRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    MultiRow(Vec<KeyedRow>),
    Tag(Vec<KeyedRow>),
    Filter(Vec<KeyedRow>),
    GeneratorSwitch(Vec<KeyedRow>),
    Summary,
    Multiplicity,
    Execute,
    NeverExecute,
    Field(Vec<FieldSubSection>),
}

impl SectionContent {
    fn empty(kind: SectionKind) -> Self {
        match kind {
            SectionKind::MultiRow => SectionContent::MultiRow(Vec::new()),
            SectionKind::Tag => SectionContent::Tag(Vec::new()),
            SectionKind::Filter => SectionContent::Filter(Vec::new()),
            SectionKind::GeneratorSwitch => SectionContent::GeneratorSwitch(Vec::new()),
            SectionKind::Summary => SectionContent::Summary,
            SectionKind::Multiplicity => SectionContent::Multiplicity,
            SectionKind::Execute => SectionContent::Execute,
            SectionKind::NeverExecute => SectionContent::NeverExecute,
            SectionKind::Field => SectionContent::Field(Vec::new()),
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            SectionContent::MultiRow(_) => SectionKind::MultiRow,
            SectionContent::Tag(_) => SectionKind::Tag,
            SectionContent::Filter(_) => SectionKind::Filter,
            SectionContent::GeneratorSwitch(_) => SectionKind::GeneratorSwitch,
            SectionContent::Summary => SectionKind::Summary,
            SectionContent::Multiplicity => SectionKind::Multiplicity,
            SectionContent::Execute => SectionKind::Execute,
            SectionContent::NeverExecute => SectionKind::NeverExecute,
            SectionContent::Field(_) => SectionKind::Field,
        }
    }

    fn keyed_rows_mut(&mut self) -> Option<&mut Vec<KeyedRow>> {
        match self {
            SectionContent::MultiRow(rows)
            | SectionContent::Tag(rows)
            | SectionContent::Filter(rows)
            | SectionContent::GeneratorSwitch(rows) => Some(rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    /// Id of the header row, single-row sections store their test case values here
    pub header_row: RowId,
    pub content: SectionContent,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.content.kind()
    }

    /// Returns the rows of a multi-row like section, empty for other kinds.
    pub fn keyed_rows(&self) -> &[KeyedRow] {
        match &self.content {
            SectionContent::MultiRow(rows)
            | SectionContent::Tag(rows)
            | SectionContent::Filter(rows)
            | SectionContent::GeneratorSwitch(rows) => rows,
            _ => &[],
        }
    }

    /// Returns the fields of a field section, empty for other kinds.
    pub fn fields(&self) -> &[FieldSubSection] {
        match &self.content {
            SectionContent::Field(fields) => fields,
            _ => &[],
        }
    }
}

/// One test case column of a decision table
#[derive(Debug, Clone, PartialEq)]
pub struct Testcase {
    pub name: String,
    /// Marks keyed by row; rows without a mark are absent
    pub data: HashMap<RowId, String>,
    pub execute: bool,
    pub never_execute: bool,
    pub multiplicity: usize,
}

impl Testcase {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            data: HashMap::new(),
            execute: true,
            never_execute: false,
            multiplicity: 1,
        }
    }

    pub fn value(&self, row: RowId) -> Option<&str> {
        self.data.get(&row).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    pub name: String,
    pub file_name: String,
    sections: Vec<Section>,
    testcases: Vec<Testcase>,
    single: HashMap<SectionKind, usize>,
    next_row: usize,
}

impl DecisionTable {
    pub fn new(name: &str, file_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            file_name: file_name.to_owned(),
            sections: Vec::new(),
            testcases: Vec::new(),
            single: HashMap::new(),
            next_row: 0,
        }
    }

    pub fn new_row_id(&mut self) -> RowId {
        self.next_row += 1;
        RowId(self.next_row)
    }

    /// Appends a new section and returns its index.
    /// The first section of a single kind becomes the designated one.
    pub fn add_section(&mut self, name: &str, kind: SectionKind) -> usize {
        let header_row = self.new_row_id();
        let index = self.sections.len();
        self.sections.push(Section {
            name: name.to_owned(),
            header_row,
            content: SectionContent::empty(kind),
        });
        if kind.is_single() {
            self.single.entry(kind).or_insert(index);
        }
        index
    }

    /// Appends a row to a multi-row like section.
    pub fn add_keyed_row(
        &mut self,
        section: usize,
        key: Option<String>,
        other: Option<String>,
        comment: Option<String>,
    ) -> Result<RowId, ModelError> {
        let id = self.new_row_id();
        let target = section_at(&self.name, &mut self.sections, section)?;
        if let Some(rows) = target.content.keyed_rows_mut() {
            rows.push(KeyedRow { id, key, other, comment });
            return Ok(id);
        }
        Err(ModelError::WrongSectionKind {
            table: self.name.clone(),
            section: target.name.clone(),
            kind: target.kind(),
            expected: "multi-row like section",
        })
    }

    /// Appends a field to a field section and returns the field index.
    pub fn add_field(&mut self, section: usize, name: &str) -> Result<usize, ModelError> {
        let fields = field_section_at(&self.name, &mut self.sections, section)?;
        fields.push(FieldSubSection {
            name: name.to_owned(),
            rows: Vec::new(),
        });
        Ok(fields.len() - 1)
    }

    /// Appends an equivalence class row to a field.
    pub fn add_equivalence_row(
        &mut self,
        section: usize,
        field: usize,
        equivalence_class: Option<String>,
        generator: Option<String>,
        comment: Option<String>,
    ) -> Result<RowId, ModelError> {
        let id = self.new_row_id();
        let fields = field_section_at(&self.name, &mut self.sections, section)?;
        let Some(target) = fields.get_mut(field) else {
            return Err(ModelError::UnknownField {
                table: self.name.clone(),
                section,
                field,
            });
        };
        target.rows.push(EquivalenceRow {
            id,
            equivalence_class,
            generator,
            comment,
        });
        Ok(id)
    }

    /// Appends a test case and returns its index.
    pub fn add_testcase(&mut self, name: &str) -> usize {
        self.testcases.push(Testcase::new(name));
        self.testcases.len() - 1
    }

    /// Sets the mark of a test case for a row; `None` leaves the row unmarked.
    pub fn set_value(&mut self, testcase: usize, row: RowId, value: Option<String>) -> Result<(), ModelError> {
        let Some(target) = self.testcases.get_mut(testcase) else {
            return Err(ModelError::UnknownTestcase {
                table: self.name.clone(),
                testcase,
            });
        };
        if let Some(value) = value {
            target.data.insert(row, value);
        }
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn testcases(&self) -> &[Testcase] {
        &self.testcases
    }

    pub fn testcases_mut(&mut self) -> &mut [Testcase] {
        &mut self.testcases
    }

    /// Test case names in column order
    pub fn testcase_order(&self) -> Vec<&str> {
        self.testcases.iter().map(|testcase| testcase.name.as_str()).collect()
    }

    /// Returns the designated section of a single kind, if present.
    pub fn single_check(&self, kind: SectionKind) -> Option<&Section> {
        self.single.get(&kind).map(|index| &self.sections[*index])
    }
}

fn section_at<'a>(table: &str, sections: &'a mut [Section], section: usize) -> Result<&'a mut Section, ModelError> {
    sections.get_mut(section).ok_or_else(|| ModelError::UnknownSection {
        table: table.to_owned(),
        section,
    })
}

fn field_section_at<'a>(
    table: &str,
    sections: &'a mut [Section],
    section: usize,
) -> Result<&'a mut Vec<FieldSubSection>, ModelError> {
    let target = section_at(table, sections, section)?;
    match &mut target.content {
        SectionContent::Field(fields) => Ok(fields),
        content => Err(ModelError::WrongSectionKind {
            table: table.to_owned(),
            section: target.name.clone(),
            kind: content.kind(),
            expected: "field section",
        }),
    }
}
