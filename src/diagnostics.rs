//! Accumulating diagnostics sink
//!
//! Parsers never stop at a recoverable problem. They push a [`Diagnostic`] into the
//! caller's [`Diagnostics`] and carry on; only structural problems abort a sheet.
//! Every record is also emitted as a `tracing` event at the matching level.

use std::fmt;

/// Level of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic record produced while parsing or converting a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    level: Level,
    /// Name of the operation which produced the record
    function: &'static str,
    message: String,
    sheet: Option<String>,
    row: Option<usize>,
    column: Option<usize>,
}

impl Diagnostic {
    pub fn new(level: Level, function: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            function,
            message: message.into(),
            sheet: None,
            row: None,
            column: None,
        }
    }

    pub fn error(function: &'static str, message: impl Into<String>) -> Self {
        Self::new(Level::Error, function, message)
    }

    pub fn warning(function: &'static str, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, function, message)
    }

    pub fn info(function: &'static str, message: impl Into<String>) -> Self {
        Self::new(Level::Info, function, message)
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn function(&self) -> &str {
        self.function
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.function, self.message)?;
        if let Some(sheet) = &self.sheet {
            write!(f, " (sheet '{}'", sheet)?;
            if let Some(row) = self.row {
                write!(f, ", row {}", row)?;
            }
            if let Some(column) = self.column {
                write!(f, ", column {}", column)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Append-only collection of diagnostics
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and forwards it to the tracing subscriber.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let sheet = diagnostic.sheet().unwrap_or_default();
        match diagnostic.level {
            Level::Error => tracing::error!(
                function = diagnostic.function,
                sheet,
                row = diagnostic.row,
                column = diagnostic.column,
                "{}",
                diagnostic.message
            ),
            Level::Warning => tracing::warn!(
                function = diagnostic.function,
                sheet,
                row = diagnostic.row,
                column = diagnostic.column,
                "{}",
                diagnostic.message
            ),
            Level::Info => tracing::info!(
                function = diagnostic.function,
                sheet,
                row = diagnostic.row,
                column = diagnostic.column,
                "{}",
                diagnostic.message
            ),
        }
        self.records.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.count(Level::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Level::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, level: Level) -> usize {
        self.records.iter().filter(|record| record.level == level).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|record| record.level == Level::Error)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
