//! # Rusty Tables
//!
//! A parser for spreadsheet based test tables. Every sheet of a workbook starts with a
//! table type key in its start cell which selects how the sheet is read.
//!
//! ## Table Types
//!
//! - `<DECISION_TABLE>`: sections of equivalence class rows with one column per test case
//! - `<SPECIFICATION>`: fields, their rules and the rule severities; converted into a
//!   decision table with single-fault test cases
//! - `<MATRIX_TABLE>`: a data block described by metadata along both axes
//!
//! ## Features
//!
//! - **Pure Rust `.xlsx` loading**: workbooks are read with `zip` and `quick-xml`
//! - **Pluggable parsers**: further table types are registered on the [`FileProcessor`]
//! - **Collected diagnostics**: recoverable problems are gathered per sheet instead of
//!   aborting the whole file
//! - **Configurable layout**: start cell and end key can be set per sheet
//!
//! ```no_run
//! use rusty_tables::FileProcessor;
//!
//! let mut processor = FileProcessor::default();
//! processor.load(&["tests/*.xlsx"])?;
//! for diagnostic in processor.diagnostics().iter() {
//!     eprintln!("{}", diagnostic);
//! }
//! # Ok::<(), rusty_tables::TableError>(())
//! ```

pub mod converter;
pub mod diagnostics;
pub mod error;
mod helpers;
pub mod model;
pub mod parser;
pub mod processor;
pub mod spreadsheet;

pub use crate::diagnostics::Diagnostic;
pub use crate::diagnostics::Diagnostics;
pub use crate::diagnostics::Level;
pub use crate::error::TableError;
pub use crate::model::Table;
pub use crate::parser::SheetLayout;
pub use crate::parser::TableParser;
pub use crate::processor::FileProcessor;
pub use crate::processor::ProcessorOptions;
pub use crate::spreadsheet::GridAccessor;
pub use crate::spreadsheet::Workbook;
