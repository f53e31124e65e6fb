//! Table models produced by the parsers

pub mod decision;
pub mod matrix;
pub mod specification;

use crate::model::decision::DecisionTable;
use crate::model::matrix::MatrixTable;

/// A parsed table
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Decision(DecisionTable),
    Matrix(MatrixTable),
}

impl Table {
    pub fn name(&self) -> &str {
        match self {
            Table::Decision(table) => &table.name,
            Table::Matrix(table) => &table.name,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Table::Decision(table) => &table.file_name,
            Table::Matrix(table) => &table.file_name,
        }
    }

    pub fn as_decision(&self) -> Option<&DecisionTable> {
        match self {
            Table::Decision(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&MatrixTable> {
        match self {
            Table::Matrix(table) => Some(table),
            _ => None,
        }
    }
}
