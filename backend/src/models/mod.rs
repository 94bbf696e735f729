//! Tabular data model shared by the codec and the column splitter.
//!
//! - [`Cell`] - one spreadsheet value (string, number, boolean or empty)
//! - [`Row`] - ordered cells; rows need not be rectangular
//! - [`Table`] - ordered rows, row 0 being the header

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Cell
// =============================================================================

/// A single spreadsheet value.
///
/// A cell past the end of a [`Row`] is *absent*, which is distinct from
/// [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    String(String),
    Number(f64),
    Boolean(bool),
    #[default]
    Empty,
}

impl Cell {
    /// Borrow the text of a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Renders the cell as text; empty cells are blank.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Boolean(b) => write!(f, "{}", b),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

// =============================================================================
// Row / Table
// =============================================================================

/// Ordered cells of one row.
pub type Row = Vec<Cell>;

/// An in-memory sheet: row 0 is the header, the rest are data rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// The header row, if the table has any rows.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

// =============================================================================
// Tests
// =============================================================================
