//! Column splitter: turns one `"Name (12345)"` column into `Name` and
//! `Student Number` columns.
//!
//! The target column is located once from the header (case-insensitive) and
//! that index is applied to every data row. Each data row is handled on its
//! own:
//!
//! | Target cell                     | Output at the target index        |
//! |---------------------------------|-----------------------------------|
//! | `"Jane Smith (54321)"`          | `"Jane Smith"`, `"54321"`         |
//! | `"John Doe 12345"`              | `"John Doe"`, `"12345"`           |
//! | number / boolean / empty        | original value, empty             |
//! | absent (short row)              | empty, empty                      |
//! | string matching neither form    | unchanged (row stays one shorter) |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{SplitError, SplitResult};
use crate::models::{Cell, Row, Table};

/// Header cells that replace the target column.
pub const NAME_HEADER: &str = "Name";
pub const NUMBER_HEADER: &str = "Student Number";

/// Text before the first `(`, minus the whitespace right before it.
static NAME_BEFORE_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*\(").expect("static regex"));

/// Contents of the first closed `(...)` group.
static NUMBER_IN_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.*?)\)").expect("static regex"));

/// `"<name> <digits>"`, anchored at both ends.
static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+([0-9]+)$").expect("static regex"));

/// Name and student number pulled out of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentId {
    pub name: String,
    pub number: String,
}

/// Per-row outcome counts of a split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitReport {
    /// Data rows whose target string was split.
    pub split: usize,
    /// Data rows whose target cell was not a string (or absent).
    pub non_string: usize,
    /// Data rows whose target string matched neither form.
    pub unmatched: usize,
}

impl SplitReport {
    pub fn data_rows(&self) -> usize {
        self.split + self.non_string + self.unmatched
    }
}

/// Splits a named column of a [`Table`].
#[derive(Debug, Clone)]
pub struct ColumnSplitter {
    target: String,
}

impl ColumnSplitter {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Split the target column. See [`split`].
    pub fn split(&self, table: Table) -> SplitResult<Table> {
        self.split_with_report(table).map(|(table, _)| table)
    }

    /// Split the target column and report what happened to each data row.
    pub fn split_with_report(&self, table: Table) -> SplitResult<(Table, SplitReport)> {
        let header = table.header().ok_or(SplitError::EmptyTable)?;
        let index = find_column(header, &self.target)
            .ok_or_else(|| SplitError::NoSuchColumn(self.target.clone()))?;

        let mut report = SplitReport::default();
        let mut rows = table.into_rows().into_iter();
        let mut out = Vec::with_capacity(rows.len());

        if let Some(mut header) = rows.next() {
            header.splice(index..=index, [Cell::from(NAME_HEADER), Cell::from(NUMBER_HEADER)]);
            out.push(header);
        }

        for row in rows {
            out.push(split_row(row, index, &mut report));
        }

        Ok((Table::new(out), report))
    }
}

/// Replace the `target_column` of `table` with `Name` and `Student Number`.
///
/// Fails with [`SplitError::EmptyTable`] when the table has no rows and with
/// [`SplitError::NoSuchColumn`] when no header cell equals `target_column`
/// ignoring case. Splitting an already split table therefore fails.
pub fn split(table: Table, target_column: &str) -> SplitResult<Table> {
    ColumnSplitter::new(target_column).split(table)
}

/// Index of the first header cell equal to `target`, ignoring case.
pub fn find_column(header: &[Cell], target: &str) -> Option<usize> {
    let target = target.to_lowercase();
    header
        .iter()
        .position(|cell| !cell.is_empty() && cell.to_string().to_lowercase() == target)
}

/// Extract name and number from a `"Name (12345)"` or `"Name 12345"` string.
///
/// Returns `None` when neither form yields anything.
pub fn parse_student(value: &str) -> Option<StudentId> {
    parse_parenthesized(value).or_else(|| parse_trailing_number(value))
}

fn parse_parenthesized(value: &str) -> Option<StudentId> {
    let name = NAME_BEFORE_PAREN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or("");
    let number = NUMBER_IN_PARENS
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or("");

    if name.is_empty() && number.is_empty() {
        return None;
    }

    Some(StudentId {
        name: name.to_string(),
        number: number.to_string(),
    })
}

fn parse_trailing_number(value: &str) -> Option<StudentId> {
    let caps = TRAILING_NUMBER.captures(value)?;
    Some(StudentId {
        name: caps[1].trim().to_string(),
        number: caps[2].to_string(),
    })
}

/// What the target index of a data row holds.
enum Target {
    Absent,
    NotString,
    Student(Option<StudentId>),
}

fn split_row(mut row: Row, index: usize, report: &mut SplitReport) -> Row {
    let target = match row.get(index) {
        None => Target::Absent,
        Some(cell) => match cell.as_str() {
            Some(s) => Target::Student(parse_student(s)),
            None => Target::NotString,
        },
    };

    match target {
        Target::Absent => {
            report.non_string += 1;
            row.resize(index + 2, Cell::Empty);
        }
        Target::NotString => {
            report.non_string += 1;
            row.insert(index + 1, Cell::Empty);
        }
        Target::Student(Some(StudentId { name, number })) => {
            report.split += 1;
            row.splice(index..=index, [Cell::String(name), Cell::String(number)]);
        }
        Target::Student(None) => {
            report.unmatched += 1;
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Cell {
        Cell::from(value)
    }

    fn table(rows: Vec<Row>) -> Table {
        Table::new(rows)
    }

    #[test]
    fn test_header_is_widened_at_target() {
        let input = table(vec![vec![s("Id"), s("STUDENT"), s("Course")]]);
        let out = split(input, "student").unwrap();

        assert_eq!(
            out.rows()[0],
            vec![s("Id"), s("Name"), s("Student Number"), s("Course")]
        );
    }

    #[test]
    fn test_parenthesized_form() {
        let input = table(vec![
            vec![s("Student"), s("Course")],
            vec![s("Jane Smith (54321)"), s("Math")],
        ]);
        let out = split(input, "student").unwrap();

        assert_eq!(out.rows()[1], vec![s("Jane Smith"), s("54321"), s("Math")]);
    }

    #[test]
    fn test_trailing_number_form() {
        let input = table(vec![
            vec![s("Student"), s("Course")],
            vec![s("John Doe 12345"), s("Physics")],
        ]);
        let out = split(input, "Student").unwrap();

        assert_eq!(out.rows()[1], vec![s("John Doe"), s("12345"), s("Physics")]);
    }

    #[test]
    fn test_unmatched_row_passes_through() {
        let input = table(vec![
            vec![s("Student"), s("Course")],
            vec![s("N/A"), s("Chem")],
        ]);
        let (out, report) = ColumnSplitter::new("student")
            .split_with_report(input)
            .unwrap();

        assert_eq!(out.rows()[1], vec![s("N/A"), s("Chem")]);
        assert_eq!(out.rows()[0].len(), 3);
        assert_eq!(report.unmatched, 1);
    }

    #[test]
    fn test_non_string_targets_keep_alignment() {
        let input = table(vec![
            vec![s("Course"), s("Student"), s("Year")],
            vec![s("Math"), Cell::Number(12345.0), s("2024")],
            vec![s("Art"), Cell::Boolean(true), s("2023")],
            vec![s("Bio"), Cell::Empty, s("2022")],
            vec![s("Chem")],
        ]);
        let (out, report) = ColumnSplitter::new("student")
            .split_with_report(input)
            .unwrap();

        assert_eq!(
            out.rows()[1],
            vec![s("Math"), Cell::Number(12345.0), Cell::Empty, s("2024")]
        );
        assert_eq!(
            out.rows()[2],
            vec![s("Art"), Cell::Boolean(true), Cell::Empty, s("2023")]
        );
        assert_eq!(
            out.rows()[3],
            vec![s("Bio"), Cell::Empty, Cell::Empty, s("2022")]
        );
        assert_eq!(out.rows()[4], vec![s("Chem"), Cell::Empty, Cell::Empty]);
        assert_eq!(report.non_string, 4);
        assert_eq!(report.data_rows(), 4);
    }

    #[test]
    fn test_missing_column() {
        let input = table(vec![vec![s("Name"), s("Course")], vec![s("Jane"), s("Math")]]);
        assert_eq!(
            split(input, "student"),
            Err(SplitError::NoSuchColumn("student".to_string()))
        );
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(split(Table::default(), "student"), Err(SplitError::EmptyTable));
    }

    #[test]
    fn test_split_twice_fails() {
        let input = table(vec![vec![s("Student")], vec![s("Jane (1)")]]);
        let once = split(input, "student").unwrap();
        assert!(matches!(
            split(once, "student"),
            Err(SplitError::NoSuchColumn(_))
        ));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let input = table(vec![
            vec![s("student"), s("Student")],
            vec![s("A (1)"), s("B (2)")],
        ]);
        let out = split(input, "Student").unwrap();

        assert_eq!(out.rows()[1], vec![s("A"), s("1"), s("B (2)")]);
    }

    #[test]
    fn test_parse_student_edge_cases() {
        let id = |name: &str, number: &str| {
            Some(StudentId {
                name: name.to_string(),
                number: number.to_string(),
            })
        };

        assert_eq!(parse_student("  Jane Smith   ( 54321 ) "), id("Jane Smith", "54321"));
        assert_eq!(parse_student("Jane (54321"), id("Jane", ""));
        assert_eq!(parse_student("(54321)"), id("", "54321"));
        assert_eq!(parse_student("Jane (1) (2)"), id("Jane", "1"));
        assert_eq!(parse_student("John Doe 007"), id("John Doe", "007"));
        assert_eq!(parse_student("()"), None);
        assert_eq!(parse_student("12345"), None);
        assert_eq!(parse_student("John Doe 12a"), None);
        assert_eq!(parse_student(""), None);
    }

    #[test]
    fn test_other_columns_untouched() {
        let input = table(vec![
            vec![s("A"), s("Student"), s("B")],
            vec![Cell::Number(1.0), s("Jane (9)"), Cell::Boolean(false)],
        ]);
        let out = split(input, "student").unwrap();

        assert_eq!(
            out.rows()[1],
            vec![Cell::Number(1.0), s("Jane"), s("9"), Cell::Boolean(false)]
        );
    }
}
