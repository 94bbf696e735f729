//! Delimited text (CSV, TSV, ...) to [`Table`] with encoding and delimiter
//! auto-detection.
//!
//! Values are typed the way a spreadsheet would type them on import:
//! numeric text becomes a number, `TRUE`/`FALSE` a boolean, blank text an
//! empty cell.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CodecError, CodecResult};
use crate::models::{Cell, Row, Table};

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("static regex")
});

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as is; chardet only guesses for anything else.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings go through `encoding_rs` label lookup before falling
/// back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CodecResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CodecError::Encoding(format!(
                        "content is not valid {}",
                        enc.name()
                    )));
                }
                text.into_owned()
            }
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Type one raw text value.
pub fn infer_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        return Cell::Empty;
    }
    if raw.eq_ignore_ascii_case("true") {
        return Cell::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Cell::Boolean(false);
    }
    if NUMERIC.is_match(raw) {
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return Cell::Number(n);
            }
        }
    }
    Cell::String(raw.to_string())
}

/// Parse decoded text with an explicit delimiter.
///
/// Rows keep their own length (trailing empty cells dropped); blank lines are
/// skipped.
pub fn parse_text(content: &str, delimiter: u8) -> CodecResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Row = record.iter().map(infer_cell).collect();
        trim_trailing_empty(&mut row);
        if row.is_empty() {
            continue;
        }
        rows.push(row);
    }

    Ok(Table::new(rows))
}

/// Parse raw bytes, detecting encoding and delimiter.
pub fn parse_bytes(bytes: &[u8]) -> CodecResult<DelimitedInfo> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_text(&content, delimiter)?;

    Ok(DelimitedInfo {
        table,
        encoding,
        delimiter: delimiter as char,
    })
}

/// Parsed text plus what was detected.
#[derive(Debug, Clone)]
pub struct DelimitedInfo {
    pub table: Table,
    pub encoding: String,
    pub delimiter: char,
}

pub(crate) fn trim_trailing_empty(row: &mut Row) {
    while row.last().is_some_and(Cell::is_empty) {
        row.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_text("Student,Course\nJane Smith (54321),Math", b',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec![Cell::from("Student"), Cell::from("Course")]);
        assert_eq!(table.rows()[1][0], Cell::from("Jane Smith (54321)"));
    }

    #[test]
    fn test_quoted_values() {
        let table = parse_text("Student;Note\n\"Doe, John 12\";\"a;b\"", b';').unwrap();

        assert_eq!(table.rows()[1][0], Cell::from("Doe, John 12"));
        assert_eq!(table.rows()[1][1], Cell::from("a;b"));
    }

    #[test]
    fn test_ragged_rows_and_blank_lines() {
        let table = parse_text("a,b,c\n1,,\n\n,2\n", b',').unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], vec![Cell::Number(1.0)]);
        assert_eq!(table.rows()[2], vec![Cell::Empty, Cell::Number(2.0)]);
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(""), Cell::Empty);
        assert_eq!(infer_cell("TRUE"), Cell::Boolean(true));
        assert_eq!(infer_cell("false"), Cell::Boolean(false));
        assert_eq!(infer_cell("12345"), Cell::Number(12345.0));
        assert_eq!(infer_cell("-1.5e3"), Cell::Number(-1500.0));
        assert_eq!(infer_cell("inf"), Cell::from("inf"));
        assert_eq!(infer_cell("N/A"), Cell::from("N/A"));
        assert_eq!(infer_cell(" 12"), Cell::from(" 12"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
        assert_eq!(detect_delimiter("Student"), b',');
    }

    #[test]
    fn test_auto_parse() {
        let result = parse_bytes("Student;Course\nJohn Doe 12345;Physics".as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.table.len(), 2);
    }

    #[test]
    fn test_utf8_names_survive_detection() {
        let result = parse_bytes("Student\nMüller (1)\n".as_bytes()).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.rows()[1][0], Cell::from("Müller (1)"));

        let bytes = "Student\nJosé Núñez (123)\nZoë Ärger 555\n".as_bytes();
        assert_eq!(detect_encoding(bytes), "utf-8");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_bom_is_stripped() {
        let decoded = decode_content("\u{feff}Student".as_bytes(), "utf-8").unwrap();
        assert_eq!(decoded, "Student");
    }
}
