//! Upload processing pipeline: decode, split, encode.
//!
//! # Example
//!
//! ```rust,ignore
//! use excel_split::pipeline::{process_bytes, ProcessOptions};
//!
//! let bytes = std::fs::read("students.xlsx")?;
//! let output = process_bytes(&bytes, &ProcessOptions::default())?;
//! std::fs::write("students_cleaned.xlsx", &output.bytes)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::splitter::{ColumnSplitter, SplitReport};
use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{CodecError, ProcessError, ProcessResult};
use crate::models::Table;
use crate::parser::{decode_bytes, encode_xlsx, SourceFormat};

/// Header of the column that gets split, matched ignoring case.
pub const DEFAULT_TARGET_COLUMN: &str = "Student";

/// Name of the single sheet in the output workbook.
pub const OUTPUT_SHEET_NAME: &str = "Processed Data";

/// Options for processing one upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Header of the column to split
    pub target_column: String,

    /// Sheet name of the output workbook
    pub sheet_name: String,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            sheet_name: OUTPUT_SHEET_NAME.to_string(),
        }
    }
}

/// What happened while processing an upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// How the upload was decoded
    pub source: SourceFormat,

    /// Rows in the table, header included
    pub row_count: usize,

    /// Header width before the split
    pub columns_in: usize,

    /// Header width after the split
    pub columns_out: usize,

    /// Per-row outcomes
    pub report: SplitReport,
}

/// Encoded workbook plus its summary
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub bytes: Vec<u8>,
    pub summary: ProcessSummary,
}

/// Process an uploaded spreadsheet held in memory.
///
/// This is the whole request path:
/// 1. Decode the bytes (first sheet only)
/// 2. Split the target column
/// 3. Encode the result as xlsx
///
/// Nothing is returned unless every step succeeds.
pub fn process_bytes(bytes: &[u8], options: &ProcessOptions) -> ProcessResult<ProcessOutput> {
    log_info(format!("📖 Reading upload ({} bytes)...", bytes.len()));

    let decoded = decode_bytes(bytes).map_err(|e| {
        log_error(format!("Decode failed: {}", e));
        ProcessError::from(e)
    })?;
    log_success(format!("Decoded {}", decoded.format));
    log_success(format!("Read {} rows", decoded.table.len()));

    let columns_in = decoded.table.header().map(Vec::len).unwrap_or(0);
    let (table, report) = split_table(decoded.table, options)?;
    let columns_out = table.header().map(Vec::len).unwrap_or(0);

    log_info(format!("💾 Writing sheet '{}'...", options.sheet_name));
    let bytes = encode_xlsx(&table, &options.sheet_name).map_err(|e| {
        log_error(format!("Encode failed: {}", e));
        ProcessError::from(e)
    })?;
    log_success(format!("Wrote {} bytes", bytes.len()));

    Ok(ProcessOutput {
        bytes,
        summary: ProcessSummary {
            source: decoded.format,
            row_count: table.len(),
            columns_in,
            columns_out,
            report,
        },
    })
}

/// Split the target column of an already decoded table.
pub fn split_table(table: Table, options: &ProcessOptions) -> ProcessResult<(Table, SplitReport)> {
    if table.is_empty() {
        log_error("Upload contains no rows");
        return Err(ProcessError::EmptyTable);
    }

    let splitter = ColumnSplitter::new(options.target_column.as_str());
    log_info(format!("✂️  Splitting column '{}'...", splitter.target()));
    let (table, report) = splitter.split_with_report(table).map_err(|e| {
        log_error(e.to_string());
        ProcessError::from(e)
    })?;

    log_info_indent(format!("Split:      {}", report.split), 1);
    log_info_indent(format!("Non-string: {}", report.non_string), 1);
    log_info_indent(format!("Unmatched:  {}", report.unmatched), 1);
    if report.unmatched > 0 {
        log_warning(format!(
            "{} row(s) did not match \"Name (12345)\" or \"Name 12345\" and were left as-is",
            report.unmatched
        ));
    }

    Ok((table, report))
}

/// Process a spreadsheet file and write the xlsx result to `output`.
pub fn process_file(
    input: &Path,
    output: &Path,
    options: &ProcessOptions,
) -> ProcessResult<ProcessSummary> {
    let bytes = fs::read(input).map_err(CodecError::from)?;
    let result = process_bytes(&bytes, options)?;
    fs::write(output, &result.bytes).map_err(CodecError::from)?;
    Ok(result.summary)
}

/// Default output path for an input file: `<stem>_cleaned.xlsx` next to it.
pub fn cleaned_path(input: &Path) -> std::path::PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("processed");
    input.with_file_name(format!("{}_cleaned.xlsx", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use crate::parser::decode_bytes;

    #[test]
    fn test_process_csv_upload() {
        let csv = "Student,Course\nJane Smith (54321),Math\nJohn Doe 12345,Physics\nN/A,Chem\n";
        let output = process_bytes(csv.as_bytes(), &ProcessOptions::default()).unwrap();

        assert_eq!(output.summary.row_count, 4);
        assert_eq!(output.summary.columns_in, 2);
        assert_eq!(output.summary.columns_out, 3);
        assert_eq!(output.summary.report.split, 2);
        assert_eq!(output.summary.report.unmatched, 1);

        let decoded = decode_bytes(&output.bytes).unwrap();
        assert_eq!(
            decoded.format,
            SourceFormat::Workbook {
                sheet: OUTPUT_SHEET_NAME.to_string()
            }
        );
        let rows = decoded.table.rows();
        assert_eq!(
            rows[0],
            vec![Cell::from("Name"), Cell::from("Student Number"), Cell::from("Course")]
        );
        assert_eq!(
            rows[1],
            vec![Cell::from("Jane Smith"), Cell::from("54321"), Cell::from("Math")]
        );
        assert_eq!(rows[3], vec![Cell::from("N/A"), Cell::from("Chem")]);
    }

    #[test]
    fn test_empty_upload() {
        let err = process_bytes(b"", &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::EmptyTable));
    }

    #[test]
    fn test_missing_column() {
        let err = process_bytes(b"Name,Course\nJane,Math", &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::NoSuchColumn(ref c) if c == "Student"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_custom_target_column() {
        let options = ProcessOptions {
            target_column: "learner".to_string(),
            ..ProcessOptions::default()
        };
        let output = process_bytes(b"Learner\nAda 7", &options).unwrap();
        assert_eq!(output.summary.report.split, 1);
    }

    #[test]
    fn test_process_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("class.csv");
        fs::write(&input, "Student\nJane (1)\n").unwrap();
        let output = cleaned_path(&input);

        let summary = process_file(&input, &output, &ProcessOptions::default()).unwrap();
        assert_eq!(summary.report.split, 1);
        assert!(output.exists());
        assert_eq!(output.file_name().unwrap(), "class_cleaned.xlsx");
    }

    #[test]
    fn test_process_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_file(
            &dir.path().join("nope.xlsx"),
            &dir.path().join("out.xlsx"),
            &ProcessOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Codec(CodecError::Io(_))));
    }
}
