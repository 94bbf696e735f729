//! Spreadsheet codec: uploaded bytes to [`Table`] and back.
//!
//! Uploads are content-sniffed. Zip (xlsx, xlsm, xlsb, ods) and OLE (xls)
//! containers are read as workbooks, first sheet only; anything else is
//! treated as delimited text. Output is always a single-sheet xlsx workbook.

pub mod delimited;
pub mod workbook;

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::CodecResult;
use crate::models::Table;

pub use delimited::{detect_delimiter, detect_encoding, decode_content, infer_cell};
pub use workbook::{read_first_sheet, write_xlsx};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// MIME type of the encoded output.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// How an upload was decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceFormat {
    /// A workbook container; `sheet` is the name of the sheet that was read.
    Workbook { sheet: String },
    /// Delimited text.
    Delimited { encoding: String, delimiter: char },
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Workbook { sheet } => write!(f, "workbook (sheet '{}')", sheet),
            SourceFormat::Delimited { encoding, delimiter } => {
                let delimiter = match delimiter {
                    '\t' => "\\t".to_string(),
                    c => c.to_string(),
                };
                write!(f, "delimited text ({}, '{}')", encoding, delimiter)
            }
        }
    }
}

/// Result of decoding an upload.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub table: Table,
    pub format: SourceFormat,
}

/// Whether the bytes look like a workbook container.
pub fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

/// Decode uploaded bytes into a table.
pub fn decode_bytes(bytes: &[u8]) -> CodecResult<DecodedTable> {
    if is_workbook(bytes) {
        let (sheet, table) = read_first_sheet(bytes)?;
        return Ok(DecodedTable {
            table,
            format: SourceFormat::Workbook { sheet },
        });
    }

    let parsed = delimited::parse_bytes(bytes)?;
    Ok(DecodedTable {
        table: parsed.table,
        format: SourceFormat::Delimited {
            encoding: parsed.encoding,
            delimiter: parsed.delimiter,
        },
    })
}

/// Decode a spreadsheet file from disk.
pub fn decode_file<P: AsRef<Path>>(path: P) -> CodecResult<DecodedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_bytes(&bytes)
}

/// Encode a table as an xlsx workbook with one sheet named `sheet_name`.
pub fn encode_xlsx(table: &Table, sheet_name: &str) -> CodecResult<Vec<u8>> {
    write_xlsx(table, sheet_name)
}
