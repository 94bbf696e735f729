//! Workbook (xlsx, xlsm, xlsb, xls, ods) reading and xlsx writing.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

use super::delimited::trim_trailing_empty;
use crate::error::{CodecError, CodecResult};
use crate::models::{Cell, Row, Table};

/// Largest sheet an xlsx file can hold.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Read the first worksheet of a workbook held in memory.
///
/// Returns the sheet name along with its table.
pub fn read_first_sheet(bytes: &[u8]) -> CodecResult<(String, Table)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CodecError::NoWorksheet)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CodecError::NoWorksheet)??;

    let rows = range
        .rows()
        .map(|cells| {
            let mut row: Row = cells.iter().map(data_to_cell).collect();
            trim_trailing_empty(&mut row);
            row
        })
        .collect();

    Ok((sheet_name, Table::new(rows)))
}

/// Map a calamine value onto the cell model.
///
/// Dates keep their serial number so they survive a round trip as numbers;
/// formula errors read as empty.
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Boolean(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// Write `table` as a single-sheet xlsx workbook.
pub fn write_xlsx(table: &Table, sheet_name: &str) -> CodecResult<Vec<u8>> {
    if table.len() > MAX_ROWS {
        return Err(CodecError::TooLarge(format!(
            "{} rows (max {})",
            table.len(),
            MAX_ROWS
        )));
    }
    if table.width() > MAX_COLUMNS {
        return Err(CodecError::TooLarge(format!(
            "{} columns (max {})",
            table.width(),
            MAX_COLUMNS
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (r, row) in table.rows().iter().enumerate() {
        let r = r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::String(s) => {
                    worksheet.write_string(r, c, s.as_str())?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                Cell::Boolean(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
