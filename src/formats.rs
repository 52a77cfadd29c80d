//! File-format dispatch and the per-format table codecs.
//!
//! The supported formats form a closed enum so read/write dispatch is
//! exhaustively checkable instead of string matching scattered across call
//! sites. CSV goes through the `csv` crate, spreadsheet reading through
//! `calamine`, spreadsheet writing through `rust_xlsxwriter`.
//!
//! Writes never touch the destination directly: the codec renders into a
//! temporary file in the destination directory which is then renamed over
//! the target, so a failed write cannot truncate an existing file. This
//! matters most for `--update` runs where destination and source coincide.

use std::io::{Read, Seek, Write};
use std::path::Path;

use calamine::{DataType, Reader as CalamineReader, Xls, Xlsx, open_workbook};
use tempfile::NamedTempFile;

use crate::errors::{EnricherError, IoResultExt, Result};
use crate::table::{Cell, Table};

/// Recognized table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Resolve the format from a path's extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            _ => Err(EnricherError::unsupported_format(
                path.display().to_string(),
                format!(".{extension}"),
            )),
        }
    }
}

/// Read a table from `path`, dispatching on its extension.
pub fn read_table(path: &Path) -> Result<Table> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => read_csv(path),
        FileFormat::Xlsx => {
            let workbook: Result<Xlsx<_>> = open_workbook(path).map_err(|e: calamine::XlsxError| {
                EnricherError::table_read(path.display().to_string(), e.to_string())
            });
            read_sheet(workbook?, path)
        }
        FileFormat::Xls => {
            let workbook: Result<Xls<_>> = open_workbook(path).map_err(|e: calamine::XlsError| {
                EnricherError::table_read(path.display().to_string(), e.to_string())
            });
            read_sheet(workbook?, path)
        }
    }
}

/// Write a table to `path`, dispatching on its extension.
///
/// The format is resolved before anything is created on disk, so an
/// unsupported destination leaves the filesystem untouched.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => write_csv(table, path),
        FileFormat::Xlsx => write_xlsx(table, path),
        // calamine reads the legacy format but no maintained crate writes
        // it; point the user at the supported output formats.
        FileFormat::Xls => Err(EnricherError::unsupported_format(
            path.display().to_string(),
            ".xls (output; use .xlsx or .csv)",
        )),
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| EnricherError::table_read(path.display().to_string(), e.to_string()))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| EnricherError::table_read(path.display().to_string(), e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record
            .map_err(|e| EnricherError::table_read(path.display().to_string(), e.to_string()))?;
        table.push_row(record.iter().map(|f| Cell::from(f.to_string())).collect());
    }
    Ok(table)
}

/// Read the first worksheet of an already-opened workbook as a table whose
/// header is the sheet's first row.
fn read_sheet<RS, R>(mut workbook: R, path: &Path) -> Result<Table>
where
    RS: Read + Seek,
    R: CalamineReader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            EnricherError::table_read(path.display().to_string(), "workbook has no worksheets")
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| {
            EnricherError::table_read(
                path.display().to_string(),
                format!("worksheet '{sheet_name}' is missing"),
            )
        })?
        .map_err(|e| EnricherError::table_read(path.display().to_string(), e.to_string()))?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(h) => h,
        None => return Ok(Table::new(Vec::new())),
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = convert_cell(cell).to_string();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }
    Ok(table)
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(s) => Cell::from(s.clone()),
        DataType::Float(v) | DataType::DateTime(v) | DataType::Duration(v) => Cell::Number(*v),
        DataType::Int(v) => Cell::Number(*v as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTimeIso(s) | DataType::DurationIso(s) => Cell::from(s.clone()),
        // Formula errors carry no usable value.
        DataType::Error(_) => Cell::Empty,
    }
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns())
        .map_err(|e| EnricherError::table_write(path.display().to_string(), e.to_string()))?;
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        writer
            .write_record(&fields)
            .map_err(|e| EnricherError::table_write(path.display().to_string(), e.to_string()))?;
    }
    let rendered = writer
        .into_inner()
        .map_err(|e| EnricherError::table_write(path.display().to_string(), e.to_string()))?;

    let mut tmp = scratch_file(path)?;
    tmp.write_all(&rendered)
        .with_path(path.display().to_string(), "write")?;
    persist(tmp, path)
}

fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name.as_str())
            .map_err(|e| EnricherError::table_write(path.display().to_string(), e.to_string()))?;
    }
    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col_num = col as u16;
            let written = match cell {
                Cell::Empty => Ok(&mut *worksheet),
                Cell::Text(s) => worksheet.write_string(row_num, col_num, s.as_str()),
                Cell::Number(n) => worksheet.write_number(row_num, col_num, *n),
                Cell::Bool(b) => worksheet.write_boolean(row_num, col_num, *b),
            };
            written.map_err(|e| {
                EnricherError::table_write(path.display().to_string(), e.to_string())
            })?;
        }
    }

    let tmp = scratch_file(path)?;
    workbook
        .save(tmp.path())
        .map_err(|e| EnricherError::table_write(path.display().to_string(), e.to_string()))?;
    persist(tmp, path)
}

/// Temporary file in the destination's directory so the final rename stays
/// on one filesystem.
fn scratch_file(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).with_path(path.display().to_string(), "create temporary file")
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| EnricherError::io(path.display().to_string(), "rename", e.error))?;
    Ok(())
}
