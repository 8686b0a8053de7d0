//! Spreadsheet ingest and schema validation.
//!
//! This module turns the historical and forecast spreadsheets into typed rows.
//!
//! Design goals:
//! - **Strict schema** for required columns (every missing column is reported)
//! - **All-or-nothing**: a malformed cell fails the load with its line number
//! - **One code path** for CSV and workbooks: both are read into a `RawTable`
//!   of trimmed text cells first
//! - **Separation of concerns**: no merging or date parsing here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};

use crate::domain::{
    Column, ColumnValues, DATE_COLUMN, DuplicatePolicy, ForecastRecord, ForecastTable, Forecasts,
    HistoricalRecord, HistoricalTable, LoadReport, Measurements,
};
use crate::error::PipelineError;
use crate::series::duplicates::resolve_duplicates;

/// A spreadsheet read as text: one header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One data row. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line (CSV) or row number (workbook) in the source file.
    pub line: usize,
    pub cells: Vec<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Csv,
    Workbook,
}

/// Read a CSV file or the first worksheet of a workbook.
pub fn read_table(path: &Path) -> Result<RawTable, PipelineError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            return Err(PipelineError::InputParse {
                path: path.to_path_buf(),
                message: "is a directory, not a spreadsheet".to_string(),
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(PipelineError::InputParse {
                path: path.to_path_buf(),
                message: format!("failed to open: {e}"),
            });
        }
    }

    match sheet_format(path)? {
        SheetFormat::Csv => read_csv(path),
        SheetFormat::Workbook => read_workbook(path),
    }
}

/// Load the historical production spreadsheet.
pub fn load_historical(path: &Path, policy: DuplicatePolicy) -> Result<HistoricalTable, PipelineError> {
    let raw = read_table(path)?;
    let required = Column::REQUIRED_HISTORICAL;
    let parsed = parse_records::<Measurements>(&raw, path, &Column::MEASUREMENTS, &required)?;
    let rows_read = parsed.len();

    let resolved = resolve_duplicates(parsed, policy, "historical")?;
    tracing::info!(path = %path.display(), rows = resolved.rows.len(), "loaded historical input");

    Ok(HistoricalTable {
        rows: resolved
            .rows
            .into_iter()
            .map(|(fecha, values)| HistoricalRecord { fecha, values })
            .collect(),
        report: LoadReport {
            source: path.display().to_string(),
            rows_read,
            duplicates_resolved: resolved.folded,
        },
    })
}

/// Load the forecast spreadsheet.
pub fn load_forecast(path: &Path, policy: DuplicatePolicy) -> Result<ForecastTable, PipelineError> {
    let raw = read_table(path)?;
    let parsed = parse_records::<Forecasts>(&raw, path, &Column::FORECASTS, &Column::FORECASTS)?;
    let rows_read = parsed.len();

    let resolved = resolve_duplicates(parsed, policy, "forecast")?;
    tracing::info!(path = %path.display(), rows = resolved.rows.len(), "loaded forecast input");

    Ok(ForecastTable {
        rows: resolved
            .rows
            .into_iter()
            .map(|(fecha, values)| ForecastRecord { fecha, values })
            .collect(),
        report: LoadReport {
            source: path.display().to_string(),
            rows_read,
            duplicates_resolved: resolved.folded,
        },
    })
}

fn sheet_format(path: &Path) -> Result<SheetFormat, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => Ok(SheetFormat::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
        _ => Err(PipelineError::InputParse {
            path: path.to_path_buf(),
            message: format!(
                "unsupported spreadsheet format '{ext}' (expected csv, xlsx, xlsm, xlsb, xls or ods)"
            ),
        }),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, PipelineError> {
    let parse_err = |message: String| PipelineError::InputParse {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => parse_err(format!("failed to open: {e}")),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| parse_err(format!("failed to read headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start on the line after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| parse_err(format!("line {line}: {e}")))?;
        rows.push(RawRow {
            line,
            cells: record.iter().map(non_blank).collect(),
        });
    }

    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawTable, PipelineError> {
    let parse_err = |message: String| PipelineError::InputParse {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| parse_err(format!("not a readable workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_err("workbook has no worksheets".to_string()))?
        .map_err(|e| parse_err(format!("failed to read first worksheet: {e}")))?;

    // Row numbers as shown by spreadsheet applications (1-based, absolute).
    let first_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);

    let mut sheet_rows = range.rows().enumerate();
    let headers = match sheet_rows.next() {
        Some((_, cells)) => cells
            .iter()
            .map(|c| cell_text(c).ok().flatten().unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for (idx, cells) in sheet_rows {
        let line = first_row + idx;
        let cells = cells
            .iter()
            .map(cell_text)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| parse_err(format!("row {line}: {e}")))?;
        rows.push(RawRow { line, cells });
    }

    Ok(RawTable { headers, rows })
}

/// Render a workbook cell as text.
///
/// Date cells become ISO `YYYY-MM-DD` so they join against CSV keys.
fn cell_text(cell: &Data) -> Result<Option<String>, String> {
    let text = match cell {
        Data::Empty => return Ok(None),
        Data::String(s) => s.clone(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => return Err(format!("cell error {e}")),
    };
    Ok(non_blank(&text))
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report `Fecha` as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins when a header is repeated.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn parse_records<V: ColumnValues>(
    raw: &RawTable,
    path: &Path,
    columns: &[Column],
    required: &[Column],
) -> Result<Vec<(String, V)>, PipelineError> {
    let header_map = build_header_map(&raw.headers);
    let date_key = normalize_header_name(DATE_COLUMN);

    let missing: Vec<String> = std::iter::once(DATE_COLUMN)
        .filter(|_| !header_map.contains_key(&date_key))
        .chain(
            required
                .iter()
                .filter(|c| !header_map.contains_key(&normalize_header_name(c.name())))
                .map(|c| c.name()),
        )
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema {
            path: path.to_path_buf(),
            missing,
        });
    }

    let date_idx = header_map[&date_key];
    let present: Vec<(Column, usize)> = columns
        .iter()
        .filter_map(|&c| header_map.get(&normalize_header_name(c.name())).map(|&idx| (c, idx)))
        .collect();

    let mut out = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        if row.cells.iter().all(Option::is_none) {
            continue;
        }

        let cell = |idx: usize| row.cells.get(idx).and_then(|c| c.as_deref());

        let fecha = cell(date_idx).ok_or_else(|| PipelineError::InputParse {
            path: path.to_path_buf(),
            message: format!("line {}: missing `{DATE_COLUMN}` value", row.line),
        })?;

        let mut values = V::default();
        for &(column, idx) in &present {
            let value = parse_number(cell(idx)).map_err(|text| PipelineError::InputParse {
                path: path.to_path_buf(),
                message: format!("line {}: `{column}` is not a number: '{text}'", row.line),
            })?;
            values.set(column, value);
        }

        out.push((fecha.to_string(), values));
    }

    Ok(out)
}

/// Blank and non-finite values are null; other non-numeric text is an error.
fn parse_number(cell: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = cell else { return Ok(None) };
    let v = s.parse::<f64>().map_err(|_| s.to_string())?;
    Ok(v.is_finite().then_some(v))
}
