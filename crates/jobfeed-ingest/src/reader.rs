//! Tabular file reading.
//!
//! Turns a spreadsheet (`.xlsx`, first sheet) or delimited text (`.csv`)
//! into a sequence of [`RawRow`]s keyed by the header row. Reading is
//! synchronous; async callers should run it on the blocking pool.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use tracing::debug;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;

/// Supported input formats. The file extension decides which one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Office Open XML workbook; only the first sheet is read.
    Spreadsheet,
    /// Comma-separated text with a header line.
    Delimited,
}

impl SourceFormat {
    /// Resolve a format from an extension such as `"xlsx"` or `".CSV"`.
    pub fn from_extension(extension: &str) -> AppResult<Self> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Ok(Self::Spreadsheet),
            "csv" => Ok(Self::Delimited),
            _ => Err(AppError::format(format!(
                "Unsupported file format '{extension}': only .xlsx and .csv are accepted"
            ))),
        }
    }

    /// Resolve a format from a file path's extension.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                AppError::format(format!("File '{}' has no extension", path.display()))
            })?;
        Self::from_extension(ext)
    }

    /// Canonical extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Delimited => "csv",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One data row: column name to raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: BTreeMap<String, String>,
}

impl RawRow {
    /// Raw text of `column`, if the column exists in this row.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Whether every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }

    /// Number of columns present.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no columns at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn from_cells(headers: &[String], values: impl IntoIterator<Item = String>) -> Self {
        let mut cells = BTreeMap::new();
        for (header, value) in headers.iter().zip(values) {
            if header.is_empty() {
                continue;
            }
            // The first column with a given name wins.
            cells.entry(header.clone()).or_insert(value);
        }
        Self { cells }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read every data row of `path`.
///
/// Rows whose cells are all blank are dropped. Re-reading the same file
/// yields the same rows.
pub fn parse(path: &Path, format: SourceFormat) -> AppResult<Vec<RawRow>> {
    let rows = match format {
        SourceFormat::Spreadsheet => read_spreadsheet(path)?,
        SourceFormat::Delimited => read_delimited(path)?,
    };
    debug!(path = %path.display(), %format, rows = rows.len(), "Parsed input file");
    Ok(rows)
}

fn read_spreadsheet(path: &Path) -> AppResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to open spreadsheet '{}'", path.display()),
            e,
        )
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::io(format!("Spreadsheet '{}' has no sheets", path.display())))?
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to read first sheet of '{}'", path.display()),
                e,
            )
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    Ok(rows
        .map(|cells| RawRow::from_cells(&headers, cells.iter().map(cell_text)))
        .filter(|row| !row.is_blank())
        .collect())
}

fn read_delimited(path: &Path) -> AppResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to read header line of '{}'", path.display()),
                e,
            )
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Malformed record {} in '{}'", index + 1, path.display()),
                e,
            )
        })?;
        let row = RawRow::from_cells(&headers, record.iter().map(str::to_string));
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Render a spreadsheet cell as the text a user would see.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension(".XLSX").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(
            SourceFormat::from_extension("csv").unwrap(),
            SourceFormat::Delimited
        );
        let err = SourceFormat::from_extension("xls").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn test_format_requires_extension() {
        let err = SourceFormat::from_path(Path::new("/tmp/jobs")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn test_csv_rows_keyed_by_header() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "jobs.csv",
            b"title, company_name ,location\nEngineer,Acme,C5\n,,\nTester,Globex\n",
        );

        let rows = parse(&path, SourceFormat::Delimited).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("company_name"), Some("Acme"));
        assert_eq!(rows[1].get("title"), Some("Tester"));
        assert_eq!(rows[1].get("location"), None);
    }

    #[test]
    fn test_csv_reread_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "jobs.csv", b"title\nA\nB\n");
        let first = parse(&path, SourceFormat::Delimited).unwrap();
        let second = parse(&path, SourceFormat::Delimited).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse(Path::new("/nonexistent/jobs.csv"), SourceFormat::Delimited).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_corrupt_spreadsheet_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "jobs.xlsx", b"this is not a zip archive");
        let err = parse(&path, SourceFormat::Spreadsheet).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_spreadsheet_first_sheet_header_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "title").unwrap();
        sheet.write_string(0, 1, "Company").unwrap();
        sheet.write_string(0, 2, "zip").unwrap();
        sheet.write_string(1, 0, "Engineer").unwrap();
        sheet.write_string(1, 1, "Acme").unwrap();
        sheet.write_number(1, 2, 10115.0).unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let rows = parse(&path, SourceFormat::Spreadsheet).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("title"), Some("Engineer"));
        assert_eq!(rows[0].get("Company"), Some("Acme"));
        assert_eq!(rows[0].get("zip"), Some("10115"));
    }
}
