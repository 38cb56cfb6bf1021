//! Dataset loading from CSV (local file, remote URL, or any reader) and XLSX workbooks.
//!
//! Header names are normalized (trimmed, lower-cased) before column lookup, so a
//! header such as `"  num_pages"` resolves to the `num_pages` column. Rows that do
//! not fit the expected schema are skipped and counted rather than failing the load.

use crate::models::{BookRecord, Dataset};
use calamine::{open_workbook, Reader, Xlsx};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public books dataset used when no other source is configured.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/chriszapp/datasets/main/books.csv";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Excel XLSX error: {0}")]
    ExcelXlsx(#[from] calamine::XlsxError),
    #[error("Workbook has no sheets")]
    EmptyWorkbook,
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Where the dataset lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Interpret `http://` and `https://` locations as URLs, everything else as a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DatasetSource::Url(trimmed.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(trimmed))
        }
    }

    /// True when the location names an Excel workbook rather than CSV
    pub fn is_workbook(&self) -> bool {
        let name = match self {
            DatasetSource::Path(p) => p.to_string_lossy().to_lowercase(),
            // Ignore any query string when sniffing the extension
            DatasetSource::Url(u) => u.split(['?', '#']).next().unwrap_or(u).to_lowercase(),
        };
        name.ends_with(".xlsx") || name.ends_with(".xlsm")
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Path(p) => write!(f, "{}", p.display()),
            DatasetSource::Url(u) => f.write_str(u),
        }
    }
}

/// Row accounting for a single load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub skipped: usize,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.rows_read - self.skipped
    }
}

/// Load the dataset from `source`. This is the only blocking call in the process.
pub fn load_dataset(
    source: &DatasetSource,
    show_progress: bool,
) -> Result<(Dataset, LoadReport), LoadError> {
    let spinner = show_progress.then(|| loading_spinner(source));

    let result = match source {
        DatasetSource::Path(path) if source.is_workbook() => load_workbook_file(path),
        DatasetSource::Path(path) => load_csv_file(path),
        DatasetSource::Url(url) => {
            let bytes = fetch_url(url)?;
            if source.is_workbook() {
                read_workbook(Xlsx::new(Cursor::new(bytes))?)
            } else {
                read_csv(bytes.as_slice())
            }
        }
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let (records, report) = result?;
    info!(
        source = %source,
        loaded = report.loaded(),
        skipped = report.skipped,
        "dataset loaded"
    );

    Ok((Dataset::new(records), report))
}

fn loading_spinner(source: &DatasetSource) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(format!("Loading {}", source));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Fetch a remote dataset into memory.
pub fn fetch_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}

/// Load book records from a CSV file on disk.
pub fn load_csv_file(path: &Path) -> Result<(Vec<BookRecord>, LoadReport), LoadError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Parse book records from CSV data.
///
/// Rows whose field count differs from the header, rows the CSV reader rejects,
/// and rows whose page count is not a non-negative integer are skipped.
pub fn read_csv<R: Read>(reader: R) -> Result<(Vec<BookRecord>, LoadReport), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = rdr.headers()?.clone();
    let columns = ColumnIndices::from_names(header.iter())?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for result in rdr.records() {
        report.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(error = %e, "skipping unreadable row");
                report.skipped += 1;
                continue;
            }
        };

        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() != header.len() {
            debug!(line, fields = row.len(), expected = header.len(), "skipping malformed row");
            report.skipped += 1;
            continue;
        }

        match columns.book_from(|i| row.get(i).map(str::to_string)) {
            Some(book) => records.push(book),
            None => {
                debug!(line, "skipping row with unparseable fields");
                report.skipped += 1;
            }
        }
    }

    Ok((records, report))
}

/// Load book records from the first sheet of an XLSX workbook on disk.
pub fn load_workbook_file(path: &Path) -> Result<(Vec<BookRecord>, LoadReport), LoadError> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    read_workbook(workbook)
}

/// Parse book records from the first sheet of a workbook. The first row is the header.
pub fn read_workbook<RS: Read + Seek>(
    mut workbook: Xlsx<RS>,
) -> Result<(Vec<BookRecord>, LoadReport), LoadError> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = rows.next().ok_or(LoadError::MissingColumn("title"))?;
    let names: Vec<String> = header
        .iter()
        .map(|cell| get_string_cell(cell).unwrap_or_default())
        .collect();
    let columns = ColumnIndices::from_names(names.iter().map(String::as_str))?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for (offset, row) in rows.enumerate() {
        report.rows_read += 1;
        match columns.book_from(|i| row.get(i).and_then(get_string_cell)) {
            Some(book) => records.push(book),
            None => {
                debug!(row = offset + 2, "skipping row with unparseable fields");
                report.skipped += 1;
            }
        }
    }

    Ok((records, report))
}

/// Positions of the required columns in the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    title: usize,
    authors: usize,
    num_pages: usize,
}

impl ColumnIndices {
    fn from_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<Self, LoadError> {
        let mut title = None;
        let mut authors = None;
        let mut num_pages = None;

        for (i, name) in names.enumerate() {
            match normalize_column_name(name).as_str() {
                "title" => title = title.or(Some(i)),
                "authors" | "author" => authors = authors.or(Some(i)),
                "num_pages" | "pages" | "page_count" => num_pages = num_pages.or(Some(i)),
                _ => {}
            }
        }

        Ok(Self {
            title: title.ok_or(LoadError::MissingColumn("title"))?,
            authors: authors.ok_or(LoadError::MissingColumn("authors"))?,
            num_pages: num_pages.ok_or(LoadError::MissingColumn("num_pages"))?,
        })
    }

    fn book_from(&self, field: impl Fn(usize) -> Option<String>) -> Option<BookRecord> {
        let title = field(self.title)?;
        let authors = field(self.authors)?;
        let num_pages = parse_page_count(&field(self.num_pages)?)?;
        Some(BookRecord {
            title: title.trim().to_string(),
            authors: authors.trim().to_string(),
            num_pages,
        })
    }
}

/// Trim and lower-case a header name
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse a page count, accepting integral floats such as `"352.0"`.
pub fn parse_page_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f: f64 = raw.parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

fn get_string_cell(cell: &calamine::Data) -> Option<String> {
    match cell {
        calamine::Data::String(s) => Some(s.clone()),
        calamine::Data::Int(n) => Some(n.to_string()),
        calamine::Data::Float(n) => Some(n.to_string()),
        _ => None,
    }
}
