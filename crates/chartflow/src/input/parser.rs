//! Source decoders: delimited text and spreadsheet workbooks.

use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{ChartflowError, Result};

use super::cell::CellValue;
use super::normalizer::{Grid, Normalizer, Record};
use super::source::{Dataset, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Source formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Delimited text (csv, tsv, txt).
    Delimited,
    /// Spreadsheet workbook (xlsx, xlsm, xls, ods).
    Workbook,
}

impl SourceFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(ChartflowError::UnsupportedFormat(format!(
                "'{}' (expected csv, tsv, xls or xlsx)",
                path.display()
            ))),
        }
    }
}

/// A fully decoded import: the canonical dataset and where it came from.
#[derive(Debug, Clone)]
pub struct Imported {
    pub dataset: Dataset,
    pub source: SourceMetadata,
}

/// A decoded workbook, holding every sheet's grid until one is selected.
#[derive(Debug, Clone)]
pub struct Workbook {
    metadata: SourceMetadata,
    sheets: IndexMap<String, Grid>,
}

impl Workbook {
    /// Wrap decoded sheets, in workbook order.
    pub fn new(metadata: SourceMetadata, sheets: IndexMap<String, Grid>) -> Self {
        Self { metadata, sheets }
    }

    /// Metadata of the workbook file.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// The sheet proposed before the user chooses one.
    pub fn default_sheet(&self) -> Option<&str> {
        self.sheets.keys().next().map(String::as_str)
    }

    /// Normalize the selected sheet.
    pub fn select(&self, sheet: &str) -> Result<Imported> {
        let grid = self
            .sheets
            .get(sheet)
            .ok_or_else(|| ChartflowError::SheetNotFound(sheet.to_string()))?;

        let dataset = Normalizer::from_grid(grid.clone(), sheet)?;
        let mut source = self.metadata.clone().with_shape(&dataset);
        source.sheet = Some(sheet.to_string());

        Ok(Imported { dataset, source })
    }

    /// Normalize the only sheet, or the given one.
    ///
    /// Multi-sheet workbooks require an explicit selection.
    pub fn resolve(&self, sheet: Option<&str>) -> Result<Imported> {
        match sheet {
            Some(name) => self.select(name),
            None if self.sheets.len() == 1 => {
                let name = self.default_sheet().unwrap_or_default().to_string();
                self.select(&name)
            }
            None if self.sheets.is_empty() => Err(ChartflowError::EmptyFile(self.metadata.file.clone())),
            None => Err(ChartflowError::SheetSelectionRequired(self.sheets.len())),
        }
    }
}

/// A decoded source, before sheet selection.
#[derive(Debug, Clone)]
pub enum DecodedSource {
    /// Delimited text, already in the record form.
    Records {
        records: Vec<Record>,
        metadata: SourceMetadata,
    },
    /// Spreadsheet awaiting a sheet choice.
    Workbook(Workbook),
}

impl DecodedSource {
    /// Normalize into a dataset, selecting `sheet` for workbooks.
    pub fn into_imported(self, sheet: Option<&str>) -> Result<Imported> {
        match self {
            DecodedSource::Records { records, metadata } => {
                let dataset = Normalizer::from_records(records, &metadata.file)?;
                let source = metadata.with_shape(&dataset);
                Ok(Imported { dataset, source })
            }
            DecodedSource::Workbook(workbook) => workbook.resolve(sheet),
        }
    }
}

/// Decodes tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Decode a file and normalize it, selecting `sheet` for workbooks.
    pub fn load(&self, path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Imported> {
        let imported = self.decode_file(path)?.into_imported(sheet)?;
        info!(
            file = %imported.source.file,
            rows = imported.source.row_count,
            columns = imported.source.column_count,
            "imported dataset"
        );
        Ok(imported)
    }

    /// Decode a file without normalizing it.
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<DecodedSource> {
        let path = path.as_ref();
        let format = SourceFormat::from_path(path)?;

        let contents = std::fs::read(path).map_err(|e| ChartflowError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());
        let size_bytes = contents.len() as u64;

        match format {
            SourceFormat::Delimited => {
                let delimiter = match self.config.delimiter {
                    Some(d) => d,
                    None => detect_delimiter(&contents)?,
                };
                let records = self.decode_delimited(&contents, delimiter)?;
                let format = delimiter_format(delimiter).to_string();
                let metadata = SourceMetadata::new(path.to_path_buf(), hash, size_bytes, format);
                Ok(DecodedSource::Records { records, metadata })
            }
            SourceFormat::Workbook => {
                let sheets = decode_workbook(path)?;
                let format = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                let metadata = SourceMetadata::new(path.to_path_buf(), hash, size_bytes, format);
                debug!(file = %metadata.file, sheets = sheets.len(), "decoded workbook");
                Ok(DecodedSource::Workbook(Workbook { metadata, sheets }))
            }
        }
    }

    /// Decode delimited bytes into the record form.
    ///
    /// Cells are kept as text. Every record carries every header key, with
    /// fields missing from a short row set to [`CellValue::Absent`].
    pub fn decode_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;

            let mut row = Record::with_capacity(headers.len());
            for (idx, header) in headers.iter().enumerate() {
                let value = record.get(idx).map(CellValue::text).unwrap_or_default();
                row.insert(header.clone(), value);
            }
            records.push(row);
        }

        Ok(records)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read every sheet of a workbook into grids.
fn decode_workbook(path: &Path) -> Result<IndexMap<String, Grid>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ChartflowError::Excel(format!("cannot open '{}': {}", path.display(), e)))?;

    let mut sheets = IndexMap::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ChartflowError::Excel(format!("cannot read sheet '{}': {}", name, e)))?;

        let grid: Grid = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        sheets.insert(name, grid);
    }

    Ok(sheets)
}

/// Map a spreadsheet cell onto the closed cell variant.
///
/// Dates stay as their serial number, the way spreadsheet readers hand them
/// over without date parsing.
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Absent,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn delimiter_format(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Detect the delimiter by analyzing the first few lines.
pub fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ChartflowError::EmptyFile("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs get a small bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_decode_delimited_keeps_text() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,NYC\n\nBob,25\n,,\n";
        let records = parser.decode_delimited(data, b',').unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("age"), Some(&CellValue::text("30")));
        assert_eq!(records[1].get("city"), Some(&CellValue::Absent));
        assert_eq!(records[2].get("name"), Some(&CellValue::text("")));
    }

    #[test]
    fn test_short_first_row_keeps_all_columns() {
        let parser = Parser::new();
        let data = b"name,age,city\nBob,25\nAlice,30,NYC\n";
        let records = parser.decode_delimited(data, b',').unwrap();
        assert_eq!(records[0].len(), 3);

        let dataset = Normalizer::from_records(records, "people.csv").unwrap();
        assert_eq!(dataset.columns(), ["name", "age", "city"]);
        assert_eq!(dataset.get(0, "city"), Some(&CellValue::Absent));
        assert_eq!(dataset.get(1, "city"), Some(&CellValue::text("NYC")));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SourceFormat::from_path(Path::new("report.pdf")).unwrap_err();
        assert!(matches!(err, ChartflowError::UnsupportedFormat(_)));
        assert_eq!(
            SourceFormat::from_path(Path::new("DATA.XLSX")).unwrap(),
            SourceFormat::Workbook
        );
    }

    #[test]
    fn test_workbook_requires_selection() {
        let mut sheets = IndexMap::new();
        let grid = vec![vec![CellValue::text("a")], vec![CellValue::Number(1.0)]];
        sheets.insert("One".to_string(), grid.clone());
        sheets.insert("Two".to_string(), vec![vec![CellValue::text("a")]]);
        let metadata =
            SourceMetadata::new(PathBuf::from("book.xlsx"), String::new(), 0, "xlsx".into());
        let workbook = Workbook { metadata, sheets };

        assert!(matches!(
            workbook.resolve(None).unwrap_err(),
            ChartflowError::SheetSelectionRequired(2)
        ));
        assert!(matches!(
            workbook.resolve(Some("Two")).unwrap_err(),
            ChartflowError::EmptySheet(_)
        ));
        assert!(matches!(
            workbook.resolve(Some("Three")).unwrap_err(),
            ChartflowError::SheetNotFound(_)
        ));

        let imported = workbook.resolve(Some("One")).unwrap();
        assert_eq!(imported.source.sheet.as_deref(), Some("One"));
        assert_eq!(imported.source.row_count, 1);
    }
}
