//! Input decoding, normalization and the canonical dataset.

mod cell;
mod normalizer;
mod parser;
mod source;

pub use cell::{CellValue, format_number, parse_finite};
pub use normalizer::{Grid, Normalizer, Record};
pub use parser::{
    DecodedSource, Imported, Parser, ParserConfig, SourceFormat, Workbook, detect_delimiter,
};
pub use source::{Dataset, Row, RowId, SourceMetadata};
