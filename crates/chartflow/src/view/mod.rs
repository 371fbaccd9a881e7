//! Session state, derived views and export.

mod export;
mod query;
mod session;

pub use export::{export_csv, export_csv_to_path};
pub use query::{
    DEFAULT_PAGE_SIZE, Page, SortDirection, SortState, compare_cells, page, search, sort,
};
pub use session::{ImportOutcome, ImportTicket, Session};
