//! Search, sort and pagination over row positions of a dataset.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartflowError, Result};
use crate::input::{CellValue, Dataset};

/// Rows per page when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;

static ABSENT: CellValue = CellValue::Absent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ChartflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(ChartflowError::InvalidArgument(format!(
                "unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Clicking a header: same column flips direction, another column
    /// starts ascending.
    pub fn toggle(current: Option<&SortState>, column: &str) -> SortState {
        match current {
            Some(state) if state.column == column => {
                SortState::new(column, state.direction.reversed())
            }
            _ => SortState::new(column, SortDirection::Ascending),
        }
    }
}

/// Positions of rows whose display form contains `term`, case-insensitive.
///
/// Searches the whole dataset; an empty term matches every row.
pub fn search(dataset: &Dataset, term: &str) -> Vec<usize> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return (0..dataset.row_count()).collect();
    }

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            dataset
                .columns()
                .iter()
                .any(|c| row.get(c).to_string().to_lowercase().contains(&needle))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Order two cells for sorting.
///
/// Cells that coerce to numbers compare numerically and sort before all
/// other cells, which compare by case-insensitive display text.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
    }
}

/// Stable sort of view positions by one column.
pub fn sort(dataset: &Dataset, view: &[usize], state: &SortState) -> Result<Vec<usize>> {
    if !dataset.has_column(&state.column) {
        return Err(ChartflowError::UnknownColumn(state.column.clone()));
    }

    let cell = |idx: usize| dataset.get(idx, &state.column).unwrap_or(&ABSENT);

    let mut sorted = view.to_vec();
    sorted.sort_by(|&a, &b| {
        let ordering = compare_cells(cell(a), cell(b));
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    Ok(sorted)
}

/// One page of the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number, clamped to the last page.
    pub number: usize,
    pub per_page: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    /// Row positions on this page.
    pub rows: Vec<usize>,
}

/// Slice the view into pages of `per_page` rows.
pub fn page(view: &[usize], number: usize, per_page: usize) -> Page {
    let per_page = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };
    let total_pages = view.len().div_ceil(per_page).max(1);
    let number = number.clamp(1, total_pages);
    let start = (number - 1) * per_page;

    Page {
        number,
        per_page,
        total_rows: view.len(),
        total_pages,
        rows: view.iter().skip(start).take(per_page).copied().collect(),
    }
}
