//! View state manager: the single owner of the active dataset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::charts::{ChartData, ChartDefinition, ChartDraft, ChartRegistry, RenderedChart, SeriesBuilder};
use crate::config::ChartflowConfig;
use crate::error::{ChartflowError, Result};
use crate::input::{
    Dataset, DecodedSource, Grid, Imported, Normalizer, Parser, Record, Row, SourceMetadata,
    Workbook,
};
use crate::quality::{CorrectionCandidate, CorrectionMap, QualityScanner};
use crate::stats::{CorrelationAnalyzer, CorrelationResult, DatasetSummary, StatisticRecord, StatisticsEngine};
use crate::transform::{CleaningEngine, CleaningOperation, MissingValueMethod, TransformChange};

use super::export;
use super::query::{self, Page, SortState};

/// Handle for an in-flight import. Only the latest ticket may install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTicket {
    pub generation: u64,
}

/// What happened to a completed import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// The import replaced the active dataset.
    Applied { rows: usize, columns: usize },
    /// A workbook with several sheets is waiting for `select_sheet`.
    SheetSelectionRequired {
        sheets: Vec<String>,
        default_sheet: Option<String>,
    },
    /// A newer import was started; this result was discarded.
    Superseded { generation: u64, latest: u64 },
}

/// Session state: dataset, filtered view, chart definitions.
///
/// All derived outputs (corrections, statistics, correlation, chart series)
/// are recomputed from the active dataset on demand. Replacing the dataset
/// resets the view to every row.
pub struct Session {
    config: ChartflowConfig,
    dataset: Dataset,
    source: Option<SourceMetadata>,
    /// Workbook the active dataset came from, kept for sheet switching.
    workbook: Option<Workbook>,
    /// Row positions into `dataset`, in display order.
    view: Vec<usize>,
    search_term: String,
    sort: Option<SortState>,
    charts: ChartRegistry,
    /// Latest import ticket issued.
    import_generation: u64,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::with_config(ChartflowConfig::default())
    }

    /// Create an empty session with custom configuration.
    pub fn with_config(config: ChartflowConfig) -> Self {
        Self {
            config,
            dataset: Dataset::default(),
            source: None,
            workbook: None,
            view: Vec::new(),
            search_term: String::new(),
            sort: None,
            charts: ChartRegistry::new(),
            import_generation: 0,
        }
    }

    pub fn config(&self) -> &ChartflowConfig {
        &self.config
    }

    /// The active dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Metadata of the file the dataset was imported from, if any.
    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Sheets of the workbook behind the active or pending import.
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook
            .as_ref()
            .map(|wb| wb.sheet_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn install(&mut self, dataset: Dataset) {
        self.view = (0..dataset.row_count()).collect();
        self.search_term.clear();
        self.sort = None;
        self.dataset = dataset;

        let dangling = self.charts.dangling(&self.dataset);
        for err in &dangling {
            warn!(error = %err, "chart references a missing column");
        }
    }

    fn install_import(&mut self, imported: Imported) -> ImportOutcome {
        let Imported { dataset, source } = imported;
        let outcome = ImportOutcome::Applied {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        };
        info!(
            file = %source.file,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "replaced active dataset"
        );
        self.source = Some(source);
        self.install(dataset);
        outcome
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// Start an import. Any import started earlier is superseded.
    pub fn begin_import(&mut self) -> ImportTicket {
        self.import_generation += 1;
        debug!(generation = self.import_generation, "began import");
        ImportTicket {
            generation: self.import_generation,
        }
    }

    /// Finish an import with its decoded source.
    ///
    /// A superseded ticket leaves the session untouched, whatever the
    /// decode result. A failed decode also leaves the active dataset in place.
    pub fn complete_import(
        &mut self,
        ticket: ImportTicket,
        decoded: Result<DecodedSource>,
        sheet: Option<&str>,
    ) -> Result<ImportOutcome> {
        if ticket.generation != self.import_generation {
            warn!(
                generation = ticket.generation,
                latest = self.import_generation,
                "discarded superseded import"
            );
            return Ok(ImportOutcome::Superseded {
                generation: ticket.generation,
                latest: self.import_generation,
            });
        }

        match decoded? {
            DecodedSource::Workbook(workbook) => {
                if sheet.is_none() && workbook.sheet_names().len() > 1 {
                    let outcome = ImportOutcome::SheetSelectionRequired {
                        sheets: workbook.sheet_names().into_iter().map(str::to_string).collect(),
                        default_sheet: workbook.default_sheet().map(str::to_string),
                    };
                    info!(file = %workbook.metadata().file, "workbook awaits sheet selection");
                    self.workbook = Some(workbook);
                    return Ok(outcome);
                }
                let imported = workbook.resolve(sheet)?;
                self.workbook = Some(workbook);
                Ok(self.install_import(imported))
            }
            records @ DecodedSource::Records { .. } => {
                let imported = records.into_imported(None)?;
                self.workbook = None;
                Ok(self.install_import(imported))
            }
        }
    }

    /// Decode and install a file synchronously.
    pub fn load_path(&mut self, path: impl AsRef<std::path::Path>, sheet: Option<&str>) -> Result<ImportOutcome> {
        let ticket = self.begin_import();
        let decoded = Parser::with_config(self.config.parser.clone()).decode_file(path);
        self.complete_import(ticket, decoded, sheet)
    }

    /// Install a sheet of the current workbook.
    pub fn select_sheet(&mut self, sheet: &str) -> Result<ImportOutcome> {
        let workbook = self.workbook.as_ref().ok_or_else(|| {
            ChartflowError::InvalidArgument("no workbook has been imported".to_string())
        })?;
        let imported = workbook.select(sheet)?;
        Ok(self.install_import(imported))
    }

    /// Install rows already decoded into the keyed record form.
    pub fn import_records(&mut self, records: Vec<Record>, source_name: &str) -> Result<ImportOutcome> {
        self.begin_import();
        let dataset = Normalizer::from_records(records, source_name)?;
        Ok(self.install_decoded(dataset, source_name))
    }

    /// Install rows already decoded into the header-plus-rows form.
    pub fn import_grid(&mut self, grid: Grid, source_name: &str) -> Result<ImportOutcome> {
        self.begin_import();
        let dataset = Normalizer::from_grid(grid, source_name)?;
        Ok(self.install_decoded(dataset, source_name))
    }

    fn install_decoded(&mut self, dataset: Dataset, source_name: &str) -> ImportOutcome {
        let source = SourceMetadata::new(source_name.into(), String::new(), 0, "records".to_string())
            .with_shape(&dataset);
        self.workbook = None;
        self.install_import(Imported { dataset, source })
    }

    // =========================================================================
    // Cleaning
    // =========================================================================

    /// Correction candidates for the active dataset.
    pub fn corrections(&self) -> CorrectionMap {
        QualityScanner::new().scan(&self.dataset)
    }

    /// Apply a cleaning operation and make its result the active dataset.
    pub fn apply(&mut self, operation: &CleaningOperation) -> Result<TransformChange> {
        let result = CleaningEngine::from_config(&self.config).apply(&self.dataset, operation)?;
        self.install(result.dataset);
        Ok(result.change)
    }

    /// Apply one correction candidate.
    pub fn apply_correction(&mut self, candidate: &CorrectionCandidate) -> Result<TransformChange> {
        self.apply(&CleaningOperation::ApplyCorrections {
            candidates: vec![candidate.clone()],
        })
    }

    /// Scan the active dataset and apply every candidate.
    pub fn apply_all_corrections(&mut self) -> Result<TransformChange> {
        let candidates = self.corrections().into_candidates();
        self.apply(&CleaningOperation::ApplyCorrections { candidates })
    }

    pub fn handle_missing(
        &mut self,
        column: &str,
        method: MissingValueMethod,
        value: Option<&str>,
    ) -> Result<TransformChange> {
        self.apply(&CleaningOperation::HandleMissing {
            column: column.to_string(),
            method,
            value: value.map(str::to_string),
        })
    }

    pub fn split_column(&mut self, column: &str, delimiter: &str, new_columns: &[String]) -> Result<TransformChange> {
        self.apply(&CleaningOperation::SplitColumn {
            column: column.to_string(),
            delimiter: delimiter.to_string(),
            new_columns: new_columns.to_vec(),
        })
    }

    pub fn rename_columns(&mut self, mapping: &IndexMap<String, String>) -> Result<TransformChange> {
        self.apply(&CleaningOperation::RenameColumns {
            mapping: mapping.clone(),
        })
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub fn statistics(&self) -> Vec<StatisticRecord> {
        StatisticsEngine::from_config(&self.config).compute(&self.dataset)
    }

    pub fn summary(&self) -> DatasetSummary {
        StatisticsEngine::from_config(&self.config).summarize(&self.dataset)
    }

    pub fn correlation(&self, x_column: &str, y_column: &str) -> Result<CorrelationResult> {
        CorrelationAnalyzer::from_config(&self.config).analyze(&self.dataset, x_column, y_column)
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Row positions of the current view.
    pub fn view(&self) -> &[usize] {
        &self.view
    }

    /// Rows of the current view, in display order.
    pub fn view_rows(&self) -> Vec<&Row> {
        self.view
            .iter()
            .filter_map(|&idx| self.dataset.rows().get(idx))
            .collect()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Filter the full dataset. Clears any sort.
    pub fn search(&mut self, term: &str) -> &[usize] {
        self.view = query::search(&self.dataset, term);
        self.search_term = term.to_string();
        self.sort = None;
        debug!(term, matches = self.view.len(), "searched dataset");
        &self.view
    }

    /// Sort the current view.
    pub fn sort(&mut self, state: SortState) -> Result<&[usize]> {
        self.view = query::sort(&self.dataset, &self.view, &state)?;
        debug!(column = %state.column, direction = %state.direction, "sorted view");
        self.sort = Some(state);
        Ok(&self.view)
    }

    /// Sort by a column, flipping direction if it is already the sort column.
    pub fn toggle_sort(&mut self, column: &str) -> Result<&[usize]> {
        let state = SortState::toggle(self.sort.as_ref(), column);
        self.sort(state)
    }

    pub fn page(&self, number: usize, per_page: usize) -> Page {
        query::page(&self.view, number, per_page)
    }

    /// CSV of the current view.
    pub fn export_csv(&self) -> Result<String> {
        export::export_csv(&self.dataset, &self.view)
    }

    // =========================================================================
    // Charts
    // =========================================================================

    pub fn charts(&self) -> &[ChartDefinition] {
        self.charts.list()
    }

    /// Register a chart. Every referenced column must exist right now.
    pub fn add_chart(&mut self, chart: ChartDefinition) -> Result<&ChartDefinition> {
        chart.validate_shape()?;
        chart.validate_against(&self.dataset)?;
        self.charts.add(chart)
    }

    /// Register a chart under a generated id, defaulting to the palette.
    pub fn create_chart(&mut self, draft: ChartDraft) -> Result<&ChartDefinition> {
        draft.validate_against(&self.dataset)?;
        self.charts.create(draft, &self.config.palette)
    }

    pub fn remove_chart(&mut self, id: &str) -> Option<ChartDefinition> {
        self.charts.remove(id)
    }

    /// Series for one chart over the current view.
    pub fn chart_data(&self, id: &str) -> Result<ChartData> {
        let chart = self
            .charts
            .get(id)
            .ok_or_else(|| ChartflowError::InvalidArgument(format!("unknown chart '{}'", id)))?;
        SeriesBuilder::from_config(&self.config).render(chart, &self.dataset, &self.view)
    }

    /// Series for every chart; dangling charts are flagged, not fatal.
    pub fn render_charts(&self) -> Vec<RenderedChart> {
        SeriesBuilder::from_config(&self.config).render_all(self.charts.list(), &self.dataset, &self.view)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::charts::{ChartType, RenderOutcome};
    use crate::input::{CellValue, RowId};
    use crate::view::SortDirection;

    use super::*;

    fn text_grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
            .collect()
    }

    fn sales_session() -> Session {
        let mut session = Session::new();
        session
            .import_grid(
                text_grid(&[
                    &["date", "revenue", "region"],
                    &["2024-1-5", "1,200", "north"],
                    &["2024-01-06", "1350", "south"],
                    &["2024-01-07", "", "north"],
                ]),
                "sales",
            )
            .unwrap();
        session
    }

    fn workbook(sheets: &[&str]) -> Workbook {
        let metadata = SourceMetadata::new("book.xlsx".into(), "sha256:0".into(), 10, "xlsx".into());
        let sheets = sheets
            .iter()
            .map(|name| (name.to_string(), text_grid(&[&["a"], &[name]])))
            .collect();
        Workbook::new(metadata, sheets)
    }

    #[test]
    fn test_import_resets_view() {
        let mut session = sales_session();
        session.search("south");
        assert_eq!(session.view(), &[1]);

        session
            .import_grid(text_grid(&[&["x"], &["1"], &["2"]]), "other")
            .unwrap();
        assert_eq!(session.view(), &[0, 1]);
        assert_eq!(session.search_term(), "");
    }

    #[test]
    fn test_failed_import_keeps_dataset() {
        let mut session = sales_session();
        let err = session.import_grid(text_grid(&[&["only", "header"]]), "empty").unwrap_err();

        assert!(matches!(err, ChartflowError::EmptySheet(_)));
        assert_eq!(session.dataset().row_count(), 3);
    }

    #[test]
    fn test_superseded_import_is_discarded() {
        let mut session = sales_session();
        let slow = session.begin_import();
        let fast = session.begin_import();

        let applied = session
            .complete_import(fast, Ok(DecodedSource::Workbook(workbook(&["Fast"]))), None)
            .unwrap();
        assert_eq!(applied, ImportOutcome::Applied { rows: 1, columns: 1 });

        let late = session
            .complete_import(slow, Ok(DecodedSource::Workbook(workbook(&["Slow"]))), None)
            .unwrap();
        assert!(matches!(late, ImportOutcome::Superseded { .. }));
        assert_eq!(session.dataset().rows()[0].get("a"), &CellValue::text("Fast"));
    }

    #[test]
    fn test_multi_sheet_requires_selection() {
        let mut session = sales_session();
        let ticket = session.begin_import();
        let outcome = session
            .complete_import(ticket, Ok(DecodedSource::Workbook(workbook(&["Q1", "Q2"]))), None)
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::SheetSelectionRequired {
                sheets: vec!["Q1".into(), "Q2".into()],
                default_sheet: Some("Q1".into()),
            }
        );
        // Previous dataset stays active until a sheet is chosen.
        assert!(session.dataset().has_column("revenue"));

        session.select_sheet("Q2").unwrap();
        assert_eq!(session.dataset().rows()[0].get("a"), &CellValue::text("Q2"));
        assert_eq!(session.source().and_then(|s| s.sheet.as_deref()), Some("Q2"));
        assert!(matches!(
            session.select_sheet("Q9"),
            Err(ChartflowError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_corrections_then_statistics() {
        let mut session = sales_session();
        assert_eq!(session.corrections().total(), 2);

        let change = session.apply_all_corrections().unwrap();
        assert_eq!(change.values_changed, 2);
        assert!(session.corrections().is_empty());

        let stats = session.statistics();
        let revenue = stats.iter().find(|s| s.column == "revenue").unwrap();
        assert_eq!(revenue.count, 2);
        assert_eq!(revenue.sum, 2550.0);
    }

    #[test]
    fn test_correction_survives_sort() {
        let mut session = sales_session();
        let candidate = session.corrections().find("revenue", RowId(0)).unwrap().clone();

        session.sort(SortState::new("region", SortDirection::Descending)).unwrap();
        session.apply_correction(&candidate).unwrap();

        assert_eq!(
            session.dataset().rows()[0].get("revenue"),
            &CellValue::Number(1200.0)
        );
        // Cleaning replaced the dataset, so the sort was reset.
        assert!(session.sort_state().is_none());
    }

    #[test]
    fn test_search_then_sort_then_export() {
        let mut session = sales_session();
        session.search("north");
        assert_eq!(session.view(), &[0, 2]);

        // Text dates compare as text: "2024-01-07" < "2024-1-5".
        session.toggle_sort("date").unwrap();
        assert_eq!(session.view(), &[2, 0]);
        session.toggle_sort("date").unwrap();
        assert_eq!(session.view(), &[0, 2]);

        let csv = session.export_csv().unwrap();
        assert_eq!(
            csv,
            "\"date\",\"revenue\",\"region\"\n\"2024-1-5\",\"1,200\",\"north\"\n\"2024-01-07\",\"\",\"north\"\n"
        );
    }

    #[test]
    fn test_chart_registration_checks_columns() {
        let mut session = sales_session();
        let err = session
            .add_chart(ChartDefinition::new(
                "c1",
                "Profit",
                ChartType::Line,
                "date",
                vec!["profit".into()],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            ChartflowError::DanglingColumnReference { ref column, .. } if column == "profit"
        ));

        let err = session
            .create_chart(ChartDraft {
                title: "By week".into(),
                chart_type: ChartType::Bar,
                x_axis: "week".into(),
                y_axis: vec!["revenue".into()],
                colors: None,
            })
            .unwrap_err();
        assert!(matches!(err, ChartflowError::DanglingColumnReference { .. }));
        assert!(session.charts().is_empty());

        let created = session
            .create_chart(ChartDraft {
                title: "Revenue".into(),
                chart_type: ChartType::Bar,
                x_axis: "date".into(),
                y_axis: vec!["revenue".into()],
                colors: None,
            })
            .unwrap();
        assert_eq!(created.id, "chart-1");
    }

    #[test]
    fn test_rename_leaves_dangling_chart() {
        let mut session = sales_session();
        session
            .add_chart(ChartDefinition::new(
                "c1",
                "Revenue",
                ChartType::Bar,
                "date",
                vec!["revenue".into()],
            ))
            .unwrap();
        let mut mapping = IndexMap::new();
        mapping.insert("revenue".to_string(), "sales".to_string());
        session.rename_columns(&mapping).unwrap();

        let rendered = session.render_charts();
        assert!(matches!(rendered[0].outcome, RenderOutcome::Skipped { .. }));
        assert!(matches!(
            session.chart_data("c1"),
            Err(ChartflowError::DanglingColumnReference { .. })
        ));
    }

    #[test]
    fn test_fill_missing_through_session() {
        let mut session = sales_session();
        session.apply_all_corrections().unwrap();
        session
            .handle_missing("revenue", MissingValueMethod::FillMean, None)
            .unwrap();

        assert_eq!(
            session.dataset().rows()[2].get("revenue"),
            &CellValue::Number(1275.0)
        );
    }
}
