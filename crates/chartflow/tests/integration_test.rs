//! Integration tests for Chartflow.

use std::io::Write;
use tempfile::NamedTempFile;

use chartflow::charts::{ChartData, RenderOutcome};
use chartflow::input::Record;
use chartflow::stats::{Significance, Trend};
use chartflow::{
    CellValue, ChartDraft, ChartType, ChartflowError, CorrectionKind, ImportOutcome, Metric,
    MissingValueMethod, Session, SortDirection, SortState,
};

/// Helper to create a temporary file with given content and extension.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn load(content: &str) -> (Session, NamedTempFile) {
    let file = create_test_file(content, ".csv");
    let mut session = Session::new();
    session.load_path(file.path(), None).expect("Import failed");
    (session, file)
}

// =============================================================================
// Import Tests
// =============================================================================

#[test]
fn test_import_csv() {
    let (session, _file) = load("date,revenue,region\n2024-1-5,\"1,200\",north\n2024-01-06,1350,south\n");

    let source = session.source().expect("source metadata");
    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 2);
    assert_eq!(source.column_count, 3);
    assert!(source.hash.starts_with("sha256:"));
    assert_eq!(session.dataset().columns(), &["date", "revenue", "region"]);
    assert_eq!(session.view(), &[0, 1]);
}

#[test]
fn test_import_tsv_auto_detect() {
    let file = create_test_file("name\tscore\nAlice\t3\nBob\t4\n", ".tsv");
    let mut session = Session::new();
    session.load_path(file.path(), None).unwrap();

    assert_eq!(session.source().unwrap().format, "tsv");
    assert_eq!(session.dataset().columns(), &["name", "score"]);
}

#[test]
fn test_ragged_rows_are_padded() {
    let (session, _file) = load("a,b,c\n1,2,3\n4\n");

    let row = &session.dataset().rows()[1];
    assert_eq!(row.get("a"), &CellValue::text("4"));
    assert_eq!(row.get("c"), &CellValue::Absent);
}

#[test]
fn test_short_first_row_keeps_header_columns() {
    let (session, _file) = load("name,age,city\nBob,25\nAlice,30,NYC\nCarol\nDan,41,Oslo\n");

    let dataset = session.dataset();
    assert_eq!(dataset.columns(), &["name", "age", "city"]);
    assert_eq!(dataset.row_count(), 4);
    assert_eq!(session.source().unwrap().column_count, 3);

    assert_eq!(dataset.rows()[0].get("city"), &CellValue::Absent);
    assert_eq!(dataset.rows()[2].get("age"), &CellValue::Absent);
    assert_eq!(dataset.rows()[2].get("city"), &CellValue::Absent);
    assert_eq!(dataset.rows()[3].get("city"), &CellValue::text("Oslo"));
}

#[test]
fn test_unsupported_format() {
    let file = create_test_file("{}", ".json");
    let mut session = Session::new();

    let err = session.load_path(file.path(), None).unwrap_err();
    assert!(matches!(err, ChartflowError::UnsupportedFormat(_)));
}

#[test]
fn test_header_only_file_keeps_previous_dataset() {
    let (mut session, _file) = load("x\n1\n");
    let empty = create_test_file("x,y\n", ".csv");

    let err = session.load_path(empty.path(), None).unwrap_err();
    assert!(matches!(err, ChartflowError::EmptyFile(_)));
    assert_eq!(session.dataset().row_count(), 1);
}

#[test]
fn test_records_import() {
    let records: Vec<Record> = serde_json::from_str::<Vec<serde_json::Value>>(
        r#"[{"city": "Paris", "pop": 2.1}, {"city": "Lyon"}]"#,
    )
    .unwrap()
    .iter()
    .map(|v| {
        v.as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
            .collect()
    })
    .collect();

    let mut session = Session::new();
    let outcome = session.import_records(records, "api").unwrap();

    assert_eq!(outcome, ImportOutcome::Applied { rows: 2, columns: 2 });
    assert_eq!(session.dataset().rows()[1].get("pop"), &CellValue::Absent);
}

// =============================================================================
// Quality and Cleaning Tests
// =============================================================================

#[test]
fn test_mixed_formats_scan_and_apply() {
    let (mut session, _file) =
        load("date,revenue\n2024-1-5,\"1,200\"\n2024-01-06,1350\n");

    let corrections = session.corrections();
    let date = &corrections.get("date").unwrap()[0];
    assert_eq!(date.row, 1);
    assert_eq!(date.kind, CorrectionKind::DateFormat);
    assert_eq!(date.suggestion, CellValue::text("2024-01-05"));

    let revenue = &corrections.get("revenue").unwrap()[0];
    assert_eq!(revenue.row, 1);
    assert_eq!(revenue.kind, CorrectionKind::NumberFormat);
    assert_eq!(revenue.suggestion, CellValue::Number(1200.0));

    session.apply_correction(date).unwrap();
    // Applying the same candidate twice is harmless.
    session.apply_correction(date).unwrap();
    assert_eq!(session.corrections().total(), 1);
}

#[test]
fn test_fill_mean() {
    let (mut session, _file) = load("k,v\na,10\nb,\nc,30\n");
    session
        .handle_missing("v", MissingValueMethod::FillMean, None)
        .unwrap();

    let values: Vec<_> = session.dataset().column_values("v").cloned().collect();
    assert_eq!(
        values,
        vec![CellValue::text("10"), CellValue::Number(20.0), CellValue::text("30")]
    );
}

#[test]
fn test_split_column() {
    let (mut session, _file) = load("location\nParis;75001\n");
    session
        .split_column("location", ";", &["City".to_string(), "Zip".to_string()])
        .unwrap();

    let row = &session.dataset().rows()[0];
    assert_eq!(row.get("City"), &CellValue::text("Paris"));
    assert_eq!(row.get("Zip"), &CellValue::text("75001"));
    assert!(!session.dataset().has_column("location"));
}

#[test]
fn test_fill_on_text_column_is_insufficient() {
    let (mut session, _file) = load("name,v\nAlice,\nBob,x\n");
    let err = session
        .handle_missing("v", MissingValueMethod::FillMedian, None)
        .unwrap_err();

    assert!(matches!(err, ChartflowError::InsufficientData(_)));
    assert_eq!(session.dataset().rows()[0].get("v"), &CellValue::text(""));
}

// =============================================================================
// Analytics Tests
// =============================================================================

#[test]
fn test_statistics_six_values() {
    let (session, _file) = load("v\n1\n2\n3\n4\n5\n6\n");
    let stats = session.statistics();

    assert_eq!(stats.len(), 1);
    let record = &stats[0];
    assert_eq!(record.mean, 3.5);
    assert_eq!(record.median, 3.0);
    assert!((record.variance - 35.0 / 12.0).abs() < 1e-9);
    assert!((record.std_dev - 1.708).abs() < 1e-3);
    assert!((record.trend_percent - 150.0).abs() < 1e-9);
    assert!(record.is_positive_trend);
}

#[test]
fn test_correlation_perfect() {
    let (session, _file) = load("x,y\n1,2\n2,4\n3,6\n");
    let result = session.correlation("x", "y").unwrap();

    assert_eq!(result.correlation, Metric::Available(1.0));
    assert_eq!(result.significance, Metric::Available(Significance::High));
    assert_eq!(result.trend, Trend::Increasing);
}

#[test]
fn test_correlation_needs_two_pairs() {
    let (session, _file) = load("x,y\n1,2\n,4\n3,\n");
    let err = session.correlation("x", "y").unwrap_err();
    assert!(matches!(err, ChartflowError::InsufficientData(_)));
}

#[test]
fn test_summary_overview() {
    let (session, _file) = load("name,a,b\nx,1,2\ny,3,\n");
    let summary = session.summary();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 3);
    assert_eq!(summary.numeric_columns, 2);
}

// =============================================================================
// View and Chart Tests
// =============================================================================

#[test]
fn test_search_sort_page() {
    let (mut session, _file) = load("name,score\nAlice,30\nbob,9\nAlicia,100\n");

    session.search("ali");
    assert_eq!(session.view(), &[0, 2]);

    session
        .sort(SortState::new("score", SortDirection::Descending))
        .unwrap();
    assert_eq!(session.view(), &[2, 0]);

    let page = session.page(1, 1);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows, vec![2]);
}

#[test]
fn test_chart_lifecycle() {
    let (mut session, _file) = load("month,revenue,cost\nJan,10,4\nFeb,12,5\n");
    let id = session
        .create_chart(ChartDraft {
            title: "Revenue".into(),
            chart_type: ChartType::Bar,
            x_axis: "month".into(),
            y_axis: vec!["revenue".into(), "cost".into()],
            colors: None,
        })
        .unwrap()
        .id
        .clone();

    let ChartData::Cartesian { labels, series } = session.chart_data(&id).unwrap() else {
        panic!("expected cartesian data");
    };
    assert_eq!(labels, vec!["Jan", "Feb"]);
    assert_eq!(series[1].values, vec![Some(4.0), Some(5.0)]);

    session.split_column("month", "-", &["m".into()]).unwrap();
    let rendered = session.render_charts();
    assert!(matches!(rendered[0].outcome, RenderOutcome::Skipped { .. }));

    session.remove_chart(&id);
    assert!(session.charts().is_empty());
}

#[test]
fn test_export_view() {
    let (mut session, _file) = load("a,b\n1,x\n2,y\n");
    session.search("y");

    assert_eq!(session.export_csv().unwrap(), "\"a\",\"b\"\n\"2\",\"y\"\n");
}
