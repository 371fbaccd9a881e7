//! Inspect command - dataset shape, format problems and statistics.

use std::path::PathBuf;

use chartflow::ChartflowConfig;
use colored::Colorize;

use super::open_session;

/// Correction examples printed per column in verbose mode.
const MAX_EXAMPLES: usize = 3;

pub fn run(
    file: PathBuf,
    sheet: Option<String>,
    json_output: bool,
    config: ChartflowConfig,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(&file, sheet.as_deref(), config)?;
    let summary = session.summary();
    let corrections = session.corrections();

    if json_output {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "sheet": sheet,
            "summary": summary,
            "columns": session.dataset().columns(),
            "corrections": corrections,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Inspecting".cyan().bold(),
        file.display().to_string().white()
    );
    println!();
    println!(
        "  {} rows, {} columns ({} numeric)",
        summary.rows.to_string().white().bold(),
        summary.columns.to_string().white().bold(),
        summary.numeric_columns
    );
    println!("  Columns: {}", session.dataset().columns().join(", "));
    println!();

    if corrections.is_empty() {
        println!("{}", "No format problems found".green());
    } else {
        println!(
            "{} {}",
            "Format problems:".yellow().bold(),
            corrections.total()
        );
        for column in corrections.columns() {
            let candidates = corrections.get(column).unwrap_or_default();
            println!("  {} {}", column.white().bold(), candidates.len());
            if verbose {
                for candidate in candidates.iter().take(MAX_EXAMPLES) {
                    println!(
                        "    row {}: {} -> {} ({})",
                        candidate.row,
                        candidate.original.to_string().red(),
                        candidate.suggestion.to_string().green(),
                        candidate.kind.label()
                    );
                }
            }
        }
    }
    println!();

    if summary.statistics.is_empty() {
        println!("{}", "No numeric columns".dimmed());
        return Ok(());
    }

    println!("{}", "Statistics:".cyan().bold());
    println!(
        "  {:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9}",
        "column", "count", "sum", "mean", "median", "min", "max", "trend"
    );
    for record in &summary.statistics {
        let trend = format!("{:+.1}%", record.trend_percent);
        let trend = if record.is_positive_trend {
            trend.green()
        } else if record.trend_percent < 0.0 {
            trend.red()
        } else {
            trend.normal()
        };
        println!(
            "  {:<20} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>9}",
            record.column,
            record.count,
            record.sum,
            record.mean,
            record.median,
            record.min,
            record.max,
            trend
        );
    }

    if summary.numeric_columns > summary.statistics.len() {
        println!(
            "  {}",
            format!(
                "({} more numeric columns not shown)",
                summary.numeric_columns - summary.statistics.len()
            )
            .dimmed()
        );
    }

    Ok(())
}
