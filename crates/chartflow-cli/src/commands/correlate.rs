//! Correlate command - relationship between two numeric columns.

use std::path::PathBuf;

use chartflow::{ChartflowConfig, Metric};
use colored::Colorize;

use super::open_session;

pub fn run(
    file: PathBuf,
    x: String,
    y: String,
    sheet: Option<String>,
    json_output: bool,
    config: ChartflowConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(&file, sheet.as_deref(), config)?;
    let result = session.correlation(&x, &y)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} {} {}",
        "Correlation of".cyan().bold(),
        result.x_column.white().bold(),
        "and".cyan().bold(),
        result.y_column.white().bold()
    );
    println!();
    println!("  Pairs:        {}", result.pairs);

    match &result.correlation {
        Metric::Available(r) => println!("  Coefficient:  {:.4}", r),
        Metric::Unavailable { reason } => {
            println!("  Coefficient:  {}", format!("unavailable ({})", reason).yellow())
        }
    }
    match result.significance.as_option() {
        Some(significance) => println!(
            "  Significance: {}",
            format!("{:?}", significance).to_lowercase()
        ),
        None => println!("  Significance: {}", "unavailable".yellow()),
    }

    println!(
        "  Trend of {}:  {}",
        result.y_column,
        format!("{:?}", result.trend).to_lowercase()
    );
    match &result.volatility {
        Metric::Available(v) => println!("  Volatility:   {:.2}%", v),
        Metric::Unavailable { reason } => {
            println!("  Volatility:   {}", format!("unavailable ({})", reason).yellow())
        }
    }
    println!("  Next value:   {:.2}", result.prediction);

    Ok(())
}
