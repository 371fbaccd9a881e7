//! Clean command - apply cleaning operations and export CSV.

use std::path::PathBuf;

use chartflow::transform::TransformChange;
use chartflow::view::export_csv_to_path;
use chartflow::{ChartflowConfig, MissingValueMethod};
use colored::Colorize;
use indexmap::IndexMap;

use super::open_session;

/// Arguments of the clean command.
pub struct CleanArgs {
    pub file: PathBuf,
    pub sheet: Option<String>,
    pub fix_formats: bool,
    pub fill: Vec<String>,
    pub split: Option<String>,
    pub delimiter: String,
    pub split_into: Vec<String>,
    pub rename: Vec<String>,
    pub output: Option<PathBuf>,
}

/// A parsed `--fill` argument.
#[derive(Debug, PartialEq)]
struct FillSpec {
    column: String,
    method: MissingValueMethod,
    value: Option<String>,
}

/// Parse `COLUMN=METHOD` or `COLUMN=value:TEXT`.
fn parse_fill(spec: &str) -> Result<FillSpec, Box<dyn std::error::Error>> {
    let (column, rest) = spec
        .split_once('=')
        .ok_or_else(|| format!("Invalid --fill '{}', expected COLUMN=METHOD", spec))?;
    let (method, value) = match rest.split_once(':') {
        Some((method, value)) => (method, Some(value.to_string())),
        None => (rest, None),
    };
    Ok(FillSpec {
        column: column.to_string(),
        method: method.parse()?,
        value,
    })
}

/// Parse `OLD=NEW` pairs into a rename mapping, keeping argument order.
fn parse_renames(specs: &[String]) -> Result<IndexMap<String, String>, Box<dyn std::error::Error>> {
    let mut mapping = IndexMap::new();
    for spec in specs {
        let (old, new) = spec
            .split_once('=')
            .ok_or_else(|| format!("Invalid --rename '{}', expected OLD=NEW", spec))?;
        mapping.insert(old.to_string(), new.to_string());
    }
    Ok(mapping)
}

fn report(change: &TransformChange) {
    eprintln!(
        "  {} {} ({} values changed, {} rows removed)",
        "✓".green(),
        change.description,
        change.values_changed,
        change.rows_removed
    );
    if !change.columns_added.is_empty() {
        eprintln!("    added columns: {}", change.columns_added.join(", "));
    }
    if change.values_discarded > 0 {
        eprintln!(
            "    {} {} non-text values could not be split",
            "!".yellow(),
            change.values_discarded
        );
    }
}

pub fn run(args: CleanArgs, config: ChartflowConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Validate everything before touching the data.
    let fills = args
        .fill
        .iter()
        .map(|spec| parse_fill(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let renames = parse_renames(&args.rename)?;

    let mut session = open_session(&args.file, args.sheet.as_deref(), config)?;

    eprintln!(
        "{} {}",
        "Cleaning".cyan().bold(),
        args.file.display().to_string().white()
    );

    if args.fix_formats {
        let pending = session.corrections().total();
        if pending == 0 {
            eprintln!("  {}", "no format corrections needed".dimmed());
        } else {
            report(&session.apply_all_corrections()?);
        }
    }

    for fill in &fills {
        report(&session.handle_missing(&fill.column, fill.method, fill.value.as_deref())?);
    }

    if let Some(column) = &args.split {
        report(&session.split_column(column, &args.delimiter, &args.split_into)?);
    }

    if !renames.is_empty() {
        report(&session.rename_columns(&renames)?);
    }

    match &args.output {
        Some(path) => {
            export_csv_to_path(session.dataset(), session.view(), path)?;
            eprintln!(
                "{} {} rows to {}",
                "Wrote".green().bold(),
                session.view().len(),
                path.display()
            );
        }
        None => print!("{}", session.export_csv()?),
    }

    Ok(())
}
