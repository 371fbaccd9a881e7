//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chartflow: tabular data cleaning, statistics and chart series
#[derive(Parser)]
#[command(name = "chartflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show shape, format problems and column statistics of a data file
    Inspect {
        /// Path to the data file (CSV/TSV/XLSX/XLS/ODS)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet to read from a workbook
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Correlate two numeric columns
    Correlate {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column on the x axis
        #[arg(value_name = "X")]
        x: String,

        /// Column on the y axis
        #[arg(value_name = "Y")]
        y: String,

        /// Sheet to read from a workbook
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply cleaning operations and export the result as CSV
    Clean {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet to read from a workbook
        #[arg(short, long)]
        sheet: Option<String>,

        /// Apply every detected date and number format correction
        #[arg(long)]
        fix_formats: bool,

        /// Fill or drop missing values: COLUMN=METHOD or COLUMN=value:TEXT
        #[arg(long, value_name = "SPEC")]
        fill: Vec<String>,

        /// Split a text column on a delimiter
        #[arg(long, value_name = "COLUMN")]
        split: Option<String>,

        /// Delimiter used with --split
        #[arg(long, default_value = ",", requires = "split")]
        delimiter: String,

        /// Names of the columns produced by --split
        #[arg(long = "into", value_name = "NAME", requires = "split")]
        split_into: Vec<String>,

        /// Rename a column: OLD=NEW
        #[arg(long, value_name = "OLD=NEW")]
        rename: Vec<String>,

        /// Output path for the cleaned CSV (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API over a session
    Serve {
        /// Data file to import on startup
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Sheet to read from a workbook
        #[arg(short, long)]
        sheet: Option<String>,

        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,
    },
}
