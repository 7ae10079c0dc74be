//! Growth Chart CLI Tool
//!
//! Builds growth chart series from visit records and inspects the reference
//! tables.
//!
//! Usage:
//!   growth-chart chart --visits <file> --sex <Male|Female> --metric <metric> [--unit <unit>] [--full-range]
//!   growth-chart table --sex <sex> --metric <metric> [--unit <unit>]
//!   growth-chart interpolate --sex <sex> --metric <metric> --age <years> [--band <band>]
//!
//! Example:
//!   growth-chart --format table chart --visits data/sample_visits.json --sex Male --metric height --dob 2025-03-01

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use growth_core::*;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "growth-chart")]
#[command(author = "Mycelix Health")]
#[command(version = "0.1.0")]
#[command(about = "Merge pediatric measurements with WHO growth standards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, compact, csv, or table
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the chart series for one metric
    Chart {
        /// JSON array of visit records
        #[arg(long)]
        visits: PathBuf,

        /// Patient sex: Male or Female
        #[arg(short, long)]
        sex: String,

        /// Metric: weight, height, or head_circumference
        #[arg(short, long, default_value = "weight")]
        metric: String,

        /// Age axis unit: years, months, or days (automatic if omitted)
        #[arg(short, long)]
        unit: Option<String>,

        /// Show the full reference range instead of auto-zooming
        #[arg(long)]
        full_range: bool,

        /// Date of birth (YYYY-MM-DD), used for visits without an age
        #[arg(long)]
        dob: Option<NaiveDate>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a reference table
    Table {
        #[arg(short, long)]
        sex: String,

        #[arg(short, long, default_value = "weight")]
        metric: String,

        /// Age unit for the printed table
        #[arg(short, long, default_value = "years")]
        unit: String,
    },

    /// Interpolate reference bands at an age
    Interpolate {
        #[arg(short, long)]
        sex: String,

        #[arg(short, long, default_value = "weight")]
        metric: String,

        /// Age in years
        #[arg(short, long)]
        age: f64,

        /// Single band (sd3neg, sd2neg, sd0, sd2, sd3); all bands if omitted
        #[arg(short, long)]
        band: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (result, rows): (serde_json::Value, serde_json::Value) = match cli.command {
        Commands::Chart { visits, sex, metric, unit, full_range, dob, config } => {
            let sex: Sex = sex.parse()?;
            let metric: Metric = metric.parse()?;

            let mut config = match config {
                Some(path) => ChartConfig::from_path(path)?,
                None => ChartConfig::default(),
            };
            if let Some(unit) = unit {
                config.unit = Some(unit.parse()?);
            }
            config.full_range |= full_range;

            let records = parse_visits(&fs::read_to_string(&visits)?)?;
            info!(visits = records.len(), path = %visits.display(), "loaded visit records");

            let chart = GrowthChart::from_visits(&records, metric, sex, dob, &config);
            let rows = serde_json::to_value(&chart.points)?;
            (serde_json::to_value(chart)?, rows)
        }
        Commands::Table { sex, metric, unit } => {
            let sex: Sex = sex.parse()?;
            let metric: Metric = metric.parse()?;
            let unit: DisplayUnit = unit.parse()?;

            let points: Vec<CombinedPoint> = table(metric, sex)
                .iter()
                .map(|p| CombinedPoint::from_reference(p, metric))
                .collect();
            let series = AgeSeries::in_years(points).rescale(unit);
            let rows = serde_json::to_value(series.points())?;
            (rows.clone(), rows)
        }
        Commands::Interpolate { sex, metric, age, band } => {
            let sex: Sex = sex.parse()?;
            let metric: Metric = metric.parse()?;
            let reference = table(metric, sex);

            let value = match band {
                Some(band) => {
                    let band: Band = band.parse()?;
                    serde_json::json!({
                        "age": age,
                        band.key(): interpolate(age, reference, band),
                    })
                }
                None => {
                    let mut value = serde_json::to_value(interpolate_bands(age, reference))?;
                    value["age"] = serde_json::json!(age);
                    value
                }
            };
            let rows = serde_json::Value::Array(vec![value.clone()]);
            (value, rows)
        }
    };

    // Output result
    let output_str = match cli.format.as_str() {
        "json" => serde_json::to_string_pretty(&result)?,
        "compact" => serde_json::to_string(&result)?,
        "csv" => rows_to_csv(&rows),
        "table" => rows_to_table(&rows),
        _ => serde_json::to_string_pretty(&result)?,
    };

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &output_str)?;
        info!(path = %output_path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

/// Column order: age, bands lowest first, then anything else (the patient key)
fn columns(rows: &serde_json::Value) -> Vec<String> {
    let mut columns = vec!["age".to_string()];
    columns.extend(Band::ALL.iter().map(|b| b.key().to_string()));

    if let Some(first) = rows.as_array().and_then(|a| a.first()).and_then(|r| r.as_object()) {
        for key in first.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns.retain(|c| first.contains_key(c));
    }
    columns
}

fn cell(row: &serde_json::Value, column: &str) -> String {
    match row.get(column) {
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .map(|v| format!("{:.3}", v).trim_end_matches('0').trim_end_matches('.').to_string())
            .unwrap_or_default(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string().trim_matches('"').to_string(),
    }
}

fn rows_to_csv(rows: &serde_json::Value) -> String {
    let columns = columns(rows);
    let mut output = columns.join(",");
    output.push('\n');

    for row in rows.as_array().into_iter().flatten() {
        let cells: Vec<String> = columns.iter().map(|c| cell(row, c)).collect();
        output.push_str(&cells.join(","));
        output.push('\n');
    }
    output
}

fn rows_to_table(rows: &serde_json::Value) -> String {
    let columns = columns(rows);
    let body: Vec<Vec<String>> = rows
        .as_array()
        .into_iter()
        .flatten()
        .map(|row| columns.iter().map(|c| cell(row, c)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| body.iter().map(|r| r[i].len()).fold(c.len(), usize::max))
        .collect();

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut output = format_row(&columns);
    output.push('\n');
    output.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    output.push('\n');
    for row in &body {
        output.push_str(&format_row(row));
        output.push('\n');
    }
    output
}
