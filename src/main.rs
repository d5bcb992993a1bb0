mod classify;
mod compare;
mod error;
mod ingest;
mod output;
mod parser;
mod pipeline;
mod records;
mod report;
mod settings;
mod stats;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use classify::AccessoryDetector;
use settings::Settings;

#[derive(Parser)]
#[command(name = "phone_prices", about = "Used phone marketplace price analyzer")]
struct Cli {
    /// Directory holding marketplace*.json listing files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory for CSV tables and the report
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Launch price CSV (model,64GB,128GB,...)
    #[arg(long, global = true)]
    launch_prices: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, classify, summarize, compare with launch prices and write everything
    Run,
    /// Extract, classify and summarize without the launch price comparison
    Process,
    /// Print used vs launch price per segment
    Compare,
    /// Segment price table
    Overview {
        /// Only models containing this text (case-insensitive)
        #[arg(short, long)]
        model: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show how a single title and price are parsed
    Inspect {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        price: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?.with_overrides(cli.data_dir, cli.output_dir, cli.launch_prices);
    info!(settings = ?settings, "Starting phone price analyzer");
    let detector = AccessoryDetector::with_extra(&settings.accessory_keywords);

    let result = match cli.command {
        Commands::Run => {
            let listings = ingest::load_listings(&settings.data_dir, &settings.file_prefix)?;
            let launch = compare::load_launch_prices(&settings.launch_prices)?;
            let analysis = pipeline::analyze(&listings, &detector, Some(launch.as_slice()))?;
            finish(&settings, &analysis)
        }
        Commands::Process => {
            let listings = ingest::load_listings(&settings.data_dir, &settings.file_prefix)?;
            let analysis = pipeline::analyze(&listings, &detector, None)?;
            finish(&settings, &analysis)
        }
        Commands::Compare => {
            let listings = ingest::load_listings(&settings.data_dir, &settings.file_prefix)?;
            let launch = compare::load_launch_prices(&settings.launch_prices)?;
            let analysis = pipeline::analyze(&listings, &detector, Some(launch.as_slice()))?;
            let rows = analysis.comparison.unwrap_or_default();
            if rows.is_empty() {
                println!("No segment matched a launch price.");
                return Ok(());
            }
            println!("{:<28} | {:>8} | {:>8} | {:>7}", "Segment", "Launch", "Used", "Diff");
            println!("{}", "-".repeat(60));
            for r in &rows {
                println!(
                    "{:<28} | {:>8.0} | {:>8.0} | {:>7}",
                    fit_cell(&r.display_name(), 28),
                    r.launch_price,
                    r.used_price,
                    r.label
                );
            }
            Ok(())
        }
        Commands::Overview { model, limit } => {
            let listings = ingest::load_listings(&settings.data_dir, &settings.file_prefix)?;
            let analysis = pipeline::analyze(&listings, &detector, None)?;
            let filter = model.map(|m| m.to_lowercase());
            let rows: Vec<_> = analysis
                .summary
                .iter()
                .filter(|r| {
                    filter
                        .as_deref()
                        .map_or(true, |f| r.model.as_str().to_lowercase().contains(f))
                })
                .take(limit)
                .collect();
            if rows.is_empty() {
                println!("No segments found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<20} | {:>7} | {:>5} | {:>8} | {:>8} | {:>8}",
                "#", "Model", "Storage", "Count", "Min", "Max", "Avg"
            );
            println!("{}", "-".repeat(76));
            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<20} | {:>7} | {:>5} | {:>8} | {:>8} | {:>8.0}",
                    i + 1,
                    fit_cell(r.model.as_str(), 20),
                    r.storage.to_string(),
                    r.count,
                    r.min_price,
                    r.max_price,
                    r.avg_price
                );
            }
            println!("\n{} segments | {} outliers flagged", rows.len(), analysis.outliers.len());
            Ok(())
        }
        Commands::Inspect { title, price } => {
            let normalized = parser::normalize::normalize_title(&title);
            println!("Normalized: {}", normalized);
            println!("Matches:    {:?}", parser::model::matched_labels(&normalized));
            println!("Model:      {}", parser::model::extract_model(&normalized));
            println!("Storage:    {}", parser::storage::extract_storage(&normalized));
            println!("Accessory:  {}", detector.is_accessory(&title));
            if let Some(p) = price {
                match parser::price::parse_price(&p) {
                    Some(n) => println!("Price:      {}", n),
                    None => println!("Price:      (unparseable)"),
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_elapsed(elapsed));
    }

    result
}

fn finish(settings: &Settings, analysis: &pipeline::Analysis) -> Result<()> {
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let markdown = report::render_markdown(analysis, &generated_at);
    let written = output::write_all(&settings.output_dir, analysis, &markdown)?;

    println!(
        "Saved {} valid listings and {} excluded listings ({} loaded).",
        analysis.classification.valid.len(),
        analysis.classification.excluded.len(),
        analysis.raw_count,
    );
    println!(
        "{} segments, {} possible outliers.",
        analysis.summary.len(),
        analysis.outliers.len()
    );
    for path in &written {
        println!("  -> {}", path.display());
    }
    Ok(())
}

/// Clip `s` so it fills at most `width` columns, ellipsis included.
fn fit_cell(s: &str, width: usize) -> String {
    if s.char_indices().nth(width).is_none() {
        return s.to_string();
    }
    let keep = width.saturating_sub(3);
    let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
    format!("{}...", &s[..end])
}

fn format_elapsed(d: Duration) -> String {
    match d.as_secs() {
        s if s < 60 => format!("{:.1}s", d.as_secs_f64()),
        s if s < 3600 => format!("{}m {:02}s", s / 60, s % 60),
        s => format!("{}h {:02}m", s / 3600, (s % 3600) / 60),
    }
}
