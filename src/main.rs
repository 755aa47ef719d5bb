mod analytics;
mod db;
mod harvest;
mod load;
mod table;

use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lax_scraper",
    about = "NCAA women's lacrosse finals scraper and analytics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the tournament page and dump its results table to table.csv
    Harvest,
    /// Parse table.csv into the ncaa_finals store (full replace)
    Load,
    /// Run the five analytics queries and export JSON + CSV
    Aggregate,
    /// Harvest + load + aggregate in one pipeline
    Run,
    /// Show store statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let csv_path = Path::new(table::CSV_PATH);
    let db_path = Path::new(db::DB_PATH);
    let json_path = Path::new(analytics::JSON_PATH);
    let out_csv_path = Path::new(analytics::CSV_PATH);

    let result = match cli.command {
        Commands::Harvest => harvest::run(csv_path),
        Commands::Load => load::run(csv_path, db_path),
        Commands::Aggregate => analytics::run(db_path, json_path, out_csv_path),
        Commands::Run => {
            // Each stage materializes its output before the next begins.
            harvest::run(csv_path)?;
            load::run(csv_path, db_path)?;
            analytics::run(db_path, json_path, out_csv_path)
        }
        Commands::Stats => {
            if !db_path.exists() {
                println!("Database not found: {}", db_path.display());
                return Ok(());
            }
            let conn = db::open_read_only(db_path)?;
            let s = db::get_stats(&conn)?;
            println!("Finals:      {}", s.finals);
            println!("With scores: {}", s.with_scores);
            println!("Champions:   {}", s.champions);
            match (s.first_year, s.last_year) {
                (Some(first), Some(last)) => println!("Years:       {}-{}", first, last),
                _ => println!("Years:       -"),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
