//! Export the binary score table to SQLite.
//!
//! Usage: export_sqlite [input.bin] [output.db]
//!
//! The database backs on-demand lookups in the HTTP API.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rusqlite::{params, Connection};

use morris_solver::table;

#[derive(Parser, Debug)]
#[command(about = "Convert a binary score table to a SQLite tablebase")]
struct Args {
    #[arg(default_value = "data/scores.bin")]
    input: PathBuf,

    #[arg(default_value = "data/tablebase.db")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Binary to SQLite Exporter");
    println!("=========================");
    println!("Input:  {:?}", args.input);
    println!("Output: {:?}", args.output);
    println!();

    println!("Loading binary table...");
    let start = Instant::now();
    let scores = table::load(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let entries = scores.sorted_entries();
    println!(
        "Loaded {} positions in {:.2}s",
        entries.len(),
        start.elapsed().as_secs_f64()
    );

    if args.output.exists() {
        std::fs::remove_file(&args.output)
            .with_context(|| format!("removing old {}", args.output.display()))?;
    }

    println!("\nCreating SQLite database...");
    let start = Instant::now();
    let conn = Connection::open(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    conn.execute(
        "CREATE TABLE positions (
            code INTEGER PRIMARY KEY,
            score REAL NOT NULL
        )",
        [],
    )?;

    println!("Inserting {} positions...", entries.len());
    let batch_size = 100_000;
    let total = entries.len();

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO positions (code, score) VALUES (?1, ?2)")?;
        for (i, (code, score)) in entries.iter().enumerate() {
            stmt.execute(params![code.value(), score])?;

            if (i + 1) % batch_size == 0 {
                let inserted = i + 1;
                let pct = 100.0 * inserted as f64 / total as f64;
                let rate = inserted as f64 / start.elapsed().as_secs_f64();
                println!("  {:>3.0}% ({}/{}) - {:.0} rows/sec", pct, inserted, total, rate);
            }
        }
    }
    tx.commit()?;

    let insert_time = start.elapsed().as_secs_f64();
    println!(
        "Inserted {} positions in {:.2}s ({:.0} rows/sec)",
        total,
        insert_time,
        total as f64 / insert_time
    );

    println!("\nVerifying database...");
    let step = (entries.len() / 5).max(1);
    for (code, expected) in entries.iter().step_by(step).take(5) {
        let score: f64 = conn.query_row(
            "SELECT score FROM positions WHERE code = ?1",
            params![code.value()],
            |row| row.get(0),
        )?;
        ensure!(
            score == *expected,
            "score mismatch for {}: {} != {}",
            code,
            score,
            expected
        );
    }
    println!("Verification passed!");

    let input_size = std::fs::metadata(&args.input).map(|m| m.len()).unwrap_or(0);
    let output_size = std::fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);
    println!("\nFile sizes:");
    println!("  Binary: {:.1} MB", input_size as f64 / 1024.0 / 1024.0);
    println!("  SQLite: {:.1} MB", output_size as f64 / 1024.0 / 1024.0);

    println!("\nDone! Database created at {:?}", args.output);
    Ok(())
}
