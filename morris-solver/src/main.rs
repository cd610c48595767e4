//! Three Men's Morris (FIFO) Solver
//!
//! Explores every reachable state and scores it retrogradely. Writes the
//! binary score table and optionally the JSON table used by the web UI.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use morris_solver::solver::Solver;
use morris_solver::table;

#[derive(Parser, Debug)]
#[command(about = "Generate the three men's morris score table")]
struct Args {
    /// Binary score table to write
    #[arg(long, short = 'o', default_value = "data/scores.bin")]
    output: PathBuf,

    /// Also write the JSON score table here
    #[arg(long)]
    json: Option<PathBuf>,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 5)]
    log_interval: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Three Men's Morris Solver");
    println!("=========================");
    println!("Output: {:?}", args.output);
    if let Some(json) = &args.json {
        println!("JSON:   {:?}", json);
    }
    println!();

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    println!("Exploring reachable states...");
    let start = Instant::now();
    let mut solver = Solver::new().context("exploring the state graph")?;
    println!(
        "Found {} states and {} moves in {:.2}s\n",
        solver.graph.len(),
        solver.graph.edge_count(),
        start.elapsed().as_secs_f64()
    );

    println!("Solving...");
    let start = Instant::now();
    let root = solver.solve(args.log_interval);
    let elapsed = start.elapsed();

    println!("\n=========================");
    println!("Solve complete!");
    println!("=========================");
    println!("Initial position score: {}", root);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!();
    solver.stats.print_summary();

    let scores = solver.table();

    println!("\nSaving binary table...");
    let save_start = Instant::now();
    let count = table::save(&args.output, &scores)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!(
        "Saved {} positions in {:.2}s",
        count,
        save_start.elapsed().as_secs_f64()
    );

    if let Some(json) = &args.json {
        println!("Saving JSON table...");
        scores
            .save_json(json)
            .with_context(|| format!("writing {}", json.display()))?;
        println!("Saved {:?}", json);
    }

    if root > 0.0 {
        println!("\nX wins with optimal play.");
    } else if root < 0.0 {
        println!("\nO wins with optimal play.");
    } else {
        println!("\nNeither side can force a win.");
    }

    Ok(())
}
