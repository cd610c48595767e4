//! Check a binary score table against the game graph and print its
//! outcome distribution.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use morris_core::StateCode;
use morris_solver::solver::distance_from_score;
use morris_solver::{table, verify_table, StateGraph};

#[derive(Parser, Debug)]
#[command(about = "Verify a score table")]
struct Args {
    #[arg(default_value = "data/scores.bin")]
    input: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let scores = table::load(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let count = scores.len();
    println!("Table has {} positions", count);

    println!("\n--- Checking initial position ---");
    match scores.get(StateCode(1_000_000)) {
        Some(score) => println!("Initial position: {}", score),
        None => println!("Initial position NOT FOUND in table!"),
    }

    let mut x_wins = 0usize;
    let mut draws = 0usize;
    let mut o_wins = 0usize;
    let mut longest = 0i32;
    for (_, score) in scores.iter() {
        if score > 0.0 {
            x_wins += 1;
        } else if score < 0.0 {
            o_wins += 1;
        } else {
            draws += 1;
        }
        longest = longest.max(distance_from_score(score).abs());
    }
    let pct = |n: usize| 100.0 * n as f64 / count.max(1) as f64;
    println!("\nOutcome distribution:");
    println!("  X wins: {} ({:.1}%)", x_wins, pct(x_wins));
    println!("  Draws:  {} ({:.1}%)", draws, pct(draws));
    println!("  O wins: {} ({:.1}%)", o_wins, pct(o_wins));
    println!("  Longest forced win: {} plies", longest);

    println!("\n--- Checking scores against the game graph ---");
    let graph = StateGraph::explore().context("exploring the state graph")?;
    let bad = verify_table(&graph, &scores);
    if !bad.is_empty() {
        for code in bad.iter().take(10) {
            println!("  inconsistent: {}", code);
        }
        bail!("{} of {} states are inconsistent", bad.len(), graph.len());
    }
    println!("All {} reachable states consistent.", graph.len());
    Ok(())
}
