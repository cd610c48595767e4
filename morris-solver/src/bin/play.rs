//! Play against the score table in the terminal.
//!
//! Enter a position 0-8 to place a piece, an empty line to let the table
//! pick for you, a negative number to take back that many moves, or `q` to
//! quit.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use morris_core::ai::{self, choose_move, rank_moves};
use morris_core::{Action, GameState, Player, Pos, ScoreTable};
use morris_solver::table;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    X,
    O,
    None,
}

impl Side {
    fn player(self) -> Option<Player> {
        match self {
            Side::X => Some(Player::X),
            Side::O => Some(Player::O),
            Side::None => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Play three men's morris against the score table")]
struct Args {
    /// Score table (.bin or .json)
    #[arg(long, default_value = "data/scores.bin")]
    table: PathBuf,

    /// Side played by the computer
    #[arg(long, value_enum, default_value = "o")]
    ai: Side,

    /// Computer strength, 0-100
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    intelligence: u8,

    /// Seed for the computer's choices
    #[arg(long)]
    seed: Option<u64>,
}

fn load_scores(path: &Path) -> Result<ScoreTable> {
    let scores = if path.extension().is_some_and(|ext| ext == "json") {
        ScoreTable::load_json(path)?
    } else {
        table::load(path)?
    };
    Ok(scores)
}

enum Input {
    Auto,
    Place(Pos),
    Undo(usize),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Some(Input::Auto);
    }
    if line.eq_ignore_ascii_case("q") {
        return Some(Input::Quit);
    }
    let value: i64 = line.parse().ok()?;
    if value < 0 {
        Some(Input::Undo(value.unsigned_abs() as usize))
    } else {
        u8::try_from(value).ok().map(|index| Input::Place(Pos(index)))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scores = load_scores(&args.table)
        .with_context(|| format!("loading {}", args.table.display()))?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let ai_player = args.ai.player();
    let intelligence = f64::from(args.intelligence) / 100.0;

    println!("Loaded {} scores from {:?}", scores.len(), args.table);
    let mut game = GameState::new();
    println!("{}", game);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        let ranked = rank_moves(&game, &scores)?;
        let options: Vec<String> = ranked
            .iter()
            .map(|m| format!("{}:{:.3}", m.position.0, m.score))
            .collect();
        println!("State={} options=[{}]", game.encode(), options.join(" "));

        let action = if ai::is_ai_turn(&game, ai_player) {
            let choice = choose_move(&game, &scores, intelligence, &mut rng)?;
            println!("Computer plays {}", choice.position.0);
            Action::Place(choice.position)
        } else {
            print!("{}: ", game.turn().symbol());
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            match parse_input(&line?) {
                Some(Input::Quit) => return Ok(()),
                Some(Input::Auto) => {
                    let choice = choose_move(&game, &scores, 1.0, &mut rng)?;
                    println!("Automatically selected {}", choice.position.0);
                    Action::Place(choice.position)
                }
                Some(Input::Place(pos)) => Action::Place(pos),
                // Take back as much as the history allows.
                Some(Input::Undo(offset)) => Action::Undo(offset.min(game.history().len())),
                None => {
                    println!("Enter 0-8, a negative number to undo, or q");
                    continue;
                }
            }
        };

        if matches!(action, Action::Undo(0)) {
            println!("Nothing to undo");
            continue;
        }
        match game.apply(action) {
            Ok(next) => game = next,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        }
        println!("{}", game);
    }

    if let Some(winner) = game.winner() {
        println!("{} won!", winner.symbol());
    }
    Ok(())
}
