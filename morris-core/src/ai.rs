//! Oracle-driven move ranking and temperature-controlled move selection.
//!
//! Ranking scores every legal placement with the value oracle. Selection
//! turns those scores into a probability distribution whose sharpness is
//! set by an intelligence factor `k` in [0, 1]:
//!
//! ```text
//! T = 5 · e^(-9k)          k = 0 -> T = 5, k = 1 -> T ≈ 0.0006
//! T <  0.001: uniform over the best-scoring moves
//! T >= 0.001: softmax(normalized_score / T)
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::oracle::Oracle;
use crate::{Error, GameState, Player, Pos, Result};

/// Temperature at intelligence 0.
pub const MAX_TEMPERATURE: f64 = 5.0;

/// Exponential decay rate of the temperature over the intelligence range.
pub const TEMPERATURE_DECAY: f64 = 9.0;

/// Below this temperature selection is purely greedy.
pub const GREEDY_TEMPERATURE: f64 = 0.001;

/// A candidate placement and the oracle score of the state it leads to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveScore {
    pub position: Pos,
    pub score: f64,
}

/// Score every legal placement for the player to move.
///
/// Positions come back in ascending order, one entry per empty cell. A code
/// the oracle does not know is reported as [`Error::MissingScore`].
pub fn rank_moves<O: Oracle + ?Sized>(state: &GameState, oracle: &O) -> Result<Vec<MoveScore>> {
    if let Some(winner) = state.winner() {
        return Err(Error::GameOver { winner });
    }
    state
        .empty_positions()
        .map(|position| {
            let code = state.successor(position)?.encode();
            let score = oracle.score(code).ok_or(Error::MissingScore { code })?;
            Ok(MoveScore { position, score })
        })
        .collect()
}

/// Softmax temperature for an intelligence factor.
#[inline]
pub fn temperature(intelligence: f64) -> f64 {
    MAX_TEMPERATURE * (-TEMPERATURE_DECAY * intelligence).exp()
}

fn check_intelligence(intelligence: f64) -> Result<()> {
    if (0.0..=1.0).contains(&intelligence) {
        Ok(())
    } else {
        Err(Error::InvalidIntelligence {
            value: intelligence,
        })
    }
}

/// Score from the mover's point of view.
#[inline]
pub fn orient(score: f64, mover: Player) -> f64 {
    match mover {
        Player::X => score,
        Player::O => -score,
    }
}

/// Map a score from [-1, 1] to [0, 1].
#[inline]
pub fn normalize(score: f64) -> f64 {
    (score + 1.0) / 2.0
}

/// Probability of each normalized score (higher is better) being picked.
pub fn decision_distribution(scores: &[f64], intelligence: f64) -> Result<Vec<f64>> {
    check_intelligence(intelligence)?;
    if scores.is_empty() {
        return Err(Error::NoCandidates);
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let temperature = temperature(intelligence);

    if temperature < GREEDY_TEMPERATURE {
        let ties = scores.iter().filter(|&&score| score == max).count();
        let probability = 1.0 / ties as f64;
        return Ok(scores
            .iter()
            .map(|&score| if score == max { probability } else { 0.0 })
            .collect());
    }

    // Shifting by the maximum leaves the softmax unchanged and keeps
    // e^(score / T) finite near the greedy threshold.
    let weights: Vec<f64> = scores
        .iter()
        .map(|&score| ((score - max) / temperature).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    Ok(weights.into_iter().map(|weight| weight / total).collect())
}

/// Selection probabilities for ranked moves, in the same order.
pub fn move_distribution(
    moves: &[MoveScore],
    mover: Player,
    intelligence: f64,
) -> Result<Vec<f64>> {
    let normalized: Vec<f64> = moves
        .iter()
        .map(|m| normalize(orient(m.score, mover)))
        .collect();
    decision_distribution(&normalized, intelligence)
}

/// Pick an index from unnormalized weights using a uniform `draw` in [0, 1).
///
/// Weights are accumulated in order and the first index whose running total
/// reaches `draw · Σw` wins. Zero weights are never picked. Returns None when
/// no weight is positive.
pub fn sample_index(weights: &[f64], draw: f64) -> Option<usize> {
    let total: f64 = weights.iter().filter(|&&weight| weight > 0.0).sum();
    if !(total > 0.0) {
        return None;
    }

    let target = draw.clamp(0.0, 1.0) * total;
    let mut accum = 0.0;
    let mut last = None;
    for (i, &weight) in weights.iter().enumerate() {
        if !(weight > 0.0) {
            continue;
        }
        accum += weight;
        last = Some(i);
        if target <= accum {
            return Some(i);
        }
    }
    // Rounding can leave the running total a hair under the target.
    last
}

/// Draw one of the ranked moves for `mover`.
pub fn select_move<R: Rng + ?Sized>(
    moves: &[MoveScore],
    mover: Player,
    intelligence: f64,
    rng: &mut R,
) -> Result<MoveScore> {
    let probabilities = move_distribution(moves, mover, intelligence)?;
    let draw: f64 = rng.random();
    let index = sample_index(&probabilities, draw).ok_or(Error::NoCandidates)?;
    Ok(moves[index])
}

/// Rank and select in one step for the player to move.
pub fn choose_move<O: Oracle + ?Sized, R: Rng + ?Sized>(
    state: &GameState,
    oracle: &O,
    intelligence: f64,
    rng: &mut R,
) -> Result<MoveScore> {
    let moves = rank_moves(state, oracle)?;
    select_move(&moves, state.turn(), intelligence, rng)
}

/// Whether the automated player (if any) is to move.
pub fn is_ai_turn(state: &GameState, ai_player: Option<Player>) -> bool {
    ai_player == Some(state.turn())
}
