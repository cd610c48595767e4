//! Retrograde solver producing the score table.
//!
//! Finished games are scored first and results flow backwards through the
//! parent edges one ply at a time. A node whose mover has a winning child
//! wins one ply later than the fastest such child. A node whose children are
//! all lost for the mover loses one ply later than the slowest of them.
//! Nodes never reached by this process can avoid losing forever and score 0.
//!
//! Distances are signed ply counts: positive when X wins, negative when O
//! wins, and ±1 for finished games. The score of a node is `1 / distance`,
//! so faster wins have larger magnitude.
//!
//! A lost position is scored by its slowest loss, so tables from this solver
//! are not byte-compatible with ones that score the quickest loss.

use std::collections::HashSet;

use morris_core::{Player, Result, ScoreTable, StateCode};

use crate::graph::{NodeId, StateGraph};
use crate::stats::SolverStats;

/// Distance of a finished game won by X.
pub const X_WIN: i32 = 1;
/// Distance of a finished game won by O.
pub const O_WIN: i32 = -1;

/// Score for a signed distance; 0 means a draw.
pub fn score_from_distance(distance: i32) -> f64 {
    if distance == 0 {
        0.0
    } else {
        1.0 / distance as f64
    }
}

/// Signed distance for a score, or 0 for a draw.
pub fn distance_from_score(score: f64) -> i32 {
    if score == 0.0 {
        0
    } else {
        (1.0 / score).round() as i32
    }
}

fn sign(player: Player) -> i32 {
    match player {
        Player::X => 1,
        Player::O => -1,
    }
}

/// Retrograde solver over the reachable state graph.
pub struct Solver {
    pub graph: StateGraph,
    pub stats: SolverStats,
    distances: Vec<Option<i32>>,
}

impl Solver {
    /// Explore the game from the empty board.
    pub fn new() -> Result<Self> {
        Ok(Self::with_graph(StateGraph::explore()?))
    }

    pub fn with_graph(graph: StateGraph) -> Self {
        let mut stats = SolverStats::new();
        stats.states = graph.len() as u64;
        stats.edges = graph.edge_count() as u64;
        stats.max_depth = graph.max_depth() as u64;
        let distances = vec![None; graph.len()];
        Self {
            graph,
            stats,
            distances,
        }
    }

    /// Score every node. Progress is printed every `log_interval_secs`.
    ///
    /// Returns the score of the root.
    pub fn solve(&mut self, log_interval_secs: u64) -> f64 {
        let mut frontier = Vec::new();
        let leaves: Vec<NodeId> = self.graph.leaves().collect();
        for leaf in leaves {
            let distance = match self.graph.winner(leaf) {
                Some(Player::X) => X_WIN,
                Some(Player::O) => O_WIN,
                // A leaf always has a winner: every unfinished state has an empty cell.
                None => continue,
            };
            self.stats.record_terminal(distance > 0);
            self.distances[leaf] = Some(distance);
            frontier.push(leaf);
        }

        let mut resolved = frontier.len();
        let mut ply: i32 = 1;
        while !frontier.is_empty() {
            ply += 1;

            let mut candidates = HashSet::new();
            for &id in &frontier {
                candidates.extend(self.graph.parents(id).iter().copied());
            }

            // Assign after the scan so a level only sees shorter distances.
            let mut assigned = Vec::new();
            for id in candidates {
                self.stats.nodes_processed += 1;
                if self.distances[id].is_some() {
                    self.stats.skipped_candidates += 1;
                    continue;
                }
                match self.resolve(id, ply) {
                    Some(distance) => assigned.push((id, distance)),
                    None => self.stats.skipped_candidates += 1,
                }
            }

            frontier.clear();
            for (id, distance) in assigned {
                self.distances[id] = Some(distance);
                frontier.push(id);
            }
            resolved += frontier.len();
            if !frontier.is_empty() {
                self.stats.max_distance = ply as u64;
            }

            if self.stats.should_log(log_interval_secs) {
                self.stats.log_progress(resolved, frontier.len());
            }
        }

        for id in 0..self.graph.len() {
            let score = self.score(id);
            self.stats.record_score(score);
        }

        self.score(self.graph.root())
    }

    /// Distance of `id` at level `ply`, if it is decided by now.
    fn resolve(&self, id: NodeId, ply: i32) -> Option<i32> {
        let mover = sign(self.graph.turn(id));
        let children = self.graph.children(id);

        let mut all_resolved = true;
        for &child in children {
            match self.distances[child] {
                Some(distance) if distance.signum() == mover => return Some(mover * ply),
                Some(_) => {}
                None => all_resolved = false,
            }
        }

        if all_resolved && !children.is_empty() {
            Some(-mover * ply)
        } else {
            None
        }
    }

    /// Signed distance of `id`, or None for a draw (or before solving).
    pub fn distance(&self, id: NodeId) -> Option<i32> {
        self.distances[id]
    }

    pub fn score(&self, id: NodeId) -> f64 {
        score_from_distance(self.distances[id].unwrap_or(0))
    }

    pub fn score_of(&self, code: StateCode) -> Option<f64> {
        self.graph.id(code).map(|id| self.score(id))
    }

    /// Scores for every reachable state.
    pub fn table(&self) -> ScoreTable {
        (0..self.graph.len())
            .map(|id| (self.graph.code(id), self.score(id)))
            .collect()
    }
}

/// Check a score table against the game graph.
///
/// Returns the codes whose score is missing or does not follow from the
/// scores of their children.
pub fn verify_table(graph: &StateGraph, table: &ScoreTable) -> Vec<StateCode> {
    let distance_of = |id: NodeId| table.get(graph.code(id)).map(distance_from_score);

    let mut bad = Vec::new();
    for id in 0..graph.len() {
        let Some(distance) = distance_of(id) else {
            bad.push(graph.code(id));
            continue;
        };

        let children = graph.children(id);
        let ok = if children.is_empty() {
            match graph.winner(id) {
                Some(Player::X) => distance == X_WIN,
                Some(Player::O) => distance == O_WIN,
                None => false,
            }
        } else {
            let mover = sign(graph.turn(id));
            let child_distances: Option<Vec<i32>> =
                children.iter().map(|&child| distance_of(child)).collect();
            match child_distances {
                None => false,
                Some(child_distances) => expected(mover, &child_distances) == distance,
            }
        };

        if !ok {
            bad.push(graph.code(id));
        }
    }
    bad
}

/// Distance implied by the children's distances for `mover`.
fn expected(mover: i32, children: &[i32]) -> i32 {
    let fastest_win = children
        .iter()
        .filter(|d| d.signum() == mover)
        .map(|d| d.abs())
        .min();
    if let Some(win) = fastest_win {
        return mover * (win + 1);
    }
    if children.iter().all(|d| d.signum() == -mover) {
        let slowest_loss = children.iter().map(|d| d.abs()).max().unwrap_or(0);
        return -mover * (slowest_loss + 1);
    }
    0
}
