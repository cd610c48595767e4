//! Three men's morris (FIFO variant) game logic.
//!
//! Two players alternate placing pieces on a 3x3 grid. Each player keeps at
//! most three pieces on the board: placing a fourth removes that player's
//! oldest piece. Three in a row wins. There is no draw state, pieces keep
//! recirculating until someone completes a line.
//!
//! # State Code (decimal, < 2,000,000)
//!
//! ```text
//! Digit 0-2: X pieces, oldest first (position + 1, 0 = empty slot)
//! Digit 3-5: O pieces, oldest first (same encoding)
//! +1,000,000 when X is to move
//! ```
//!
//! Cell indices (row-major order):
//! ```text
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```

pub mod ai;
pub mod codec;
pub mod error;
pub mod oracle;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::ai::{rank_moves, select_move, MoveScore};
pub use crate::error::{Error, Result};
pub use crate::oracle::{Oracle, ScoreTable};

/// Player identifier. X always moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Board symbol for this player.
    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position, rejecting anything outside the board.
    pub fn new(index: u8) -> Result<Pos> {
        let pos = Pos(index);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(Error::InvalidPosition { position: index })
        }
    }

    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < 9
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << self.0
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

/// Integer encoding of a state's pieces and turn. See [`codec`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(pub u32);

impl StateCode {
    /// Raw integer value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Player to move in the encoded state.
    #[inline]
    pub const fn turn(self) -> Player {
        if self.0 >= codec::TURN_FLAG {
            Player::X
        } else {
            Player::O
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// PIECE QUEUE - bounded FIFO of a player's pieces
// ============================================================================

/// Maximum pieces a player keeps on the board.
pub const MAX_PIECES: usize = 3;

/// A player's pieces in placement order, oldest first.
///
/// Capacity is fixed at [`MAX_PIECES`]; pushing onto a full queue evicts the
/// oldest piece, so a queue can never describe more than three pieces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceQueue {
    slots: [Pos; MAX_PIECES],
    len: u8,
}

impl PieceQueue {
    /// Create an empty queue.
    #[inline]
    pub const fn new() -> PieceQueue {
        PieceQueue {
            slots: [Pos(0); MAX_PIECES],
            len: 0,
        }
    }

    /// Build a queue from positions listed oldest first.
    ///
    /// Returns None for more than three positions, off-board positions or
    /// repeats.
    pub fn from_slice(positions: &[Pos]) -> Option<PieceQueue> {
        if positions.len() > MAX_PIECES {
            return None;
        }
        let mut queue = PieceQueue::new();
        for &pos in positions {
            if !pos.is_valid() || queue.contains(pos) {
                return None;
            }
            queue.push(pos);
        }
        Some(queue)
    }

    /// Append a piece. When the queue is already full the oldest piece is
    /// removed and returned.
    pub fn push(&mut self, pos: Pos) -> Option<Pos> {
        if self.is_full() {
            let evicted = self.slots[0];
            self.slots.rotate_left(1);
            self.slots[MAX_PIECES - 1] = pos;
            Some(evicted)
        } else {
            self.slots[self.len as usize] = pos;
            self.len += 1;
            None
        }
    }

    /// Number of pieces on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once the next push will evict.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == MAX_PIECES
    }

    /// The piece placed earliest, if any.
    #[inline]
    pub fn oldest(&self) -> Option<Pos> {
        self.as_slice().first().copied()
    }

    /// The piece placed most recently, if any.
    #[inline]
    pub fn newest(&self) -> Option<Pos> {
        self.as_slice().last().copied()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.as_slice().contains(&pos)
    }

    /// Pieces oldest first.
    #[inline]
    pub fn as_slice(&self) -> &[Pos] {
        &self.slots[..self.len()]
    }

    /// Iterate over pieces oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.as_slice().iter().copied()
    }

    /// Occupancy bitmask, bit i set if the queue holds position i.
    #[inline]
    pub fn mask(&self) -> u16 {
        self.iter().fold(0, |mask, pos| mask | pos.bit())
    }
}

impl fmt::Debug for PieceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|pos| pos.0)).finish()
    }
}

// ============================================================================
// WIN DETECTION
// ============================================================================

/// The 8 winning lines.
pub const WIN_LINES: [[Pos; 3]; 8] = [
    [Pos(0), Pos(1), Pos(2)], // Row 0
    [Pos(3), Pos(4), Pos(5)], // Row 1
    [Pos(6), Pos(7), Pos(8)], // Row 2
    [Pos(0), Pos(3), Pos(6)], // Col 0
    [Pos(1), Pos(4), Pos(7)], // Col 1
    [Pos(2), Pos(5), Pos(8)], // Col 2
    [Pos(0), Pos(4), Pos(8)], // Main diagonal
    [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
];

/// Bitmasks for the winning lines, same order as [`WIN_LINES`].
const WIN_MASKS: [u16; 8] = [
    0b000_000_111,
    0b000_111_000,
    0b111_000_000,
    0b001_001_001,
    0b010_010_010,
    0b100_100_100,
    0b100_010_001,
    0b001_010_100,
];

/// The line a player's pieces form, if they form one.
///
/// This is set equality: the queue must hold exactly the three cells of the
/// line, in any order.
pub fn winning_line(queue: &PieceQueue) -> Option<[Pos; 3]> {
    let mask = queue.mask();
    WIN_MASKS
        .iter()
        .position(|&line| line == mask)
        .map(|i| WIN_LINES[i])
}

/// Check if either player has won. X is checked first.
pub fn check_winner(x_moves: &PieceQueue, o_moves: &PieceQueue) -> Option<Player> {
    if winning_line(x_moves).is_some() {
        Some(Player::X)
    } else if winning_line(o_moves).is_some() {
        Some(Player::O)
    } else {
        None
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// A state transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    /// Place the current player's piece.
    Place(Pos),
    /// Roll back this many moves.
    Undo(usize),
    /// Start a fresh game.
    Reset,
}

/// Full game state: pieces, turn, winner and undo history.
///
/// States are values. Every transition returns a new state and leaves the
/// receiver untouched.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameState {
    turn: Player,
    x_moves: PieceQueue,
    o_moves: PieceQueue,
    winner: Option<Player>,
    history: Vec<StateCode>,
}

impl GameState {
    /// Empty board, X to move.
    pub fn new() -> GameState {
        GameState::from_parts(Player::X, PieceQueue::new(), PieceQueue::new())
    }

    /// Build a state from both players' pieces (oldest first).
    pub fn from_moves(turn: Player, x_moves: &[Pos], o_moves: &[Pos]) -> Result<GameState> {
        let x = Self::queue_from(Player::X, x_moves)?;
        let o = Self::queue_from(Player::O, o_moves)?;
        if let Some(pos) = o.iter().find(|&pos| x.contains(pos)) {
            return Err(Error::Occupied { position: pos.0 });
        }
        Ok(GameState::from_parts(turn, x, o))
    }

    fn queue_from(player: Player, positions: &[Pos]) -> Result<PieceQueue> {
        if positions.len() > MAX_PIECES {
            return Err(Error::TooManyPieces {
                player,
                count: positions.len(),
            });
        }
        let mut queue = PieceQueue::new();
        for &pos in positions {
            let pos = Pos::new(pos.0)?;
            if queue.contains(pos) {
                return Err(Error::Occupied { position: pos.0 });
            }
            queue.push(pos);
        }
        Ok(queue)
    }

    /// Assemble a state with a freshly computed winner and no history.
    pub(crate) fn from_parts(turn: Player, x_moves: PieceQueue, o_moves: PieceQueue) -> GameState {
        GameState {
            turn,
            x_moves,
            o_moves,
            winner: check_winner(&x_moves, &o_moves),
            history: Vec::new(),
        }
    }

    /// Player to move.
    #[inline]
    pub fn turn(&self) -> Player {
        self.turn
    }

    #[inline]
    pub fn x_moves(&self) -> &PieceQueue {
        &self.x_moves
    }

    #[inline]
    pub fn o_moves(&self) -> &PieceQueue {
        &self.o_moves
    }

    /// Pieces of the given player, oldest first.
    #[inline]
    pub fn moves(&self, player: Player) -> &PieceQueue {
        match player {
            Player::X => &self.x_moves,
            Player::O => &self.o_moves,
        }
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Encoded ancestors, oldest first.
    #[inline]
    pub fn history(&self) -> &[StateCode] {
        &self.history
    }

    /// Whether `offset` moves can be rolled back.
    #[inline]
    pub fn can_undo(&self, offset: usize) -> bool {
        offset >= 1 && offset <= self.history.len()
    }

    /// Who owns the piece at `pos`.
    pub fn occupant(&self, pos: Pos) -> Option<Player> {
        if self.x_moves.contains(pos) {
            Some(Player::X)
        } else if self.o_moves.contains(pos) {
            Some(Player::O)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_occupied(&self, pos: Pos) -> bool {
        pos.is_valid() && (self.x_moves.mask() | self.o_moves.mask()) & pos.bit() != 0
    }

    /// Iterate over empty positions in ascending order.
    pub fn empty_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let occupied = self.x_moves.mask() | self.o_moves.mask();
        Pos::all().filter(move |pos| occupied & pos.bit() == 0)
    }

    /// The piece `player` loses on their next placement, if their queue is full.
    pub fn piece_to_evict(&self, player: Player) -> Option<Pos> {
        let queue = self.moves(player);
        if queue.is_full() {
            queue.oldest()
        } else {
            None
        }
    }

    /// The winner's line, if the game is over.
    pub fn winning_line(&self) -> Option<[Pos; 3]> {
        self.winner.and_then(|player| winning_line(self.moves(player)))
    }

    /// Encode this state (history is not part of the code).
    #[inline]
    pub fn encode(&self) -> StateCode {
        codec::encode(self)
    }

    /// Decode a state code. The result has an empty history.
    #[inline]
    pub fn decode(code: StateCode) -> Result<GameState> {
        codec::decode(code)
    }

    // ========== Transitions ==========

    /// Place the current player's piece at `pos`.
    ///
    /// The mover's oldest piece is removed if they already have three, the
    /// turn passes, the winner is recomputed and the pre-move code is
    /// appended to the history.
    pub fn play(&self, pos: Pos) -> Result<GameState> {
        if let Some(winner) = self.winner {
            return Err(Error::GameOver { winner });
        }
        let mut next = self.successor(pos)?;
        next.history = Vec::with_capacity(self.history.len() + 1);
        next.history.extend_from_slice(&self.history);
        next.history.push(self.encode());
        Ok(next)
    }

    /// The state after placing at `pos`, without history bookkeeping.
    pub(crate) fn successor(&self, pos: Pos) -> Result<GameState> {
        let pos = Pos::new(pos.0)?;
        if self.is_occupied(pos) {
            return Err(Error::Occupied { position: pos.0 });
        }
        let mut x_moves = self.x_moves;
        let mut o_moves = self.o_moves;
        match self.turn {
            Player::X => x_moves.push(pos),
            Player::O => o_moves.push(pos),
        };
        Ok(GameState::from_parts(self.turn.opponent(), x_moves, o_moves))
    }

    /// Roll back `offset` moves.
    ///
    /// The ancestor is decoded from the history and keeps the history that
    /// preceded it, so repeated undos keep working.
    pub fn undo(&self, offset: usize) -> Result<GameState> {
        let available = self.history.len();
        if !self.can_undo(offset) {
            return Err(Error::InvalidUndo { offset, available });
        }
        let end = available - offset + 1;
        let mut ancestor = codec::decode(self.history[end - 1])?;
        ancestor.history = self.history[..end - 1].to_vec();
        Ok(ancestor)
    }

    /// Start over.
    pub fn reset() -> GameState {
        GameState::new()
    }

    /// Apply an action.
    pub fn apply(&self, action: Action) -> Result<GameState> {
        match action {
            Action::Place(pos) => self.play(pos),
            Action::Undo(offset) => self.undo(offset),
            Action::Reset => Ok(GameState::reset()),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    /// Text board. A piece that disappears on its owner's next placement is
    /// lower case.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => writeln!(f, " * {} has won", winner.symbol())?,
            None => writeln!(f, " * Turn of \"{}\"", self.turn.symbol())?,
        }
        for row in 0..3 {
            let cells: Vec<String> = (0..3)
                .map(|col| {
                    let pos = Pos::from_row_col(row, col);
                    let symbol = match self.occupant(pos) {
                        None => ' ',
                        Some(player) if self.piece_to_evict(player) == Some(pos) => {
                            player.symbol().to_ascii_lowercase()
                        }
                        Some(player) => player.symbol(),
                    };
                    symbol.to_string()
                })
                .collect();
            write!(f, " {}", cells.join(" | "))?;
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(indices: &[u8]) -> Vec<Pos> {
        indices.iter().map(|&i| Pos(i)).collect()
    }

    fn play_all(indices: &[u8]) -> GameState {
        indices
            .iter()
            .fold(GameState::new(), |state, &i| state.play(Pos(i)).unwrap())
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
    }

    #[test]
    fn test_pos_from_row_col() {
        assert_eq!(Pos::from_row_col(0, 0), Pos(0));
        assert_eq!(Pos::from_row_col(0, 2), Pos(2));
        assert_eq!(Pos::from_row_col(1, 1), Pos(4));
        assert_eq!(Pos::from_row_col(2, 2), Pos(8));
    }

    #[test]
    fn test_pos_row_col() {
        for i in 0..9 {
            let pos = Pos(i);
            assert_eq!(Pos::from_row_col(pos.row(), pos.col()), pos);
        }
    }

    #[test]
    fn test_pos_new_rejects_off_board() {
        assert_eq!(Pos::new(8).unwrap(), Pos(8));
        assert!(matches!(Pos::new(9), Err(Error::InvalidPosition { position: 9 })));
    }

    #[test]
    fn test_queue_push_until_full() {
        let mut queue = PieceQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.push(Pos(4)), None);
        assert_eq!(queue.push(Pos(0)), None);
        assert!(!queue.is_full());
        assert_eq!(queue.push(Pos(8)), None);
        assert!(queue.is_full());
        assert_eq!(queue.as_slice(), &positions(&[4, 0, 8])[..]);
        assert_eq!(queue.oldest(), Some(Pos(4)));
        assert_eq!(queue.newest(), Some(Pos(8)));
    }

    #[test]
    fn test_queue_evicts_oldest() {
        let mut queue = PieceQueue::from_slice(&positions(&[1, 2, 3])).unwrap();
        assert_eq!(queue.push(Pos(7)), Some(Pos(1)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.as_slice(), &positions(&[2, 3, 7])[..]);
        assert_eq!(queue.push(Pos(1)), Some(Pos(2)));
        assert_eq!(queue.as_slice(), &positions(&[3, 7, 1])[..]);
    }

    #[test]
    fn test_queue_from_slice_rejects_bad_input() {
        assert!(PieceQueue::from_slice(&positions(&[0, 1, 2, 3])).is_none());
        assert!(PieceQueue::from_slice(&positions(&[0, 0])).is_none());
        assert!(PieceQueue::from_slice(&positions(&[9])).is_none());
    }

    #[test]
    fn test_queue_mask() {
        let queue = PieceQueue::from_slice(&positions(&[0, 4, 8])).unwrap();
        assert_eq!(queue.mask(), 0b100_010_001);
        assert_eq!(PieceQueue::new().mask(), 0);
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new();
        assert_eq!(state.turn(), Player::X);
        assert!(state.x_moves().is_empty());
        assert!(state.o_moves().is_empty());
        assert_eq!(state.winner(), None);
        assert!(state.history().is_empty());
        assert_eq!(state.empty_positions().count(), 9);
    }

    #[test]
    fn test_play_alternates_turn() {
        let mut state = GameState::new();
        for (i, &pos) in [0u8, 4, 8, 2, 6, 3].iter().enumerate() {
            let before = state.turn();
            state = state.play(Pos(pos)).unwrap();
            assert_eq!(state.turn(), before.opponent());
            assert_eq!(state.history().len(), i + 1);
        }
    }

    #[test]
    fn test_play_records_pre_move_code() {
        let first = GameState::new();
        let second = first.play(Pos(4)).unwrap();
        let third = second.play(Pos(0)).unwrap();
        assert_eq!(third.history(), &[first.encode(), second.encode()]);
        // The receiver is left untouched.
        assert!(first.history().is_empty());
        assert_eq!(second.history().len(), 1);
    }

    #[test]
    fn test_fourth_piece_evicts_oldest() {
        // X: 0, 1, 5 then 6. O: 3, 4, 8.
        let state = play_all(&[0, 3, 1, 4, 5, 8]);
        assert_eq!(state.x_moves().as_slice(), &positions(&[0, 1, 5])[..]);
        assert_eq!(state.piece_to_evict(Player::X), Some(Pos(0)));

        let state = state.play(Pos(6)).unwrap();
        assert_eq!(state.x_moves().as_slice(), &positions(&[1, 5, 6])[..]);
        assert!(!state.is_occupied(Pos(0)));
        assert_eq!(state.o_moves().as_slice(), &positions(&[3, 4, 8])[..]);
    }

    #[test]
    fn test_evicted_square_is_playable_again() {
        let state = play_all(&[0, 3, 1, 4, 5, 8, 6]);
        // O's oldest (3) goes when O plays 0, which X just vacated.
        let state = state.play(Pos(0)).unwrap();
        assert_eq!(state.o_moves().as_slice(), &positions(&[4, 8, 0])[..]);
        assert_eq!(state.occupant(Pos(3)), None);
        assert_eq!(state.winner(), Some(Player::O));
    }

    #[test]
    fn test_play_occupied_fails() {
        let state = play_all(&[4]);
        assert!(matches!(
            state.play(Pos(4)),
            Err(Error::Occupied { position: 4 })
        ));
    }

    #[test]
    fn test_play_off_board_fails() {
        assert!(matches!(
            GameState::new().play(Pos(9)),
            Err(Error::InvalidPosition { position: 9 })
        ));
    }

    #[test]
    fn test_play_after_win_fails() {
        // X completes the top row.
        let state = play_all(&[0, 3, 1, 4, 2]);
        assert_eq!(state.winner(), Some(Player::X));
        assert!(state.is_over());
        assert!(matches!(
            state.play(Pos(8)),
            Err(Error::GameOver { winner: Player::X })
        ));
    }

    #[test]
    fn test_no_winner_with_two_pieces() {
        for line in WIN_LINES {
            let queue = PieceQueue::from_slice(&line[..2]).unwrap();
            assert_eq!(check_winner(&queue, &PieceQueue::new()), None);
            assert_eq!(check_winner(&PieceQueue::new(), &queue), None);
        }
    }

    #[test]
    fn test_horizontal_win() {
        let x = PieceQueue::from_slice(&positions(&[2, 0, 1])).unwrap();
        let o = PieceQueue::from_slice(&positions(&[3, 4, 8])).unwrap();
        assert_eq!(check_winner(&x, &o), Some(Player::X));
    }

    #[test]
    fn test_vertical_win() {
        let x = PieceQueue::from_slice(&positions(&[0, 4])).unwrap();
        let o = PieceQueue::from_slice(&positions(&[7, 1, 5])).unwrap();
        assert_eq!(check_winner(&x, &o), None);
        let o = PieceQueue::from_slice(&positions(&[7, 1, 3])).unwrap();
        assert_eq!(check_winner(&x, &o), None);
        let x = PieceQueue::from_slice(&positions(&[0, 2])).unwrap();
        let o = PieceQueue::from_slice(&positions(&[7, 1, 4])).unwrap();
        assert_eq!(check_winner(&x, &o), Some(Player::O));
    }

    #[test]
    fn test_diagonal_win() {
        let x = PieceQueue::from_slice(&positions(&[0, 4, 8])).unwrap();
        assert_eq!(check_winner(&x, &PieceQueue::new()), Some(Player::X));
    }

    #[test]
    fn test_anti_diagonal_win() {
        let o = PieceQueue::from_slice(&positions(&[6, 2, 4])).unwrap();
        assert_eq!(check_winner(&PieceQueue::new(), &o), Some(Player::O));
    }

    #[test]
    fn test_all_winning_lines() {
        for line in WIN_LINES {
            let x = PieceQueue::from_slice(&line).unwrap();
            assert_eq!(winning_line(&x), Some(line));
            assert_eq!(check_winner(&x, &PieceQueue::new()), Some(Player::X));
        }
    }

    #[test]
    fn test_three_pieces_off_line_no_win() {
        let x = PieceQueue::from_slice(&positions(&[0, 1, 5])).unwrap();
        assert_eq!(winning_line(&x), None);
    }

    #[test]
    fn test_simultaneous_lines_resolve_to_x() {
        let state = GameState::from_moves(
            Player::X,
            &positions(&[0, 1, 2]),
            &positions(&[6, 7, 8]),
        )
        .unwrap();
        assert_eq!(state.winner(), Some(Player::X));
    }

    #[test]
    fn test_winning_line_of_state() {
        let state = play_all(&[0, 1, 4, 2, 8]);
        assert_eq!(state.winner(), Some(Player::X));
        assert_eq!(state.winning_line(), Some([Pos(0), Pos(4), Pos(8)]));
        assert_eq!(GameState::new().winning_line(), None);
    }

    #[test]
    fn test_from_moves_validation() {
        assert!(matches!(
            GameState::from_moves(Player::X, &positions(&[0, 1, 2, 3]), &[]),
            Err(Error::TooManyPieces { player: Player::X, count: 4 })
        ));
        assert!(matches!(
            GameState::from_moves(Player::X, &positions(&[0]), &positions(&[0])),
            Err(Error::Occupied { position: 0 })
        ));
        assert!(matches!(
            GameState::from_moves(Player::O, &[], &positions(&[11])),
            Err(Error::InvalidPosition { position: 11 })
        ));
    }

    #[test]
    fn test_undo_one_move() {
        let after_two = play_all(&[4, 0]);
        let after_three = after_two.play(Pos(8)).unwrap();
        let undone = after_three.undo(1).unwrap();
        assert_eq!(undone, after_two);
        assert_eq!(undone.history().len(), 2);
    }

    #[test]
    fn test_undo_to_start() {
        let state = play_all(&[4, 0, 8]);
        assert_eq!(state.undo(3).unwrap(), GameState::new());
    }

    #[test]
    fn test_undo_two_moves() {
        let after_one = play_all(&[4]);
        let state = after_one.play(Pos(0)).unwrap().play(Pos(8)).unwrap();
        assert_eq!(state.undo(2).unwrap(), after_one);
    }

    #[test]
    fn test_undo_invalid_offset() {
        let state = play_all(&[4, 0, 8]);
        assert!(matches!(
            state.undo(4),
            Err(Error::InvalidUndo { offset: 4, available: 3 })
        ));
        assert!(matches!(
            state.undo(0),
            Err(Error::InvalidUndo { offset: 0, available: 3 })
        ));
        assert!(GameState::new().undo(1).is_err());
    }

    #[test]
    fn test_undo_restores_eviction() {
        let before = play_all(&[0, 3, 1, 4, 5, 8]);
        let after = before.play(Pos(6)).unwrap();
        assert_eq!(after.undo(1).unwrap(), before);
    }

    #[test]
    fn test_undo_from_won_state() {
        let before = play_all(&[0, 3, 1, 4]);
        let won = before.play(Pos(2)).unwrap();
        assert!(won.is_over());
        let undone = won.undo(1).unwrap();
        assert_eq!(undone, before);
        assert!(!undone.is_over());
    }

    #[test]
    fn test_repeated_undo() {
        let mut state = play_all(&[4, 0, 8, 2, 6]);
        while !state.history().is_empty() {
            let len = state.history().len();
            state = state.undo(1).unwrap();
            assert_eq!(state.history().len(), len - 1);
        }
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_apply_actions() {
        let state = GameState::new();
        let placed = state.apply(Action::Place(Pos(4))).unwrap();
        assert_eq!(placed, state.play(Pos(4)).unwrap());
        let undone = placed.apply(Action::Undo(1)).unwrap();
        assert_eq!(undone, state);
        let reset = placed.apply(Action::Reset).unwrap();
        assert_eq!(reset, GameState::new());
        assert!(state.apply(Action::Undo(1)).is_err());
    }

    #[test]
    fn test_piece_to_evict() {
        let state = play_all(&[0, 3, 1, 4]);
        assert_eq!(state.piece_to_evict(Player::X), None);
        let state = state.play(Pos(5)).unwrap();
        assert_eq!(state.piece_to_evict(Player::X), Some(Pos(0)));
        assert_eq!(state.piece_to_evict(Player::O), None);
    }

    #[test]
    fn test_display() {
        let state = play_all(&[0, 3, 1, 4, 5]);
        let text = state.to_string();
        assert_eq!(
            text,
            " * Turn of \"O\"\n x | X |  \n O | O | X\n   |   |  "
        );
    }

    #[test]
    fn test_display_winner() {
        let state = play_all(&[0, 3, 1, 4, 2]);
        assert!(state.to_string().starts_with(" * X has won"));
    }

    #[test]
    fn test_play_undo_fuzz() {
        use rand::prelude::*;

        let mut rng = rand::rng();

        for _ in 0..100 {
            let mut state = GameState::new();

            // Play random moves
            for _ in 0..12 {
                if state.is_over() {
                    break;
                }
                let moves: Vec<Pos> = state.empty_positions().collect();
                let pos = moves[rng.random_range(0..moves.len())];
                state = state.play(pos).unwrap();
            }

            // Undo one move and replay it
            if let Some(&last_code) = state.history().last() {
                let parent = state.undo(1).unwrap();
                assert_eq!(parent.encode(), last_code);
                let pos = state.moves(parent.turn()).newest().unwrap();
                assert_eq!(parent.play(pos).unwrap(), state);
            }
        }
    }
}
