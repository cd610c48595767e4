//! State code: a decimal packing of both piece queues plus the turn.
//!
//! ```text
//! code = Σ (x[i] + 1) · 10^i        i in 0..3, oldest X piece in slot 0
//!      + Σ (o[i] + 1) · 10^(i + 3)  i in 0..3, oldest O piece in slot 3
//!      + 1,000,000 if X is to move
//! ```
//!
//! A zero digit is an empty slot. Piece order is part of the code because it
//! decides which piece is evicted next.

use crate::{Error, GameState, PieceQueue, Player, Pos, Result, StateCode, MAX_PIECES};

/// Added to the code when X is to move.
pub const TURN_FLAG: u32 = 1_000_000;

/// Every state code is below this.
pub const CODE_LIMIT: u32 = 2 * TURN_FLAG;

const X_FIRST_SLOT: usize = 0;
const O_FIRST_SLOT: usize = 3;
const SLOT_WEIGHTS: [u32; 6] = [1, 10, 100, 1_000, 10_000, 100_000];

/// Encode a state. History and winner are not part of the code.
pub fn encode(state: &GameState) -> StateCode {
    let mut code = encode_queue(state.x_moves(), X_FIRST_SLOT)
        + encode_queue(state.o_moves(), O_FIRST_SLOT);
    if state.turn() == Player::X {
        code += TURN_FLAG;
    }
    StateCode(code)
}

fn encode_queue(queue: &PieceQueue, first_slot: usize) -> u32 {
    queue
        .iter()
        .enumerate()
        .map(|(i, pos)| (pos.0 as u32 + 1) * SLOT_WEIGHTS[first_slot + i])
        .sum()
}

/// Decode a state code.
///
/// The winner is recomputed from the pieces and the history is empty; undo
/// reattaches the right history slice itself.
pub fn decode(code: StateCode) -> Result<GameState> {
    let raw = code.value();
    if raw >= CODE_LIMIT {
        return Err(Error::InvalidCode {
            code: raw,
            reason: "exceeds the largest state code",
        });
    }

    let turn = code.turn();
    let x_moves = decode_queue(raw, X_FIRST_SLOT)?;
    let o_moves = decode_queue(raw, O_FIRST_SLOT)?;
    if x_moves.mask() & o_moves.mask() != 0 {
        return Err(Error::InvalidCode {
            code: raw,
            reason: "a position is claimed by both players",
        });
    }

    Ok(GameState::from_parts(turn, x_moves, o_moves))
}

fn decode_queue(raw: u32, first_slot: usize) -> Result<PieceQueue> {
    let mut queue = PieceQueue::new();
    for weight in &SLOT_WEIGHTS[first_slot..first_slot + MAX_PIECES] {
        let digit = (raw / weight) % 10;
        if digit == 0 {
            continue;
        }
        let pos = Pos(digit as u8 - 1);
        if queue.contains(pos) {
            return Err(Error::InvalidCode {
                code: raw,
                reason: "a position repeats within one player's pieces",
            });
        }
        queue.push(pos);
    }
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(indices: &[u8]) -> Vec<Pos> {
        indices.iter().map(|&i| Pos(i)).collect()
    }

    #[test]
    fn test_initial_state_code() {
        assert_eq!(encode(&GameState::new()), StateCode(1_000_000));
    }

    #[test]
    fn test_encode_layout() {
        // X: 0, 4 (oldest first). O: 8. X to move.
        let state =
            GameState::from_moves(Player::X, &positions(&[0, 4]), &positions(&[8])).unwrap();
        assert_eq!(encode(&state), StateCode(1_000_000 + 9_000 + 50 + 1));

        let state = GameState::from_moves(
            Player::O,
            &positions(&[2, 3, 5]),
            &positions(&[0, 1]),
        )
        .unwrap();
        assert_eq!(encode(&state), StateCode(21_643));
    }

    #[test]
    fn test_order_is_part_of_code() {
        let a = GameState::from_moves(Player::O, &positions(&[0, 4]), &[]).unwrap();
        let b = GameState::from_moves(Player::O, &positions(&[4, 0]), &[]).unwrap();
        assert_ne!(encode(&a), encode(&b));
    }

    #[test]
    fn test_turn_flag() {
        let x = GameState::from_moves(Player::X, &positions(&[1]), &positions(&[2])).unwrap();
        let o = GameState::from_moves(Player::O, &positions(&[1]), &positions(&[2])).unwrap();
        assert_eq!(encode(&x).value() - encode(&o).value(), TURN_FLAG);
        assert_eq!(encode(&x).turn(), Player::X);
        assert_eq!(encode(&o).turn(), Player::O);
    }

    #[test]
    fn test_roundtrip() {
        let cases: [(Player, &[u8], &[u8]); 5] = [
            (Player::X, &[], &[]),
            (Player::O, &[4], &[]),
            (Player::X, &[8, 0], &[4]),
            (Player::O, &[2, 3, 5], &[0, 1]),
            (Player::X, &[8, 7, 6], &[0, 1, 2]),
        ];
        for (turn, x, o) in cases {
            let state = GameState::from_moves(turn, &positions(x), &positions(o)).unwrap();
            let decoded = decode(encode(&state)).unwrap();
            assert_eq!(decoded.x_moves().as_slice(), state.x_moves().as_slice());
            assert_eq!(decoded.o_moves().as_slice(), state.o_moves().as_slice());
            assert_eq!(decoded.turn(), turn);
            assert_eq!(decoded, state);
        }
    }

    #[test]
    fn test_decode_recomputes_winner() {
        // O to move, X holds the top row.
        let state = decode(StateCode(321)).unwrap();
        assert_eq!(state.x_moves().as_slice(), &positions(&[0, 1, 2])[..]);
        assert_eq!(state.winner(), Some(Player::X));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_decode_skips_empty_slots() {
        // Slot 0 empty, slot 1 holds position 4.
        let state = decode(StateCode(50)).unwrap();
        assert_eq!(state.x_moves().as_slice(), &positions(&[4])[..]);
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert!(matches!(
            decode(StateCode(CODE_LIMIT)),
            Err(Error::InvalidCode { code: 2_000_000, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_repeated_position() {
        assert!(matches!(
            decode(StateCode(11)),
            Err(Error::InvalidCode { code: 11, .. })
        ));
        // X and O both on position 0.
        assert!(matches!(
            decode(StateCode(1_001)),
            Err(Error::InvalidCode { code: 1_001, .. })
        ));
    }
}
