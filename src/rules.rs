//! Capture resolution and move legality.
//!
//! The replay engine only talks to rules through [`RuleEngine`]. Records are
//! replayed with [`RuleEngine::apply`], which resolves captures but never
//! refuses a move: a record may contain anything. Interactive play checks
//! [`RuleEngine::check_move`] first and must not commit a rejected move.
//!
//! [`CaptureRules`] is the standard implementation: flood-fill group and
//! liberty counting with simple ko, optionally positional superko.

use thiserror::Error;
use tracing::trace;

use crate::board::{Board, Stone, fingerprint_of};
use crate::coord::Point;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not on the board
    #[error("Error Illegal move: point off board")]
    OffBoard,
    /// Point is not empty
    #[error("Error Illegal move: point not EMPTY")]
    Occupied,
    /// Move would be suicide (no liberties after capture resolution)
    #[error("Error Illegal move: suicide")]
    Suicide,
    /// Move recreates an earlier position
    #[error("Error Illegal move: retakes ko")]
    Ko,
}

/// Rules consumed by the replay engine.
pub trait RuleEngine {
    /// Resolve the consequences of a stone of `color` that has already
    /// been placed on `pt`: remove captured groups and credit captures.
    fn apply(&self, board: &mut Board, pt: Point, color: Stone);

    /// Check whether `color` may play at `pt`. Checks run in order:
    /// occupancy, suicide after captures, repetition.
    fn check_move(&self, board: &Board, pt: Point, color: Stone) -> Result<(), MoveError>;

    fn check_legal(&self, board: &Board, pt: Point, color: Stone) -> bool {
        self.check_move(board, pt, color).is_ok()
    }
}

/// Standard capture rules with simple ko.
///
/// With `superko` set, a move is also rejected if it recreates any position
/// on the current path, not just the one immediately before.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureRules {
    pub superko: bool,
}

impl CaptureRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_superko(superko: bool) -> Self {
        Self { superko }
    }
}

impl RuleEngine for CaptureRules {
    fn apply(&self, board: &mut Board, pt: Point, color: Stone) {
        if !color.is_stone() {
            return;
        }
        let size = board.size();
        let mut stones = board.stones().to_vec();
        let outcome = resolve(&mut stones, size, pt, color);
        trace!(
            %pt,
            captured = outcome.captured,
            self_captured = outcome.self_captured,
            "rules apply"
        );
        board.set_stones(stones);
        board.add_captures(color, outcome.captured);
        board.add_captures(color.opponent(), outcome.self_captured);
    }

    fn check_move(&self, board: &Board, pt: Point, color: Stone) -> Result<(), MoveError> {
        let size = board.size();
        if !pt.is_on_board(size) || !color.is_stone() {
            return Err(MoveError::OffBoard);
        }
        if board.is_occupied(pt) {
            return Err(MoveError::Occupied);
        }

        let mut stones = board.stones().to_vec();
        stones[pt.offset(size)] = color;
        let outcome = resolve(&mut stones, size, pt, color);
        if outcome.self_captured > 0 {
            return Err(MoveError::Suicide);
        }

        let fingerprint = fingerprint_of(&stones);
        let repeated = if self.superko {
            board.check_state_repeated(&fingerprint)
        } else {
            board.previous_fingerprint() == Some(fingerprint.as_str())
        };
        if repeated {
            return Err(MoveError::Ko);
        }
        Ok(())
    }
}

// =============================================================================
// Group analysis
// =============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Resolution {
    captured: u32,
    self_captured: u32,
}

fn neighbors(size: usize, i: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (i % size, i / size);
    let mut v = [usize::MAX; 4];
    if x > 0 {
        v[0] = i - 1;
    }
    if x + 1 < size {
        v[1] = i + 1;
    }
    if y > 0 {
        v[2] = i - size;
    }
    if y + 1 < size {
        v[3] = i + size;
    }
    v.into_iter().filter(|&n| n != usize::MAX)
}

/// Remove dead groups around a stone of `color` on `pt`.
///
/// Adjacent opponent groups without liberties are removed first; if the
/// placed stone's own group is then without liberties it is removed too.
fn resolve(stones: &mut [Stone], size: usize, pt: Point, color: Stone) -> Resolution {
    let start = pt.offset(size);
    let opp = color.opponent();
    let mut out = Resolution::default();
    let mut to_remove = Vec::new();

    for n in neighbors(size, start) {
        if stones[n] == opp && !to_remove.contains(&n) && group_liberties(stones, size, n) == 0 {
            collect_group(stones, size, n, &mut to_remove);
        }
    }
    for &r in &to_remove {
        stones[r] = Stone::Empty;
    }
    out.captured = to_remove.len() as u32;

    if stones[start] == color && group_liberties(stones, size, start) == 0 {
        let mut own = Vec::new();
        collect_group(stones, size, start, &mut own);
        for &r in &own {
            stones[r] = Stone::Empty;
        }
        out.self_captured = own.len() as u32;
    }
    out
}

/// Collect all stones connected to `start` into `out`.
fn collect_group(stones: &[Stone], size: usize, start: usize, out: &mut Vec<usize>) {
    let color = stones[start];
    let mut stack = vec![start];
    let mut visited = vec![false; stones.len()];

    while let Some(i) = stack.pop() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        if stones[i] == color {
            out.push(i);
            for n in neighbors(size, i) {
                if !visited[n] && stones[n] == color {
                    stack.push(n);
                }
            }
        }
    }
}

/// Count the distinct empty points adjacent to the group at `start`.
fn group_liberties(stones: &[Stone], size: usize, start: usize) -> usize {
    let color = stones[start];
    if !color.is_stone() {
        return 0;
    }
    let mut stack = vec![start];
    let mut visited = vec![false; stones.len()];
    let mut liberty_seen = vec![false; stones.len()];
    let mut libs = 0;

    while let Some(i) = stack.pop() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        for n in neighbors(size, i) {
            match stones[n] {
                Stone::Empty => {
                    if !liberty_seen[n] {
                        liberty_seen[n] = true;
                        libs += 1;
                    }
                }
                c if c == color && !visited[n] => stack.push(n),
                _ => {}
            }
        }
    }
    libs
}
