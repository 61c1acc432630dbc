//! Board state with a snapshot history for replay.
//!
//! The board keeps a row-major stone grid, a sparse marker overlay, and
//! per-color capture counts. Every committed replay step pushes a
//! [`HistoryFrame`], so the history mirrors the path from the game root to
//! the cursor: stepping back is a pop and restore, stepping forward is a
//! property dispatch followed by [`Board::commit`].
//!
//! Repetition checks compare fingerprints against that history only, never
//! against positions from other variations.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::coord::Point;
use crate::render::Renderer;

/// Contents of a single board point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// The other player's color. `Empty` stays `Empty`.
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    #[inline]
    pub fn is_stone(self) -> bool {
        self != Stone::Empty
    }

    /// Property code for a move of this color ("B" or "W").
    pub fn move_code(self) -> Option<&'static str> {
        match self {
            Stone::Black => Some("B"),
            Stone::White => Some("W"),
            Stone::Empty => None,
        }
    }

    /// Lowercase name used in marker names and rendering ("black", "white").
    pub fn name(self) -> &'static str {
        match self {
            Stone::Black => "black",
            Stone::White => "white",
            Stone::Empty => "empty",
        }
    }
}

/// Stones captured by each color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    /// Stones captured by `color`.
    pub fn by(&self, color: Stone) -> u32 {
        match color {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => 0,
        }
    }

    /// Credit `count` captured stones to `color`.
    pub fn add(&mut self, color: Stone, count: u32) {
        match color {
            Stone::Black => self.black += count,
            Stone::White => self.white += count,
            Stone::Empty => {}
        }
    }
}

/// Kind of marker drawn on a point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Triangle,
    Square,
    Circle,
    Ex,
    TerritoryWhite,
    TerritoryBlack,
    Dim,
    /// The move just played.
    Current,
    /// Line to the secondary point.
    Line,
    /// Arrow to the secondary point.
    Arrow,
    /// Text label.
    Label(String),
    /// An alternative continuation of the given color at this point.
    Sibling(Stone),
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Triangle => f.write_str("triangle"),
            MarkerKind::Square => f.write_str("square"),
            MarkerKind::Circle => f.write_str("circle"),
            MarkerKind::Ex => f.write_str("ex"),
            MarkerKind::TerritoryWhite => f.write_str("territory-white"),
            MarkerKind::TerritoryBlack => f.write_str("territory-black"),
            MarkerKind::Dim => f.write_str("dim"),
            MarkerKind::Current => f.write_str("current"),
            MarkerKind::Line => f.write_str("line"),
            MarkerKind::Arrow => f.write_str("arrow"),
            MarkerKind::Label(text) => write!(f, "label:{text}"),
            MarkerKind::Sibling(Stone::White) => f.write_str("s-stone-w"),
            MarkerKind::Sibling(_) => f.write_str("s-stone-b"),
        }
    }
}

/// A marker on the overlay. Lines and arrows carry their far end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub secondary: Option<Point>,
}

/// Immutable snapshot pushed by [`Board::commit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryFrame {
    pub stones: Vec<Stone>,
    pub fingerprint: String,
    pub captures: Captures,
}

/// Canonical text encoding of a stone grid.
///
/// Every occupied point contributes its row-major offset, negated for White,
/// in offset order, joined by commas. A White stone on offset 0 is written
/// `-0`, which keeps it distinct from a Black stone there. The empty board
/// encodes as the empty string.
pub fn fingerprint_of(stones: &[Stone]) -> String {
    let mut out = String::new();
    for (offset, stone) in stones.iter().enumerate() {
        let sign = match stone {
            Stone::Empty => continue,
            Stone::Black => "",
            Stone::White => "-",
        };
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(sign);
        out.push_str(&offset.to_string());
    }
    out
}

/// A square Go board with markers, capture counts, and replay history.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    stones: Vec<Stone>,
    markers: BTreeMap<usize, Marker>,
    captures: Captures,
    history: Vec<HistoryFrame>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            stones: vec![Stone::Empty; size * size],
            markers: BTreeMap::new(),
            captures: Captures::default(),
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn idx(&self, pt: Point) -> usize {
        pt.offset(self.size)
    }

    /// Drop all state, including history.
    pub fn reset(&mut self) {
        debug!(size = self.size, "board reset");
        *self = Board::new(self.size);
    }

    /// Clear stones, markers, and captures. History is kept.
    pub fn clear(&mut self) {
        debug!("board clear");
        self.clear_stones();
        self.clear_markers();
        self.clear_captures();
    }

    pub fn clear_stones(&mut self) {
        self.stones.fill(Stone::Empty);
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    pub fn clear_captures(&mut self) {
        self.captures = Captures::default();
    }

    // -------------------------------------------------------------------------
    // Stones
    // -------------------------------------------------------------------------

    /// Put `color` on `pt`, replacing whatever was there. `Stone::Empty`
    /// clears the point.
    pub fn add_stone(&mut self, pt: Point, color: Stone) {
        let i = self.idx(pt);
        self.stones[i] = color;
    }

    pub fn stone(&self, pt: Point) -> Stone {
        self.stones[self.idx(pt)]
    }

    pub fn is_occupied(&self, pt: Point) -> bool {
        self.stone(pt).is_stone()
    }

    pub fn is_free(&self, pt: Point) -> bool {
        !self.is_occupied(pt)
    }

    /// The raw row-major grid.
    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    /// Replace the whole grid. The length must stay `size * size`.
    pub(crate) fn set_stones(&mut self, stones: Vec<Stone>) {
        debug_assert_eq!(stones.len(), self.size * self.size);
        self.stones = stones;
    }

    /// Stones in a `width` x `height` rectangle, row-major, starting at
    /// (`left`, `top`).
    pub fn region(&self, top: usize, left: usize, width: usize, height: usize) -> Vec<Stone> {
        let mut region = Vec::with_capacity(width * height);
        for y in top..top + height {
            for x in left..left + width {
                region.push(self.stone(Point::new(x, y)));
            }
        }
        region
    }

    /// Every stone on the board with its point, in row-major order.
    pub fn stone_points(&self) -> Vec<(Stone, Point)> {
        self.stones
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_stone())
            .map(|(i, &s)| (s, Point::from_offset(i, self.size)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Markers and captures
    // -------------------------------------------------------------------------

    pub fn add_marker(&mut self, pt: Point, kind: MarkerKind, secondary: Option<Point>) {
        let i = self.idx(pt);
        self.markers.insert(i, Marker { kind, secondary });
    }

    pub fn marker(&self, pt: Point) -> Option<&Marker> {
        self.markers.get(&self.idx(pt))
    }

    /// All markers with their points, in row-major order.
    pub fn markers(&self) -> impl Iterator<Item = (Point, &Marker)> {
        let size = self.size;
        self.markers
            .iter()
            .map(move |(&i, m)| (Point::from_offset(i, size), m))
    }

    pub fn captures(&self) -> Captures {
        self.captures
    }

    pub fn add_captures(&mut self, color: Stone, count: u32) {
        self.captures.add(color, count);
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.stones)
    }

    /// Save the current stones, fingerprint, and captures as a new frame.
    pub fn commit(&mut self) {
        let frame = HistoryFrame {
            stones: self.stones.clone(),
            fingerprint: self.fingerprint(),
            captures: self.captures,
        };
        self.history.push(frame);
        debug!(frames = self.history.len(), "board commit");
    }

    /// Undo uncommitted changes by restoring the newest frame. With no
    /// history the board is cleared instead.
    pub fn rollback(&mut self) {
        debug!(frames = self.history.len(), "board rollback");
        match self.history.last() {
            Some(last) => {
                self.stones.clone_from(&last.stones);
                self.captures = last.captures;
            }
            None => self.clear(),
        }
    }

    /// Drop `steps` frames and restore the one that is then on top.
    pub fn revert(&mut self, steps: usize) {
        debug!(steps, frames = self.history.len(), "board revert");
        let keep = self.history.len().saturating_sub(steps);
        self.history.truncate(keep);
        self.rollback();
    }

    /// Whether any frame on the current path has this fingerprint.
    pub fn check_state_repeated(&self, fingerprint: &str) -> bool {
        self.history.iter().any(|f| f.fingerprint == fingerprint)
    }

    /// Fingerprint of the position one step before the newest frame.
    pub fn previous_fingerprint(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .nth(1)
            .map(|f| f.fingerprint.as_str())
    }

    pub fn history(&self) -> &[HistoryFrame] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Repaint the whole board. Markers are drawn before the stone on the
    /// same point.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.start_redraw();
        for (offset, &stone) in self.stones.iter().enumerate() {
            let pt = Point::from_offset(offset, self.size);
            let color = stone.is_stone().then_some(stone);
            if let Some(marker) = self.markers.get(&offset) {
                renderer.draw_marker(pt.x, pt.y, &marker.kind, color, marker.secondary);
            }
            if let Some(color) = color {
                renderer.draw_stone(pt.x, pt.y, color);
            }
        }
        renderer.finish_redraw();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.stone(Point::new(x, y)) {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    Stone::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(19);
        assert_eq!(board.stones().len(), 361);
        assert!(board.stones().iter().all(|&s| s == Stone::Empty));
        assert_eq!(board.fingerprint(), "");
        assert_eq!(board.history_len(), 0);
    }

    #[test]
    fn test_fingerprint_single_black() {
        let mut board = Board::new(19);
        board.add_stone(Point::new(3, 3), Stone::Black);
        board.commit();
        assert_eq!(board.history()[0].fingerprint, "60");
    }

    #[test]
    fn test_fingerprint_white_at_origin_is_negative_zero() {
        let mut white = Board::new(19);
        white.add_stone(Point::new(0, 0), Stone::White);
        white.commit();

        let mut black = Board::new(19);
        black.add_stone(Point::new(0, 0), Stone::Black);
        black.commit();

        assert_eq!(white.history()[0].fingerprint, "-0");
        assert_eq!(black.history()[0].fingerprint, "0");
        assert_ne!(white.history()[0].fingerprint, black.history()[0].fingerprint);
    }

    #[test]
    fn test_fingerprint_is_row_major() {
        let mut board = Board::new(9);
        board.add_stone(Point::new(0, 1), Stone::White);
        board.add_stone(Point::new(1, 0), Stone::Black);
        assert_eq!(board.fingerprint(), "1,-9");
    }

    #[test]
    fn test_commit_then_rollback_is_noop() {
        let mut board = Board::new(9);
        board.add_stone(Point::new(2, 2), Stone::Black);
        board.add_captures(Stone::White, 3);
        board.commit();
        let before = board.stones().to_vec();
        board.rollback();
        assert_eq!(board.stones(), &before[..]);
        assert_eq!(board.captures().white, 3);
    }

    #[test]
    fn test_rollback_discards_uncommitted() {
        let mut board = Board::new(9);
        board.add_stone(Point::new(2, 2), Stone::Black);
        board.commit();
        board.add_stone(Point::new(4, 4), Stone::White);
        board.rollback();
        assert_eq!(board.stone(Point::new(4, 4)), Stone::Empty);
        assert_eq!(board.stone(Point::new(2, 2)), Stone::Black);
    }

    #[test]
    fn test_revert_restores_previous_frame() {
        let mut board = Board::new(9);
        board.add_stone(Point::new(0, 0), Stone::Black);
        board.commit();
        board.add_stone(Point::new(1, 1), Stone::White);
        board.add_captures(Stone::White, 2);
        board.commit();

        board.revert(1);
        assert_eq!(board.history_len(), 1);
        assert_eq!(board.stone(Point::new(1, 1)), Stone::Empty);
        assert_eq!(board.stone(Point::new(0, 0)), Stone::Black);
        assert_eq!(board.captures(), Captures::default());
    }

    #[test]
    fn test_revert_on_empty_history_clears() {
        let mut board = Board::new(9);
        board.add_stone(Point::new(0, 0), Stone::Black);
        board.add_marker(Point::new(1, 1), MarkerKind::Circle, None);
        board.revert(1);
        assert_eq!(board.fingerprint(), "");
        assert!(board.marker(Point::new(1, 1)).is_none());
    }

    #[test]
    fn test_check_state_repeated() {
        let mut board = Board::new(9);
        board.commit();
        board.add_stone(Point::new(4, 4), Stone::Black);
        board.commit();
        assert!(board.check_state_repeated(""));
        assert!(board.check_state_repeated("40"));
        assert!(!board.check_state_repeated("-40"));
        assert_eq!(board.previous_fingerprint(), Some(""));
    }

    #[test]
    fn test_markers_overlay() {
        let mut board = Board::new(9);
        board.add_marker(Point::new(0, 0), MarkerKind::Line, Some(Point::new(3, 3)));
        board.add_marker(Point::new(2, 0), MarkerKind::Triangle, None);
        let markers: Vec<_> = board.markers().map(|(p, m)| (p, m.kind.clone())).collect();
        assert_eq!(
            markers,
            vec![
                (Point::new(0, 0), MarkerKind::Line),
                (Point::new(2, 0), MarkerKind::Triangle)
            ]
        );
        assert_eq!(
            board.marker(Point::new(0, 0)).and_then(|m| m.secondary),
            Some(Point::new(3, 3))
        );
        board.clear_markers();
        assert_eq!(board.markers().count(), 0);
    }

    #[test]
    fn test_region_and_stone_points() {
        let mut board = Board::new(5);
        board.add_stone(Point::new(1, 1), Stone::Black);
        board.add_stone(Point::new(2, 1), Stone::White);
        assert_eq!(
            board.region(1, 1, 2, 1),
            vec![Stone::Black, Stone::White]
        );
        assert_eq!(
            board.stone_points(),
            vec![
                (Stone::Black, Point::new(1, 1)),
                (Stone::White, Point::new(2, 1))
            ]
        );
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3);
        board.add_stone(Point::new(0, 0), Stone::Black);
        board.add_stone(Point::new(2, 2), Stone::White);
        assert_eq!(board.to_string(), "X . . \n. . . \n. . O \n");
    }
}
