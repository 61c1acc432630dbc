//! Narrow drawing interface used by the replay engine.
//!
//! The engine only ever pushes draw calls; it never reads anything back from
//! a renderer. A full repaint is bracketed by `start_redraw` and
//! `finish_redraw`.

use crate::board::{MarkerKind, Stone};
use crate::coord::Point;

/// A sink for board drawing calls.
pub trait Renderer {
    /// Called when a game with a new board size is loaded.
    fn set_size(&mut self, _size: usize) {}

    fn start_redraw(&mut self) {}

    fn draw_stone(&mut self, x: usize, y: usize, color: Stone);

    /// `color` is the stone under the marker, if any. Lines and arrows pass
    /// their far end as `secondary`.
    fn draw_marker(
        &mut self,
        x: usize,
        y: usize,
        kind: &MarkerKind,
        color: Option<Stone>,
        secondary: Option<Point>,
    );

    fn finish_redraw(&mut self) {}
}

/// Renders the board as a plain-text diagram.
///
/// Stones are `X` (black) and `O` (white); marked empty points show a
/// marker glyph; everything else is `.`.
#[derive(Debug, Default)]
pub struct TextRenderer {
    size: usize,
    cells: Vec<char>,
    frame: String,
}

impl TextRenderer {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec!['.'; size * size],
            frame: String::new(),
        }
    }

    /// The diagram produced by the last completed repaint.
    pub fn frame(&self) -> &str {
        &self.frame
    }

    fn put(&mut self, x: usize, y: usize, ch: char) {
        if x < self.size && y < self.size {
            self.cells[y * self.size + x] = ch;
        }
    }

    fn marker_glyph(kind: &MarkerKind) -> char {
        match kind {
            MarkerKind::Triangle => '^',
            MarkerKind::Square => '#',
            MarkerKind::Circle => 'o',
            MarkerKind::Ex => 'x',
            MarkerKind::TerritoryWhite => '-',
            MarkerKind::TerritoryBlack => '+',
            MarkerKind::Dim => ',',
            MarkerKind::Current => '*',
            MarkerKind::Line | MarkerKind::Arrow => '>',
            MarkerKind::Label(text) => text.chars().next().unwrap_or('?'),
            MarkerKind::Sibling(Stone::White) => 'w',
            MarkerKind::Sibling(_) => 'b',
        }
    }
}

impl Renderer for TextRenderer {
    fn set_size(&mut self, size: usize) {
        *self = TextRenderer::new(size);
    }

    fn start_redraw(&mut self) {
        self.cells.fill('.');
    }

    fn draw_stone(&mut self, x: usize, y: usize, color: Stone) {
        let ch = match color {
            Stone::Black => 'X',
            Stone::White => 'O',
            Stone::Empty => '.',
        };
        self.put(x, y, ch);
    }

    fn draw_marker(
        &mut self,
        x: usize,
        y: usize,
        kind: &MarkerKind,
        _color: Option<Stone>,
        _secondary: Option<Point>,
    ) {
        self.put(x, y, Self::marker_glyph(kind));
    }

    fn finish_redraw(&mut self) {
        let mut frame = String::with_capacity(self.size * (self.size * 2 + 1));
        for row in self.cells.chunks(self.size.max(1)) {
            for ch in row {
                frame.push(*ch);
                frame.push(' ');
            }
            frame.push('\n');
        }
        self.frame = frame;
    }
}
