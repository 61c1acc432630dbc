//! The replay engine: a game tree, a cursor into it, and the board that
//! mirrors the cursor's position.
//!
//! ## Board history
//!
//! The board keeps one history frame per node on the path from the game root
//! to the cursor. Executing a node dispatches its properties onto the board
//! and commits a frame, so stepping forward costs one node and stepping back
//! is a restore:
//!
//! - [`ReplayEngine::variation`] moves into a child, executes it, commits.
//! - [`ReplayEngine::back`] moves to the parent, drops the child's frame and
//!   re-executes the parent on top of the grandparent's frame.
//! - [`ReplayEngine::refresh`] re-executes the current node in place.
//!
//! Every navigation method takes a `fast` flag. A fast pass still plays
//! moves and commits, but skips everything that only matters for display:
//! clearing markers, sibling markers, comments, and rendering. Jumps replay
//! fast and finish with one full refresh.
//!
//! ## Example
//!
//! ```
//! use goban_replay::engine::ReplayEngine;
//! use goban_replay::config::ReplayConfig;
//!
//! let mut engine = ReplayEngine::new(ReplayConfig::default());
//! engine.load_sgf("(;SZ[9];B[cc];W[gg](;B[cg])(;B[gc]))").unwrap();
//! engine.last();
//! assert_eq!(engine.move_number(), 3);
//! assert_eq!(engine.path(), vec![0, 0, 0]);
//! ```

use std::fmt::Write as _;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::board::{Board, MarkerKind, Stone};
use crate::config::{ReplayConfig, check_board_size};
use crate::constants::{
    FIRST_LETTER_LABEL, FIRST_NUMBER_LABEL, HANDICAP_WHITE_FIRST, MAX_BOARD_SIZE, MIN_BOARD_SIZE,
    PASS_TOKEN, RESIGN_TOKEN,
};
use crate::coord::{
    Point, expand_compressed, is_compressed, parse_sgf_coord, split_composed, to_sgf_coord_on,
};
use crate::cursor::{GameCursor, Variation};
use crate::error::{ReplayError, Result};
use crate::path::{self, Path};
use crate::presentation::{Annotation, Presentation};
use crate::property::{PropId, PropKind, PropValue, Properties, ValueMatch};
use crate::render::Renderer;
use crate::rules::{CaptureRules, MoveError, RuleEngine};
use crate::sgf;
use crate::tree::{GameTree, NodeId, release_json};

/// Markup codes removed by [`MarkTool::Clear`].
const CLEARABLE_MARKUP: [PropId; 6] = [
    PropId::Triangle,
    PropId::Square,
    PropId::Circle,
    PropId::Mark,
    PropId::Dim,
    PropId::Label,
];

/// An editing tool for [`ReplayEngine::user_mark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkTool {
    AddBlack,
    AddWhite,
    Triangle,
    Square,
    Circle,
    Ex,
    Dim,
    /// Next numeric label.
    Number,
    /// Next alphabetic label.
    Letter,
    Label(String),
    /// Remove every mark on the point.
    Clear,
}

/// Next label values handed out by [`MarkTool::Number`] and
/// [`MarkTool::Letter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCounter {
    pub number: u32,
    pub letter: char,
}

impl Default for LabelCounter {
    fn default() -> Self {
        Self {
            number: FIRST_NUMBER_LABEL,
            letter: FIRST_LETTER_LABEL,
        }
    }
}

impl LabelCounter {
    fn next_number(&mut self) -> u32 {
        let n = self.number;
        self.number += 1;
        n
    }

    fn next_letter(&mut self) -> char {
        let c = self.letter;
        self.letter = char::from_u32(c as u32 + 1).unwrap_or(c);
        c
    }
}

type Handler = fn(&mut ReplayEngine, &PropId, &PropValue, bool);

/// Property dispatch table. Game info and unknown codes are stored but
/// never executed.
fn handler_for(kind: PropKind) -> Option<Handler> {
    match kind {
        PropKind::Move => Some(ReplayEngine::play_move),
        PropKind::Setup => Some(ReplayEngine::add_stones),
        PropKind::Markup => Some(ReplayEngine::add_markers),
        PropKind::MoveNumber => Some(ReplayEngine::set_move_number),
        PropKind::PlayerToMove => Some(ReplayEngine::set_color),
        PropKind::Comment => Some(ReplayEngine::show_comments),
        PropKind::Annotation => Some(ReplayEngine::show_annotation),
        PropKind::Timing => Some(ReplayEngine::show_time),
        PropKind::GameInfo | PropKind::Unknown => None,
    }
}

/// Replays and edits a game record.
pub struct ReplayEngine {
    config: ReplayConfig,
    tree: GameTree,
    cursor: GameCursor,
    board: Board,
    rules: Box<dyn RuleEngine>,
    renderer: Option<Box<dyn Renderer>>,
    game_root: NodeId,
    current_color: Stone,
    move_number: u32,
    labels: LabelCounter,
    variations: Vec<Variation>,
    presentation: Presentation,
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(ReplayConfig::default())
    }
}

impl ReplayEngine {
    /// An engine holding one empty game of the configured default size.
    pub fn new(config: ReplayConfig) -> Self {
        let size = config
            .default_board_size
            .clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        let tree = GameTree::new();
        let root = tree.root();
        let mut engine = Self {
            rules: Box::new(CaptureRules::with_superko(config.superko)),
            config,
            tree,
            cursor: GameCursor::new(root),
            board: Board::new(size),
            renderer: None,
            game_root: root,
            current_color: Stone::Black,
            move_number: 0,
            labels: LabelCounter::default(),
            variations: Vec::new(),
            presentation: Presentation::default(),
        };
        engine.start_empty_game(size);
        engine
    }

    pub fn with_rules(mut self, rules: Box<dyn RuleEngine>) -> Self {
        self.rules = rules;
        self.refresh(false);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.set_renderer(renderer);
        self
    }

    /// Attach a renderer and paint the current position.
    pub fn set_renderer(&mut self, mut renderer: Box<dyn Renderer>) {
        renderer.set_size(self.board.size());
        self.renderer = Some(renderer);
        self.render();
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Parse record text and open its first game.
    pub fn load_sgf(&mut self, text: &str) -> Result<()> {
        let data = sgf::parse(text)?;
        let loaded = self.load_json(&data);
        release_json(data);
        loaded
    }

    /// Open a parsed property tree whose children are games.
    pub fn load_json(&mut self, data: &Value) -> Result<()> {
        let tree = GameTree::from_json(data);
        let games = tree.get(tree.root()).children().len();
        let Some(&game) = tree.get(tree.root()).children().first() else {
            return Err(ReplayError::NoGame);
        };
        info!(games, nodes = tree.len(), "loaded record");
        self.tree = tree;
        self.init_game(game);
        Ok(())
    }

    /// Replace the record with one empty game.
    pub fn new_game(&mut self, size: usize) -> Result<()> {
        let size = check_board_size(size)?;
        self.tree = GameTree::new();
        self.start_empty_game(size);
        Ok(())
    }

    fn start_empty_game(&mut self, size: usize) {
        let mut props = Properties::new();
        props.push(PropId::GameType, "1");
        props.push(PropId::FileFormat, "4");
        props.push(PropId::Size, &size.to_string());
        let root = self.tree.root();
        let (game, _) = self.tree.add_child(root, props);
        self.init_game(game);
    }

    /// Make `game` the current game and show its root.
    pub fn init_game(&mut self, game: NodeId) {
        self.enter_game(game);
        self.reset_cursor(false);
    }

    fn enter_game(&mut self, game: NodeId) {
        let declared = self.tree.get(game).properties().first(&PropId::Size);
        let size = self.config.board_size(declared);
        debug!(%game, size, "entering game");
        self.game_root = game;
        self.board = Board::new(size);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_size(size);
        }
        self.cursor = GameCursor::new(game);
        self.move_number = 0;
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Return to the game root with a fresh history.
    pub fn reset_cursor(&mut self, fast: bool) {
        self.board.reset();
        self.cursor.set_node(self.game_root);
        self.move_number = 0;
        self.reset_current_color();
        self.presentation = Presentation::default();
        self.labels = LabelCounter::default();
        self.refresh(fast);
    }

    /// Re-execute the current node on top of its parent's frame.
    pub fn refresh(&mut self, fast: bool) {
        self.board.revert(1);
        self.exec_node(fast);
    }

    /// Move into child `index`, or the preferred child for `None`.
    pub fn variation(&mut self, index: Option<usize>, fast: bool) -> bool {
        if !self.cursor.next(&mut self.tree, index) {
            return false;
        }
        self.exec_node(fast);
        self.labels = LabelCounter::default();
        true
    }

    pub fn forward(&mut self, fast: bool) -> bool {
        self.variation(None, fast)
    }

    pub fn back(&mut self, fast: bool) -> bool {
        if !self.cursor.previous(&self.tree) {
            return false;
        }
        self.board.revert(1);
        self.refresh(fast);
        self.labels = LabelCounter::default();
        true
    }

    pub fn first(&mut self) {
        if !self.cursor.has_previous(&self.tree) {
            return;
        }
        self.reset_cursor(false);
    }

    /// Follow preferred children to the end of the line.
    pub fn last(&mut self) {
        if !self.cursor.has_next(&self.tree) {
            return;
        }
        while self.variation(None, true) {}
        self.refresh(false);
    }

    /// Jump to `path`, replaying from the game root. Unmatched steps stop
    /// the jump where it is.
    pub fn go_to(&mut self, path: &Path) {
        let route = path::resolve(&self.tree, self.game_root, path);
        debug!(%path, steps = route.steps.len(), "go to");
        if route.game != self.game_root {
            self.enter_game(route.game);
        }
        self.reset_cursor(true);
        for step in route.steps {
            self.variation(Some(step), true);
        }
        self.refresh(false);
    }

    /// Switch to the next sibling of the current node, wrapping around.
    pub fn next_sibling(&mut self) -> bool {
        let Some(next) = self.cursor.next_sibling(&self.tree) else {
            return false;
        };
        if !self.back(true) {
            return false;
        }
        self.variation(Some(next), false)
    }

    // -------------------------------------------------------------------------
    // Node execution
    // -------------------------------------------------------------------------

    fn exec_node(&mut self, fast: bool) {
        let id = self.cursor.node();
        if !fast {
            self.board.clear_markers();
            self.presentation.clear_node();
        }
        self.move_number = self.cursor.move_number(&self.tree) as u32;
        if self.move_number < 1 {
            self.reset_current_color();
        }

        let props = self.tree.get(id).properties().clone();
        for (prop, value) in props.iter() {
            if let Some(handler) = handler_for(prop.kind()) {
                trace!(%id, code = prop.code(), "dispatch");
                handler(self, prop, value, fast);
            }
        }

        if !fast {
            if self.config.sibling_markers {
                self.mark_siblings();
            }
            self.variations = self.cursor.next_moves(&self.tree);
        }
        self.board.commit();
        if !fast {
            self.render();
        }
    }

    /// Mark each sibling move that differs from the current node's move.
    fn mark_siblings(&mut self) {
        let id = self.cursor.node();
        let current = self.tree.get(id).get_move();
        let size = self.board.size();
        let marks: Vec<(Point, Stone)> = self
            .tree
            .siblings(id)
            .iter()
            .filter_map(|&s| {
                let node = self.tree.get(s);
                let coord = node.get_move()?;
                if Some(coord) == current {
                    return None;
                }
                let pt = parse_sgf_coord(coord).filter(|p| p.is_on_board(size))?;
                Some((pt, node.color()?))
            })
            .collect();
        for (pt, color) in marks {
            self.board.add_marker(pt, MarkerKind::Sibling(color), None);
        }
    }

    fn render(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            self.board.render(renderer.as_mut());
        }
    }

    fn reset_current_color(&mut self) {
        let handicap = self
            .tree
            .get(self.game_root)
            .properties()
            .first(&PropId::Handicap)
            .and_then(|h| h.trim().parse::<u32>().ok())
            .unwrap_or(0);
        self.current_color = if handicap > HANDICAP_WHITE_FIRST {
            Stone::White
        } else {
            Stone::Black
        };
    }

    fn point_on_board(&self, coord: &str) -> Option<Point> {
        parse_sgf_coord(coord).filter(|p| p.is_on_board(self.board.size()))
    }

    // -------------------------------------------------------------------------
    // Property handlers
    // -------------------------------------------------------------------------

    fn play_move(&mut self, prop: &PropId, value: &PropValue, fast: bool) {
        let color = if *prop == PropId::White {
            Stone::White
        } else {
            Stone::Black
        };
        self.current_color = color.opponent();

        let coord = value.first().unwrap_or("");
        if coord.is_empty() || coord == PASS_TOKEN {
            trace!(?color, "pass");
            return;
        }
        if coord == RESIGN_TOKEN {
            debug!(?color, "resigned");
            return;
        }
        let Some(pt) = self.point_on_board(coord) else {
            warn!(coord, size = self.board.size(), "move off the board ignored");
            return;
        };
        self.board.add_stone(pt, color);
        self.rules.apply(&mut self.board, pt, color);
        if !fast {
            self.board.add_marker(pt, MarkerKind::Current, None);
        }
    }

    fn add_stones(&mut self, prop: &PropId, value: &PropValue, _fast: bool) {
        let color = match prop {
            PropId::AddBlack => Stone::Black,
            PropId::AddWhite => Stone::White,
            _ => Stone::Empty,
        };
        for coord in expand_compressed(value.values()) {
            if is_compressed(&coord) {
                continue;
            }
            if let Some(pt) = self.point_on_board(&coord) {
                self.board.add_stone(pt, color);
            }
        }
    }

    fn add_markers(&mut self, prop: &PropId, value: &PropValue, _fast: bool) {
        match prop {
            PropId::Line | PropId::Arrow => {
                let kind = if *prop == PropId::Line {
                    MarkerKind::Line
                } else {
                    MarkerKind::Arrow
                };
                for v in value.values() {
                    let (from, to) = split_composed(v);
                    if let Some(pt) = self.point_on_board(from) {
                        let to = to.and_then(parse_sgf_coord);
                        self.board.add_marker(pt, kind.clone(), to);
                    }
                }
            }
            PropId::Label => {
                for v in value.values() {
                    let (at, text) = split_composed(v);
                    if let Some(pt) = self.point_on_board(at) {
                        let text = text.unwrap_or_default().to_string();
                        self.board.add_marker(pt, MarkerKind::Label(text), None);
                    }
                }
            }
            _ => {
                let kind = match prop {
                    PropId::Triangle => MarkerKind::Triangle,
                    PropId::Square => MarkerKind::Square,
                    PropId::Circle => MarkerKind::Circle,
                    PropId::Mark => MarkerKind::Ex,
                    PropId::TerritoryWhite => MarkerKind::TerritoryWhite,
                    PropId::TerritoryBlack => MarkerKind::TerritoryBlack,
                    PropId::Dim => MarkerKind::Dim,
                    _ => return,
                };
                for coord in expand_compressed(value.values()) {
                    if is_compressed(&coord) {
                        continue;
                    }
                    if let Some(pt) = self.point_on_board(&coord) {
                        self.board.add_marker(pt, kind.clone(), None);
                    }
                }
            }
        }
    }

    fn set_move_number(&mut self, _prop: &PropId, value: &PropValue, _fast: bool) {
        if let Some(n) = value.first().and_then(|v| v.trim().parse().ok()) {
            self.move_number = n;
        }
    }

    fn set_color(&mut self, _prop: &PropId, value: &PropValue, _fast: bool) {
        match value.first() {
            Some("B") => self.current_color = Stone::Black,
            Some("W") => self.current_color = Stone::White,
            other => debug!(?other, "ignored player to move"),
        }
    }

    fn show_comments(&mut self, _prop: &PropId, value: &PropValue, fast: bool) {
        if fast {
            return;
        }
        let text = value.values().join("\n");
        let text = text.trim_start();
        if !text.is_empty() {
            self.presentation.comments = Some(text.to_string());
        }
    }

    fn show_annotation(&mut self, prop: &PropId, value: &PropValue, fast: bool) {
        if fast {
            return;
        }
        if let Some(a) = Annotation::from_property(prop, value.first().unwrap_or_default()) {
            self.presentation.annotations.push(a);
        }
    }

    fn show_time(&mut self, prop: &PropId, value: &PropValue, _fast: bool) {
        self.presentation
            .apply_time(prop, value.first().unwrap_or_default());
    }

    // -------------------------------------------------------------------------
    // Recording
    // -------------------------------------------------------------------------

    /// Append a move for the current color under the cursor and enter it.
    pub fn create_move(&mut self, coord: &str) {
        let prop = if self.current_color == Stone::White {
            PropId::White
        } else {
            PropId::Black
        };
        let mut props = Properties::new();
        props.push(prop, coord);
        let (node, index) = self.tree.add_child(self.cursor.node(), props);
        debug!(%node, coord, index, "created move");
        self.variation(Some(index), false);
    }

    /// Enter an existing pass child, or record a new pass.
    pub fn pass(&mut self) {
        let existing = self.cursor.next_moves(&self.tree).into_iter().find(|v| {
            self.tree.get(v.node).has_move()
                && v.coord.as_deref().is_none_or(|c| c.is_empty() || c == PASS_TOKEN)
        });
        match existing.map(|v| v.index) {
            Some(index) => {
                self.variation(Some(index), false);
            }
            None => self.create_move(PASS_TOKEN),
        }
    }

    /// Play at `pt` for the current color: follow an existing child with
    /// that move, or record a new variation. Illegal moves change nothing.
    pub fn user_play_or_var(&mut self, pt: Point) -> Result<()> {
        let coord = to_sgf_coord_on(pt, self.board.size()).ok_or(MoveError::OffBoard)?;
        if let Err(err) = self.rules.check_move(&self.board, pt, self.current_color) {
            debug!(%pt, %err, "rejected move");
            return Err(err.into());
        }
        let existing = self
            .cursor
            .next_moves(&self.tree)
            .into_iter()
            .find(|v| v.coord.as_deref() == Some(coord.as_str()));
        match existing {
            Some(v) => {
                self.variation(Some(v.index), false);
            }
            None => self.create_move(&coord),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Markup editing
    // -------------------------------------------------------------------------

    /// Toggle a mark or setup stone on `pt` in the current node.
    ///
    /// If the node is left without any property, `confirm` is asked whether
    /// to delete it. Returns `true` if the node was deleted.
    pub fn user_mark(
        &mut self,
        pt: Point,
        tool: MarkTool,
        confirm: impl FnOnce(NodeId) -> bool,
    ) -> bool {
        let Some(coord) = to_sgf_coord_on(pt, self.board.size()) else {
            return false;
        };
        let id = self.cursor.node();

        let add = match tool {
            MarkTool::AddBlack | MarkTool::AddWhite => {
                let stone = self.board.stone(pt);
                let deleted = self.tree.get_mut(id).empty_point(&coord);
                let prop = if tool == MarkTool::AddBlack && stone != Stone::Black {
                    Some(PropId::AddBlack)
                } else if tool == MarkTool::AddWhite && stone != Stone::White {
                    Some(PropId::AddWhite)
                } else if stone != Stone::Empty && deleted.is_none() {
                    Some(PropId::AddEmpty)
                } else {
                    None
                };
                prop.map(|p| (p, coord))
            }
            MarkTool::Clear => {
                self.tree
                    .get_mut(id)
                    .delete_property_value(&CLEARABLE_MARKUP, ValueMatch::Prefix(&coord));
                None
            }
            MarkTool::Triangle => self.toggle_markup(id, PropId::Triangle, coord),
            MarkTool::Square => self.toggle_markup(id, PropId::Square, coord),
            MarkTool::Circle => self.toggle_markup(id, PropId::Circle, coord),
            MarkTool::Ex => self.toggle_markup(id, PropId::Mark, coord),
            MarkTool::Dim => self.toggle_markup(id, PropId::Dim, coord),
            MarkTool::Number => {
                let value = format!("{coord}:{}", self.labels.next_number());
                self.toggle_markup(id, PropId::Label, value)
            }
            MarkTool::Letter => {
                let value = format!("{coord}:{}", self.labels.next_letter());
                self.toggle_markup(id, PropId::Label, value)
            }
            MarkTool::Label(text) => {
                self.toggle_markup(id, PropId::Label, format!("{coord}:{text}"))
            }
        };

        if let Some((prop, value)) = add {
            self.tree.get_mut(id).push_property(prop, &value);
        }
        let removed = self.check_for_empty_node_removal(confirm);
        self.refresh(false);
        removed
    }

    /// Remove `value` if the node has it, otherwise return it for adding.
    fn toggle_markup(
        &mut self,
        id: NodeId,
        prop: PropId,
        value: String,
    ) -> Option<(PropId, String)> {
        let node = self.tree.get_mut(id);
        if node.has_property_value(&prop, &value) {
            node.delete_property_value(std::slice::from_ref(&prop), ValueMatch::Exact(&value));
            return None;
        }
        Some((prop, value))
    }

    /// Delete the current node if it has no properties left and `confirm`
    /// agrees. The cursor moves to the parent. Game roots are never deleted.
    pub fn check_for_empty_node_removal(&mut self, confirm: impl FnOnce(NodeId) -> bool) -> bool {
        let id = self.cursor.node();
        if !self.tree.get(id).properties().is_empty() || !self.cursor.has_previous(&self.tree) {
            return false;
        }
        if !confirm(id) {
            return false;
        }
        let Some(index) = self.tree.position(id) else {
            return false;
        };
        self.back(false);
        let parent = self.cursor.node();
        self.tree.remove_child(parent, index);
        self.variations = self.cursor.next_moves(&self.tree);
        info!(%id, %parent, "deleted empty node");
        true
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> &GameCursor {
        &self.cursor
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn game_root(&self) -> NodeId {
        self.game_root
    }

    /// Color that plays next.
    pub fn current_color(&self) -> Stone {
        self.current_color
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Children of the current node, as of the last full refresh.
    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn labels(&self) -> LabelCounter {
        self.labels
    }

    /// Branch-index path of the cursor. See [`GameCursor::path`].
    pub fn path(&self) -> Vec<usize> {
        self.cursor.path(&self.tree)
    }

    pub fn path_moves(&self) -> Vec<String> {
        self.cursor.path_moves(&self.tree)
    }

    pub fn max_move_count(&self) -> usize {
        self.cursor.max_move_count(&self.tree)
    }

    pub fn to_sgf(&self) -> String {
        self.tree.to_sgf()
    }

    /// `GN - PW WR vs PB BR`, leaving out what the game root lacks.
    pub fn game_description(&self) -> String {
        let props = self.tree.get(self.game_root).properties();
        let mut desc = props.first(&PropId::GameName).unwrap_or_default().to_string();
        if let (Some(pw), Some(pb)) = (
            props.first(&PropId::PlayerWhite),
            props.first(&PropId::PlayerBlack),
        ) {
            let rank = |id: PropId| {
                props
                    .first(&id)
                    .map(|r| format!(" {r}"))
                    .unwrap_or_default()
            };
            if !desc.is_empty() {
                desc.push_str(" - ");
            }
            let _ = write!(
                desc,
                "{pw}{} vs {pb}{}",
                rank(PropId::WhiteRank),
                rank(PropId::BlackRank)
            );
        }
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(sgf: &str) -> ReplayEngine {
        let mut e = ReplayEngine::default();
        e.load_sgf(sgf).unwrap();
        e
    }

    #[test]
    fn test_history_tracks_depth() {
        let mut e = engine("(;SZ[9];B[cc];W[gg];B[cg];W[gc])");
        assert_eq!(e.board().history_len(), 1);
        e.forward(false);
        e.forward(false);
        assert_eq!(e.board().history_len(), 3);
        e.back(false);
        assert_eq!(e.board().history_len(), 2);
        e.last();
        assert_eq!(e.board().history_len(), 5);
        e.first();
        assert_eq!(e.board().history_len(), 1);
        assert_eq!(e.board().fingerprint(), "");
    }

    #[test]
    fn test_current_color_alternates() {
        let mut e = engine("(;SZ[9];B[cc];W[gg])");
        assert_eq!(e.current_color(), Stone::Black);
        e.forward(false);
        assert_eq!(e.current_color(), Stone::White);
        e.forward(false);
        assert_eq!(e.current_color(), Stone::Black);
        e.back(false);
        assert_eq!(e.current_color(), Stone::White);
    }

    #[test]
    fn test_handicap_white_first() {
        let e = engine("(;SZ[9]HA[2]AB[cc][gg])");
        assert_eq!(e.current_color(), Stone::White);
        assert_eq!(e.board().stone(Point::new(2, 2)), Stone::Black);
    }

    #[test]
    fn test_player_to_move_overrides() {
        let mut e = engine("(;SZ[9];B[cc]PL[B])");
        e.forward(false);
        assert_eq!(e.current_color(), Stone::Black);
    }

    #[test]
    fn test_move_number_property() {
        let mut e = engine("(;SZ[9];B[cc]MN[42])");
        e.forward(false);
        assert_eq!(e.move_number(), 42);
    }

    #[test]
    fn test_current_marker_only_on_full_pass() {
        let mut e = engine("(;SZ[9];B[cc];W[gg])");
        e.forward(true);
        assert!(e.board().marker(Point::new(2, 2)).is_none());
        e.refresh(false);
        let m = e.board().marker(Point::new(2, 2)).unwrap();
        assert_eq!(m.kind, MarkerKind::Current);
    }

    #[test]
    fn test_game_description() {
        let e = engine("(;GN[Final]PW[Lee]WR[9p]PB[Cho])");
        assert_eq!(e.game_description(), "Final - Lee 9p vs Cho");
        let e = engine("(;PW[Lee]PB[Cho]BR[1d])");
        assert_eq!(e.game_description(), "Lee vs Cho 1d");
        let e = engine("(;GN[Quiet])");
        assert_eq!(e.game_description(), "Quiet");
    }

    #[test]
    fn test_empty_record_is_error() {
        let mut e = ReplayEngine::default();
        assert!(matches!(e.load_sgf("no games here"), Err(ReplayError::NoGame)));
        assert!(matches!(e.new_game(0), Err(ReplayError::BoardSize(0))));
    }

    #[test]
    fn test_off_board_move_is_ignored() {
        let mut e = engine("(;SZ[5];B[ss];W[aa])");
        e.last();
        assert_eq!(e.board().fingerprint(), "-0");
    }

    #[test]
    fn test_illegal_move_is_replay_error() {
        let mut e = engine("(;SZ[9];B[cc])");
        e.last();
        let err = e.user_play_or_var(Point::new(2, 2)).unwrap_err();
        assert!(matches!(err, ReplayError::IllegalMove(MoveError::Occupied)));
        assert_eq!(err.to_string(), "Error Illegal move: point not EMPTY");
        assert_eq!(e.board().history_len(), 2);
    }

    #[test]
    fn test_label_counter() {
        let mut c = LabelCounter::default();
        assert_eq!(c.next_number(), 1);
        assert_eq!(c.next_number(), 2);
        assert_eq!(c.next_letter(), 'A');
        assert_eq!(c.next_letter(), 'B');
    }
}
