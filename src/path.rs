//! Addressing positions in a game tree.
//!
//! A position can be named three ways:
//!
//! - a move count along the main line of the current game (`12`),
//! - the moves played from the game root (`pd,dp,pp`); nodes without a move
//!   (comments, setup) are passed through, so this form lands on the node
//!   of the last listed move,
//! - branch indices as produced by [`GameCursor::path`] (`0,1,3`): the game
//!   index, the branch taken at each branching node, then the number of
//!   main-line steps after the last branch.
//!
//! Resolution is a pure walk over the tree. A coordinate or index that does
//! not match stops the walk at the last node reached.
//!
//! [`GameCursor::path`]: crate::cursor::GameCursor::path

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::tree::{GameTree, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path {
    MoveCount(usize),
    Moves(Vec<String>),
    Branches(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty path")]
    Empty,
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            return Err(PathParseError::Empty);
        }
        let numbers: Option<Vec<usize>> = parts.iter().map(|p| p.parse().ok()).collect();
        Ok(match numbers {
            Some(n) if n.len() == 1 => Path::MoveCount(n[0]),
            Some(n) => Path::Branches(n),
            None => Path::Moves(parts.into_iter().map(str::to_string).collect()),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::MoveCount(n) => write!(f, "{n}"),
            Path::Moves(moves) => f.write_str(&moves.join(",")),
            Path::Branches(indices) => {
                let parts: Vec<String> = indices.iter().map(usize::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// A resolved path: the game to start from and the child index to take
/// at each step below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub game: NodeId,
    pub steps: Vec<usize>,
}

impl Route {
    /// The node the route ends on.
    pub fn target(&self, tree: &GameTree) -> NodeId {
        self.steps
            .iter()
            .fold(self.game, |node, &i| tree.get(node).children()[i])
    }
}

struct Walker<'a> {
    tree: &'a GameTree,
    node: NodeId,
    steps: Vec<usize>,
}

impl Walker<'_> {
    fn step(&mut self, index: usize) -> bool {
        match self.tree.get(self.node).children().get(index) {
            Some(&child) => {
                self.node = child;
                self.steps.push(index);
                true
            }
            None => false,
        }
    }

    fn main_line(&mut self, count: usize) {
        for _ in 0..count {
            if !self.step(0) {
                break;
            }
        }
    }

    /// Child indices from the current node down to the nearest next move
    /// `coord`, looking through children that carry no move.
    fn find_move(&self, coord: &str) -> Option<Vec<usize>> {
        let mut queue = VecDeque::from([(self.node, Vec::new())]);
        while let Some((node, steps)) = queue.pop_front() {
            for (i, &child) in self.tree.get(node).children().iter().enumerate() {
                let mut route = steps.clone();
                route.push(i);
                match self.tree.get(child).get_move() {
                    Some(m) if m == coord => return Some(route),
                    Some(_) => {}
                    None => queue.push_back((child, route)),
                }
            }
        }
        None
    }

    fn single_chain(&mut self) {
        while self.tree.get(self.node).children().len() == 1 {
            self.step(0);
        }
    }
}

/// Resolve `path` to a route. `current_game` is used for the move-count
/// and move-list forms, and as a fallback when a game index is invalid.
pub fn resolve(tree: &GameTree, current_game: NodeId, path: &Path) -> Route {
    let mut w = Walker {
        tree,
        node: current_game,
        steps: Vec::new(),
    };
    match path {
        Path::MoveCount(n) => w.main_line(*n),
        Path::Moves(moves) => {
            for coord in moves {
                let Some(route) = w.find_move(coord) else {
                    break;
                };
                for i in route {
                    w.step(i);
                }
            }
        }
        Path::Branches(indices) => {
            let Some((&game_index, rest)) = indices.split_first() else {
                return Route {
                    game: current_game,
                    steps: Vec::new(),
                };
            };
            let Some(&game) = tree.get(tree.root()).children().get(game_index) else {
                return Route {
                    game: current_game,
                    steps: Vec::new(),
                };
            };
            w.node = game;
            if let Some((&count, branches)) = rest.split_last() {
                let mut complete = true;
                for &branch in branches {
                    w.single_chain();
                    if !w.step(branch) {
                        complete = false;
                        break;
                    }
                }
                if complete {
                    w.main_line(count);
                }
            }
            return Route {
                game,
                steps: w.steps,
            };
        }
    }
    Route {
        game: current_game,
        steps: w.steps,
    }
}
