//! Navigation over a [`GameTree`].
//!
//! A [`GameCursor`] is just the id of the current node. Moving forward
//! records the chosen child as the node's preferred child, so the tree is
//! borrowed mutably for [`GameCursor::next`]; everything else only reads.
//!
//! The root sentinel is never a resting position: [`GameCursor::previous`]
//! refuses to step from a game root up to the sentinel.

use crate::board::Stone;
use crate::tree::{GameTree, NodeId};

/// A child of the current node, as offered for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    /// Index among the parent's children.
    pub index: usize,
    pub node: NodeId,
    /// Raw move coordinate of the child, if it carries a move.
    pub coord: Option<String>,
}

/// The current position in a game tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameCursor {
    node: NodeId,
}

impl GameCursor {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn set_node(&mut self, node: NodeId) {
        self.node = node;
    }

    /// Move into a child: `variation`, or the preferred child when `None`.
    /// The chosen child becomes the preferred one. Returns `false` at a
    /// leaf or for an index out of range.
    pub fn next(&mut self, tree: &mut GameTree, variation: Option<usize>) -> bool {
        let node = tree.get_mut(self.node);
        let index = variation.unwrap_or(node.preferred_child);
        let Some(&child) = node.children().get(index) else {
            return false;
        };
        node.preferred_child = index;
        self.node = child;
        true
    }

    /// Move to the parent. Fails on a game root.
    pub fn previous(&mut self, tree: &GameTree) -> bool {
        if !self.has_previous(tree) {
            return false;
        }
        if let Some(parent) = tree.get(self.node).parent() {
            self.node = parent;
        }
        true
    }

    pub fn has_next(&self, tree: &GameTree) -> bool {
        !tree.get(self.node).children().is_empty()
    }

    /// True unless the parent is the root sentinel (or there is no parent).
    pub fn has_previous(&self, tree: &GameTree) -> bool {
        tree.get(self.node)
            .parent()
            .and_then(|p| tree.get(p).parent())
            .is_some()
    }

    /// Children of the current node with their moves.
    pub fn next_moves(&self, tree: &GameTree) -> Vec<Variation> {
        tree.get(self.node)
            .children()
            .iter()
            .enumerate()
            .map(|(index, &node)| Variation {
                index,
                node,
                coord: tree.get(node).get_move().map(str::to_string),
            })
            .collect()
    }

    /// Color of the first child that carries a move.
    pub fn next_color(&self, tree: &GameTree) -> Option<Stone> {
        tree.get(self.node)
            .children()
            .iter()
            .find_map(|&c| tree.get(c).color())
    }

    /// First node at or below the cursor, along single-child links, that
    /// has zero or several children.
    pub fn next_node_with_variations(&self, tree: &GameTree) -> NodeId {
        let mut node = self.node;
        while let &[only] = tree.get(node).children() {
            node = only;
        }
        node
    }

    /// Index of the sibling after the current node, wrapping to 0.
    pub fn next_sibling(&self, tree: &GameTree) -> Option<usize> {
        let siblings = tree.siblings(self.node);
        let pos = tree.position(self.node)?;
        Some(if pos + 1 >= siblings.len() { 0 } else { pos + 1 })
    }

    /// Route from the root sentinel to the cursor.
    ///
    /// The first entry is the index of the game, then one entry per node
    /// on the route whose parent branches (the branch taken there), and
    /// last the number of single-child steps from the final branch down to
    /// the cursor.
    pub fn path(&self, tree: &GameTree) -> Vec<usize> {
        let parent_of = |n: NodeId| tree.get(n).parent();
        let mut n = self.node;
        let mut count = 0;
        while let Some(p) = parent_of(n) {
            if tree.get(p).children().len() != 1 || parent_of(p).is_none() {
                break;
            }
            count += 1;
            n = p;
        }

        let mut rpath = vec![count];
        let mut cur = Some(n);
        while let Some(node) = cur {
            if let Some(p) = parent_of(node) {
                if tree.get(p).children().len() > 1 || parent_of(p).is_none() {
                    rpath.push(tree.position(node).unwrap_or(0));
                }
            }
            cur = parent_of(node);
        }
        rpath.reverse();
        rpath
    }

    /// Moves played from the game root down to the cursor.
    pub fn path_moves(&self, tree: &GameTree) -> Vec<String> {
        let mut moves = Vec::new();
        let mut cur = *self;
        loop {
            let node = tree.get(cur.node);
            if !cur.has_previous(tree) {
                break;
            }
            if let Some(m) = node.get_move() {
                moves.push(m.to_string());
            }
            cur.previous(tree);
        }
        moves.reverse();
        moves
    }

    /// Number of nodes carrying a move from the root down to the cursor,
    /// inclusive.
    pub fn move_number(&self, tree: &GameTree) -> usize {
        let mut num = 0;
        let mut cur = Some(self.node);
        while let Some(id) = cur {
            let node = tree.get(id);
            if node.has_move() {
                num += 1;
            }
            cur = node.parent();
        }
        num
    }

    /// Forward steps available from the cursor following preferred
    /// children. The cursor is not moved.
    pub fn max_move_count(&self, tree: &GameTree) -> usize {
        max_move_count(tree, self.node)
    }

    /// The game the cursor is in. On the root sentinel, the first game.
    pub fn game_root(&self, tree: &GameTree) -> NodeId {
        let node = tree.get(self.node);
        if node.parent().is_none() {
            return node.children().first().copied().unwrap_or(self.node);
        }
        let mut cur = *self;
        while cur.previous(tree) {}
        cur.node
    }
}

/// Number of steps from `from` to the end of its line, following
/// preferred children.
pub fn max_move_count(tree: &GameTree, from: NodeId) -> usize {
    let mut count = 0;
    let mut node = tree.get(from);
    while let Some(&child) = node.children().get(node.preferred_child) {
        count += 1;
        node = tree.get(child);
    }
    count
}
