//! Arena-based game tree.
//!
//! Nodes live in a flat `Vec<GameNode>` owned by the [`GameTree`] and refer
//! to each other by [`NodeId`]. Children are an owned, ordered list
//! (`children[0]` is the main line); the parent link is a plain index and
//! never owns anything.
//!
//! The root is a sentinel without properties that sits above the games in a
//! record. Each child of the root is one game.
//!
//! Deep operations (ingestion, serialization, walks) use an explicit stack,
//! so arbitrarily long records never exhaust the call stack.

use std::fmt::Write as _;

use serde_json::Value;
use tracing::debug;

use crate::board::Stone;
use crate::constants::{CHILDREN_KEY, PRIVATE_PREFIX};
use crate::coord::{Point, parse_sgf_coord};
use crate::property::{PropId, PropValue, Properties, ValueMatch};

/// Index of a node in its tree's arena.
///
/// Ids are handed out in allocation order and are never reused within a
/// tree, even after a node is pruned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the game tree: a property bag plus structural links.
#[derive(Clone, Debug)]
pub struct GameNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Child followed by default when moving forward.
    pub preferred_child: usize,
    properties: Properties,
}

const STONE_SETUP: [PropId; 3] = [PropId::AddWhite, PropId::AddBlack, PropId::AddEmpty];

impl GameNode {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// See [`Properties::push`].
    pub fn push_property(&mut self, id: PropId, value: &str) {
        self.properties.push(id, value);
    }

    /// See [`Properties::delete_value`].
    pub fn delete_property_value(&mut self, ids: &[PropId], matcher: ValueMatch<'_>) {
        self.properties.delete_value(ids, matcher);
    }

    pub fn has_property_value(&self, id: &PropId, value: &str) -> bool {
        self.properties.has_value(id, value)
    }

    /// Color of the move on this node, if it carries one. White wins when
    /// both are present.
    pub fn color(&self) -> Option<Stone> {
        if self.properties.contains(&PropId::White) {
            Some(Stone::White)
        } else if self.properties.contains(&PropId::Black) {
            Some(Stone::Black)
        } else {
            None
        }
    }

    /// The raw move coordinate of this node. A pass has an empty or `tt`
    /// coordinate but is still a move.
    pub fn get_move(&self) -> Option<&str> {
        self.properties
            .first(&PropId::White)
            .or_else(|| self.properties.first(&PropId::Black))
    }

    pub fn has_move(&self) -> bool {
        self.properties.contains(&PropId::White) || self.properties.contains(&PropId::Black)
    }

    /// Remove any stone placed on `coord` by this node, whether added
    /// (AB, AW, AE) or played (B, W). Returns the removed coordinate.
    pub fn empty_point(&mut self, coord: &str) -> Option<String> {
        let mut deleted = self.properties.take_value(&STONE_SETUP, coord);
        for id in [PropId::Black, PropId::White] {
            if self.properties.first(&id) == Some(coord) {
                self.properties.remove(&id);
                deleted = Some(coord.to_string());
            }
        }
        deleted
    }

    /// Overwrite this node's properties with those of a parsed node.
    /// Private keys (leading `_`) are skipped.
    fn load_json_node(&mut self, data: &serde_json::Map<String, Value>) {
        for (key, value) in data {
            if key.starts_with(PRIVATE_PREFIX) {
                continue;
            }
            if let Some(value) = json_to_prop_value(value) {
                self.properties.set(PropId::from_code(key), value);
            }
        }
    }
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_to_prop_value(value: &Value) -> Option<PropValue> {
    match value {
        Value::Array(items) => {
            let mut values: Vec<String> = Vec::with_capacity(items.len());
            for v in items.iter().filter_map(json_scalar) {
                if !values.contains(&v) {
                    values.push(v);
                }
            }
            (!values.is_empty()).then_some(PropValue::List(values))
        }
        other => json_scalar(other).map(PropValue::Single),
    }
}

/// Escape a value for the bracketed record syntax.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == ']' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn props_to_sgf(props: &Properties, out: &mut String) {
    out.push(';');
    for (id, value) in props.iter() {
        out.push_str(id.code());
        for v in value.values() {
            let _ = write!(out, "[{}]", escape_value(v));
        }
    }
}

/// Owner of all nodes of a record.
#[derive(Clone, Debug)]
pub struct GameTree {
    nodes: Vec<GameNode>,
    root: NodeId,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    /// A tree holding only the root sentinel.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(256),
            root: NodeId::new(0),
        };
        tree.root = tree.alloc(Properties::new());
        tree
    }

    /// Build a tree from a parsed property tree.
    pub fn from_json(data: &Value) -> Self {
        let mut tree = Self::new();
        tree.load_json(tree.root, data);
        tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &GameNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut GameNode {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes ever allocated, including pruned ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, properties: Properties) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(GameNode {
            id,
            parent: None,
            children: Vec::new(),
            preferred_child: 0,
            properties,
        });
        id
    }

    /// Attach `child` as the last child of `parent` and return its index.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> usize {
        self.get_mut(child).parent = Some(parent);
        let children = &mut self.get_mut(parent).children;
        children.push(child);
        children.len() - 1
    }

    /// Allocate a node with `properties` and append it under `parent`.
    pub fn add_child(&mut self, parent: NodeId, properties: Properties) -> (NodeId, usize) {
        let child = self.alloc(properties);
        let index = self.append_child(parent, child);
        (child, index)
    }

    /// Detach the child at `index` from `parent`. The detached subtree stays
    /// in the arena but is unreachable.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let node = self.get_mut(parent);
        if index >= node.children.len() {
            return None;
        }
        let child = node.children.remove(index);
        if node.preferred_child > index || (node.preferred_child == index && index > 0) {
            node.preferred_child -= 1;
        }
        self.get_mut(child).parent = None;
        debug!(%parent, %child, index, "pruned node");
        Some(child)
    }

    /// Index of `id` among its parent's children; `None` for the root.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id).parent?;
        self.get(parent).children.iter().position(|&c| c == id)
    }

    /// Children of this node's parent, including the node itself.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).parent {
            Some(parent) => &self.get(parent).children,
            None => &[],
        }
    }

    /// Pre-order walk of the subtree at `start`.
    pub fn walk(&self, start: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![start],
        }
    }

    /// Load a parsed property tree (`{CODE: value, "_children": [...]}`)
    /// into the subtree at `target`.
    ///
    /// Children are matched by position: an existing child is updated in
    /// place, a missing one is created. Existing children beyond those in
    /// `data` are left alone, so loading a record in parts is additive.
    pub fn load_json(&mut self, target: NodeId, data: &Value) {
        let mut stack = vec![(data, target)];
        let mut loaded = 0usize;
        while let Some((json, node)) = stack.pop() {
            let Some(map) = json.as_object() else {
                continue;
            };
            self.get_mut(node).load_json_node(map);
            loaded += 1;
            let Some(children) = map.get(CHILDREN_KEY).and_then(Value::as_array) else {
                continue;
            };
            for (i, child_json) in children.iter().enumerate() {
                let child = match self.get(node).children.get(i) {
                    Some(&existing) => existing,
                    None => self.add_child(node, Properties::new()).0,
                };
                stack.push((child_json, child));
            }
        }
        debug!(nodes = loaded, "loaded property tree");
    }

    /// Serialize the subtree at `id`.
    ///
    /// A node with a parent is wrapped in parentheses. Each node along a
    /// single-child chain is written as a flat run of `;` segments; once a
    /// node has several children, each child's subtree follows as its own
    /// parenthesized variation.
    pub fn node_to_sgf(&self, id: NodeId) -> String {
        enum Step {
            Open(NodeId),
            Close,
        }

        let mut out = String::new();
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let mut node = match step {
                Step::Close => {
                    out.push(')');
                    continue;
                }
                Step::Open(node) => node,
            };
            let wrapped = self.get(node).parent.is_some();
            if wrapped {
                out.push('(');
                stack.push(Step::Close);
            }
            props_to_sgf(&self.get(node).properties, &mut out);
            while let &[only] = &self.get(node).children[..] {
                node = only;
                props_to_sgf(&self.get(node).properties, &mut out);
            }
            for &child in self.get(node).children.iter().rev() {
                stack.push(Step::Open(child));
            }
        }
        out
    }

    /// Serialize the whole record: every game under the root, each in its
    /// own parentheses. The root sentinel itself contributes nothing.
    pub fn to_sgf(&self) -> String {
        self.get(self.root)
            .children
            .iter()
            .map(|&game| self.node_to_sgf(game))
            .collect()
    }

    /// Export the subtree at `id` back into a property tree.
    pub fn to_json(&self, id: NodeId) -> Value {
        // Reverse pre-order visits every child before its parent.
        let order: Vec<NodeId> = self.walk(id).collect();
        let mut built: std::collections::HashMap<NodeId, Value> = Default::default();
        for &node in order.iter().rev() {
            let n = self.get(node);
            let mut map = serde_json::Map::new();
            for (key, value) in n.properties.iter() {
                let v = match value {
                    PropValue::Single(s) => Value::String(s.clone()),
                    PropValue::List(vs) => {
                        Value::Array(vs.iter().cloned().map(Value::String).collect())
                    }
                };
                map.insert(key.code().to_string(), v);
            }
            if !n.children.is_empty() {
                let children = n
                    .children
                    .iter()
                    .map(|c| built.remove(c).unwrap_or(Value::Null))
                    .collect();
                map.insert(CHILDREN_KEY.to_string(), Value::Array(children));
            }
            built.insert(node, Value::Object(map));
        }
        built.remove(&id).unwrap_or(Value::Null)
    }

    /// Board point of this node's move; `None` for a pass or no move.
    pub fn move_point(&self, id: NodeId) -> Option<Point> {
        self.get(id).get_move().and_then(parse_sgf_coord)
    }
}

/// Free a property tree from [`crate::sgf::parse`] or [`GameTree::to_json`].
///
/// A plain drop of a [`Value`] recurses once per nesting level. Here every
/// nested value is moved onto a work stack before its container is freed,
/// so a record of any depth is released in constant stack space.
pub fn release_json(value: Value) {
    let mut stack = vec![value];
    while let Some(mut value) = stack.pop() {
        match &mut value {
            Value::Array(items) => stack.append(items),
            Value::Object(map) => stack.extend(map.values_mut().map(Value::take)),
            _ => {}
        }
    }
}

/// Pre-order iterator over a subtree. See [`GameTree::walk`].
pub struct Walk<'a> {
    tree: &'a GameTree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.get(id).children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        let mut p = Properties::new();
        for (k, v) in pairs {
            p.push(PropId::from_code(k), v);
        }
        p
    }

    #[test]
    fn test_append_child_sets_parent() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.alloc(props(&[("B", "dd")]));
        let b = tree.alloc(props(&[("B", "pp")]));
        assert_eq!(tree.append_child(root, a), 0);
        assert_eq!(tree.append_child(root, b), 1);
        assert_eq!(tree.get(b).parent(), Some(root));
        assert_eq!(tree.position(b), Some(1));
        assert_eq!(tree.position(root), None);
        assert_eq!(tree.siblings(a), &[a, b]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let ids: Vec<_> = (0..5).map(|_| tree.add_child(root, Properties::new()).0).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(!ids.contains(&root));
    }

    #[test]
    fn test_color_and_move() {
        let mut tree = GameTree::new();
        let (w, _) = tree.add_child(tree.root(), props(&[("W", "cd")]));
        let (setup, _) = tree.add_child(tree.root(), props(&[("AB", "aa")]));
        assert_eq!(tree.get(w).color(), Some(Stone::White));
        assert_eq!(tree.get(w).get_move(), Some("cd"));
        assert_eq!(tree.get(setup).color(), None);
        assert_eq!(tree.get(setup).get_move(), None);
    }

    #[test]
    fn test_empty_point() {
        let mut tree = GameTree::new();
        let (n, _) = tree.add_child(
            tree.root(),
            props(&[("AB", "aa"), ("AB", "bb"), ("AW", "cc"), ("B", "dd")]),
        );
        let node = tree.get_mut(n);
        assert_eq!(node.empty_point("bb").as_deref(), Some("bb"));
        assert!(!node.has_property_value(&PropId::AddBlack, "bb"));
        assert_eq!(node.empty_point("cc").as_deref(), Some("cc"));
        assert!(!node.properties().contains(&PropId::AddWhite));
        assert_eq!(node.empty_point("dd").as_deref(), Some("dd"));
        assert!(!node.has_move());
        assert_eq!(node.empty_point("ss"), None);
    }

    #[test]
    fn test_to_sgf_flattens_main_line() {
        let mut tree = GameTree::new();
        let (game, _) = tree.add_child(tree.root(), props(&[("SZ", "19")]));
        let (m1, _) = tree.add_child(game, props(&[("B", "pd")]));
        let (m2, _) = tree.add_child(m1, props(&[("W", "dp")]));
        tree.add_child(m2, props(&[("B", "pp")]));
        let (v, _) = tree.add_child(m2, props(&[("B", "dd")]));
        tree.add_child(v, props(&[("W", "cc")]));

        assert_eq!(
            tree.to_sgf(),
            "(;SZ[19];B[pd];W[dp](;B[pp])(;B[dd];W[cc]))"
        );
        assert_eq!(tree.node_to_sgf(v), "(;B[dd];W[cc])");
    }

    #[test]
    fn test_to_sgf_multi_values_and_escapes() {
        let mut tree = GameTree::new();
        let (game, _) = tree.add_child(
            tree.root(),
            props(&[("AB", "aa"), ("AB", "bb"), ("C", "a]b\\c")]),
        );
        tree.add_child(game, Properties::new());
        assert_eq!(tree.to_sgf(), "(;AB[aa][bb]C[a\\]b\\\\c];)");
    }

    #[test]
    fn test_to_sgf_root_without_parent_is_unwrapped() {
        let mut tree = GameTree::new();
        let root = tree.root();
        tree.get_mut(root).push_property(PropId::GameName, "x");
        assert_eq!(tree.node_to_sgf(root), ";GN[x]");
    }

    #[test]
    fn test_load_json_builds_tree() {
        let data = json!({
            "_children": [{
                "SZ": "9",
                "AB": ["aa", "bb"],
                "_children": [
                    {"B": "cc", "_children": [{"W": "dd"}]},
                    {"B": "ee"}
                ]
            }]
        });
        let tree = GameTree::from_json(&data);
        let game = tree.get(tree.root()).children()[0];
        assert_eq!(tree.get(game).properties().first(&PropId::Size), Some("9"));
        assert_eq!(tree.get(game).children().len(), 2);
        let first = tree.get(game).children()[0];
        assert_eq!(tree.get(first).get_move(), Some("cc"));
        assert_eq!(tree.get(first).children().len(), 1);
        assert_eq!(tree.to_sgf(), "(;SZ[9]AB[aa][bb](;B[cc];W[dd])(;B[ee]))");
    }

    #[test]
    fn test_load_json_updates_in_place() {
        let mut tree = GameTree::from_json(&json!({
            "_children": [{"SZ": "19", "_children": [{"B": "aa"}, {"B": "bb"}]}]
        }));
        let game = tree.get(tree.root()).children()[0];
        let before: Vec<_> = tree.get(game).children().to_vec();

        let root = tree.root();
        tree.load_json(root, &json!({
            "_children": [{"GN": "x", "_children": [{"C": "hi"}]}]
        }));

        assert_eq!(tree.get(tree.root()).children().len(), 1);
        assert_eq!(tree.get(game).children(), &before[..]);
        assert_eq!(tree.get(game).properties().first(&PropId::GameName), Some("x"));
        assert_eq!(tree.get(before[0]).properties().first(&PropId::Comment), Some("hi"));
        assert_eq!(tree.get(before[0]).get_move(), Some("aa"));
    }

    #[test]
    fn test_load_json_skips_private_keys_and_keeps_unknown() {
        let tree = GameTree::from_json(&json!({
            "_children": [{"_id": "5", "ZZ": "keep", "MN": 12}]
        }));
        let game = tree.get(tree.root()).children()[0];
        let p = tree.get(game).properties();
        assert_eq!(p.len(), 2);
        assert_eq!(p.first(&PropId::Other("ZZ".into())), Some("keep"));
        assert_eq!(p.first(&PropId::MoveNumber), Some("12"));
    }

    #[test]
    fn test_deep_record_does_not_recurse() {
        let mut tree = GameTree::new();
        let mut node = tree.add_child(tree.root(), Properties::new()).0;
        for i in 0..100_000 {
            let color = if i % 2 == 0 { "B" } else { "W" };
            node = tree.add_child(node, props(&[(color, "aa")])).0;
        }
        let sgf = tree.to_sgf();
        assert!(sgf.starts_with("(;;B[aa];W[aa]"));
        assert!(sgf.ends_with(";W[aa])"));
        assert_eq!(tree.walk(tree.root()).count(), 100_002);

        let data = tree.to_json(tree.root());
        let copy = GameTree::from_json(&data);
        release_json(data);
        assert_eq!(copy.walk(copy.root()).count(), 100_002);
    }

    #[test]
    fn test_release_json_handles_any_shape() {
        release_json(json!({"_children": [{"B": "aa", "_children": [{}, []]}], "X": [1, [2]]}));
        release_json(Value::Null);
    }

    #[test]
    fn test_to_json_roundtrip() {
        let data = json!({
            "_children": [{
                "SZ": "9",
                "_children": [{"B": "cc", "LB": ["aa:1", "bb:2"]}, {"B": "ee"}]
            }]
        });
        let tree = GameTree::from_json(&data);
        assert_eq!(tree.to_json(tree.root()), data);
    }

    #[test]
    fn test_remove_child_adjusts_preference() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Properties::new()).0;
        let b = tree.add_child(root, Properties::new()).0;
        let c = tree.add_child(root, Properties::new()).0;
        tree.get_mut(root).preferred_child = 2;
        assert_eq!(tree.remove_child(root, 1), Some(b));
        assert_eq!(tree.get(root).children(), &[a, c]);
        assert_eq!(tree.get(root).preferred_child, 1);
        assert_eq!(tree.get(b).parent(), None);
        assert_eq!(tree.remove_child(root, 5), None);
    }

    #[test]
    fn test_walk_is_preorder() {
        let mut tree = GameTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Properties::new()).0;
        let a1 = tree.add_child(a, Properties::new()).0;
        let b = tree.add_child(root, Properties::new()).0;
        let order: Vec<_> = tree.walk(root).collect();
        assert_eq!(order, vec![root, a, a1, b]);
    }
}
