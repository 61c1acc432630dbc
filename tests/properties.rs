//! Property tests over random boards and random trees.

use proptest::prelude::*;

use goban_replay::board::{Board, Stone, fingerprint_of};
use goban_replay::coord::Point;
use goban_replay::cursor::GameCursor;
use goban_replay::path::{self, Path};
use goban_replay::property::{PropId, Properties};
use goban_replay::sgf;
use goban_replay::tree::{GameTree, NodeId};

const SIZE: usize = 5;

fn stone() -> impl Strategy<Value = Stone> {
    prop_oneof![Just(Stone::Empty), Just(Stone::Black), Just(Stone::White)]
}

fn grid() -> impl Strategy<Value = Vec<Stone>> {
    prop::collection::vec(stone(), SIZE * SIZE)
}

fn place(board: &mut Board, grid: &[Stone]) {
    for (i, &s) in grid.iter().enumerate() {
        board.add_stone(Point::new(i % SIZE, i / SIZE), s);
    }
}

fn letter(i: usize) -> char {
    (b'a' + i as u8) as char
}

/// A game whose node `k` hangs under one of the nodes before it, picked by
/// `shape[k - 1].0`. One node in five carries only a comment. The moves that
/// follow a node, looking through comment-only nodes, are all different.
fn build_tree(shape: &[(usize, u8)]) -> (GameTree, Vec<NodeId>) {
    let mut tree = GameTree::new();
    let mut props = Properties::new();
    props.push(PropId::from_code("SZ"), "19");
    let game = tree.add_child(tree.root(), props).0;
    let mut nodes = vec![game];
    // Per node: the nearest node at or above it that carries a move (or the
    // game), its move depth, and how many moves follow it so far.
    let mut anchor = vec![0usize];
    let mut depth = vec![0usize];
    let mut followers = vec![0usize];
    for (k, &(raw, kind)) in shape.iter().enumerate() {
        let slot = raw % (k + 1);
        let parent = nodes[slot];
        let a = anchor[slot];
        let mut props = Properties::new();
        if kind == 0 {
            props.push(PropId::from_code("C"), &format!("note {k}"));
            anchor.push(a);
            depth.push(depth[a]);
        } else {
            let index = followers[a];
            followers[a] += 1;
            let coord = format!("{}{}", letter(index % 19), letter(index / 19));
            let d = depth[a] + 1;
            let code = if d % 2 == 1 { "B" } else { "W" };
            props.push(PropId::from_code(code), &coord);
            anchor.push(k + 1);
            depth.push(d);
        }
        followers.push(0);
        nodes.push(tree.add_child(parent, props).0);
    }
    (tree, nodes)
}

/// The node of the last move at or above each node.
fn anchors(tree: &GameTree, nodes: &[NodeId]) -> Vec<NodeId> {
    nodes
        .iter()
        .map(|&n| {
            let mut cur = n;
            while cur != nodes[0] && !tree.get(cur).has_move() {
                cur = tree.get(cur).parent().unwrap();
            }
            cur
        })
        .collect()
}

fn shape() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0usize..1000, 0u8..5), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn fingerprint_ignores_placement_order(grid in grid()) {
        let mut forward = Board::new(SIZE);
        place(&mut forward, &grid);

        let mut backward = Board::new(SIZE);
        for (i, &s) in grid.iter().enumerate().rev() {
            backward.add_stone(Point::new(i % SIZE, i / SIZE), s);
        }
        prop_assert_eq!(forward.fingerprint(), backward.fingerprint());
        prop_assert_eq!(forward.fingerprint(), fingerprint_of(&grid));
    }

    #[test]
    fn fingerprint_equal_iff_grid_equal(a in grid(), b in grid()) {
        prop_assert_eq!(fingerprint_of(&a) == fingerprint_of(&b), a == b);
        prop_assert_eq!(fingerprint_of(&a), fingerprint_of(&a.clone()));
    }

    #[test]
    fn rollback_restores_last_commit(a in grid(), b in grid()) {
        let mut board = Board::new(SIZE);
        place(&mut board, &a);
        board.commit();
        place(&mut board, &b);
        board.add_captures(Stone::Black, 3);
        board.rollback();

        prop_assert_eq!(board.stones(), &a[..]);
        prop_assert_eq!(board.captures().black, 0);
        prop_assert_eq!(board.history_len(), 1);
    }

    #[test]
    fn revert_one_restores_previous_frame(a in grid(), b in grid()) {
        let mut board = Board::new(SIZE);
        place(&mut board, &a);
        board.commit();
        place(&mut board, &b);
        board.commit();
        board.revert(1);

        prop_assert_eq!(board.stones(), &a[..]);
        prop_assert_eq!(board.fingerprint(), board.history()[0].fingerprint.clone());
        prop_assert_eq!(board.history_len(), 1);
    }

    #[test]
    fn push_is_idempotent(values in prop::collection::vec("[a-c]{1,2}", 1..6)) {
        let mut once = Properties::new();
        let mut twice = Properties::new();
        for v in &values {
            once.push(PropId::from_code("AB"), v);
            twice.push(PropId::from_code("AB"), v);
            twice.push(PropId::from_code("AB"), v);
        }
        prop_assert_eq!(&once, &twice);
        for v in &values {
            prop_assert!(once.has_value(&PropId::from_code("AB"), v));
        }
    }

    #[test]
    fn path_forms_reach_the_same_node(shape in shape()) {
        let (tree, nodes) = build_tree(&shape);
        let game = nodes[0];
        let last_moves = anchors(&tree, &nodes);
        for (&node, &last_move) in nodes.iter().zip(&last_moves) {
            let cursor = GameCursor::new(node);

            let branches = Path::Branches(cursor.path(&tree));
            let by_branch = path::resolve(&tree, game, &branches).target(&tree);
            prop_assert_eq!(by_branch, node);

            // A comment-only node has no move of its own to name, so the
            // move list lands on the last move above it.
            let moves = Path::Moves(cursor.path_moves(&tree));
            let by_move = path::resolve(&tree, game, &moves).target(&tree);
            prop_assert_eq!(by_move, last_move);

            let parsed: Path = branches.to_string().parse().unwrap();
            prop_assert_eq!(path::resolve(&tree, game, &parsed).target(&tree), node);
        }
    }

    #[test]
    fn record_text_roundtrip_keeps_shape(shape in shape()) {
        let (tree, _) = build_tree(&shape);
        let text = tree.to_sgf();
        let again = GameTree::from_json(&sgf::parse(&text).unwrap());
        prop_assert_eq!(again.to_sgf(), text);

        let left: Vec<NodeId> = tree.walk(tree.root()).collect();
        let right: Vec<NodeId> = again.walk(again.root()).collect();
        prop_assert_eq!(left.len(), right.len());
        for (&x, &y) in left.iter().zip(&right) {
            prop_assert_eq!(tree.get(x).properties(), again.get(y).properties());
            prop_assert_eq!(tree.get(x).children().len(), again.get(y).children().len());
        }
    }
}
