//! Goban-Replay: a replay engine for branching Go game records.
//!
//! This crate loads game records, replays them onto a board with capture
//! resolution and ko detection, and navigates their variation trees in any
//! order: forward, back, jump to a path, switch variation. Edits are written
//! back into the tree, which serializes losslessly.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, coordinate alphabet, record conventions
//! - [`coord`] - Points and record coordinates
//! - [`board`] - Stones, markers, captures, and the snapshot history
//! - [`rules`] - Capture resolution and move legality
//! - [`property`] - Typed property bag of a node
//! - [`tree`] - Arena game tree, bulk loading, and serialization
//! - [`cursor`] - Navigation over the tree
//! - [`path`] - The three ways to address a position
//! - [`sgf`] - Record text parser
//! - [`engine`] - The replay engine tying everything together
//! - [`presentation`] - Comments, annotations, and clocks
//! - [`render`] - Drawing interface and a text renderer
//! - [`config`] - Engine configuration
//!
//! ## Example
//!
//! ```
//! use goban_replay::engine::ReplayEngine;
//! use goban_replay::path::Path;
//!
//! let mut engine = ReplayEngine::default();
//! engine.load_sgf("(;SZ[9];B[cc];W[gg];B[cg](;W[gc])(;W[ee]))").unwrap();
//!
//! // Jump to the second variation after move three.
//! engine.go_to(&"cc,gg,cg,ee".parse::<Path>().unwrap());
//! assert_eq!(engine.move_number(), 4);
//! assert_eq!(engine.path(), vec![0, 1, 0]);
//!
//! // Every addressing form leads to the same node.
//! let node = engine.cursor().node();
//! engine.go_to(&Path::Branches(vec![0, 1, 0]));
//! assert_eq!(engine.cursor().node(), node);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod coord;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod path;
pub mod presentation;
pub mod property;
pub mod render;
pub mod rules;
pub mod sgf;
pub mod tree;

pub use engine::ReplayEngine;
pub use error::ReplayError;
