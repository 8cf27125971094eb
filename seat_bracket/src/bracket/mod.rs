//! Bracket module for single-elimination tournaments.
//!
//! This module provides:
//! - A seat tree keyed by position, shaped by insertion order
//! - In-order traversal and insertion-order seat layout
//! - Seeding players into a configured seed order
//! - Match progression that copies winners and losers into later seats
//! - A nested export of the tree, with JSON rendering
//!
//! ## Example
//!
//! ```
//! use seat_bracket::bracket::{Bracket, BracketConfig, Match};
//!
//! let config = BracketConfig::default()
//!     .with_match(Match::new(1, 2).with_winner_to(3))
//!     .with_seed_order(vec![1, 2]);
//!
//! let mut bracket = Bracket::with_config(config);
//! bracket.add(3, "TBD");
//! bracket.add(1, "");
//! bracket.add(2, "");
//!
//! bracket.seed(["Alice", "Bob"]).unwrap();
//! assert!(bracket.match_winner(1));
//! assert_eq!(bracket.at(3).map(|seat| *seat.payload()), Some("Alice"));
//! ```

pub mod errors;
pub mod models;
pub mod tree;

pub use errors::{BracketError, BracketResult};
pub use models::{BracketConfig, Match, Node, Position, TreeExport};
pub use tree::{Bracket, Iter, IterMut};
