//! # Seat Bracket
//!
//! A single-elimination tournament bracket modelled as a binary tree of seats.
//!
//! Seats are keyed by an integer position and hold an arbitrary payload
//! (a player, a placeholder, the winner of an earlier match). The tree is never
//! rebalanced: the order in which seats are added encodes the bracket layout,
//! and [`Bracket::seats`] returns seats in that order while
//! [`Bracket::iter`] walks them by position.
//!
//! ## Lifecycle
//!
//! - **Build**: add seats round by round, attach matches and a seed order
//! - **Seed**: assign an ordered list of players to the seed order
//! - **Progress**: resolve matches, copying winners and losers forward
//!
//! ## Core Modules
//!
//! - [`bracket`]: Seat tree, matches, seeding and progression
//!
//! ## Example
//!
//! ```
//! use seat_bracket::{Bracket, Match};
//!
//! let mut bracket = Bracket::new();
//! bracket.add_match(Match::new(10, 11).with_winner_to(20).with_loser_to(21));
//! for (position, payload) in [(20, "TBD"), (10, "Alice"), (11, "Bob"), (21, "TBD")] {
//!     bracket.add(position, payload);
//! }
//!
//! bracket.match_winner(10);
//! assert_eq!(bracket.at(20).map(|seat| *seat.payload()), Some("Alice"));
//! assert_eq!(bracket.at(21).map(|seat| *seat.payload()), Some("Bob"));
//! ```

/// Seat tree, matches, seeding and progression.
pub mod bracket;
pub use bracket::{
    Bracket, BracketConfig, BracketError, BracketResult, Match, Node, Position, TreeExport,
};
