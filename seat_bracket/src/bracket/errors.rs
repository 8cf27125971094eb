//! Bracket error types.

use thiserror::Error;

/// Bracket configuration errors
///
/// Lookup misses are not errors: `at` returns `None` and `replace`,
/// `match_winner` and `match_loser` return `false`.
#[derive(Debug, Error)]
pub enum BracketError {
    /// Seeding attempted before a seed order was configured
    #[error("Missing seed order")]
    MissingSeedOrder,

    /// More players supplied than there are seed slots
    #[error("Seed limit exceeded: {players} players for {slots} slots")]
    SeedLimitExceeded { players: usize, slots: usize },

    /// Tree export could not be rendered or parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
