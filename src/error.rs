use thiserror::Error;

/// Reasons a decision call cannot produce a move
///
/// The transport layer decides how to answer when one of these surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// The controlled snake is not on the board, so it has no head to move from
    #[error("snake '{0}' not found on the board")]
    NotFound(String),

    /// Every direction leads off the board or into a hazard
    #[error("no legal move: every direction is blocked")]
    NoLegalMove,

    /// The budget ran out before any direction produced a result
    #[error("decision deadline exceeded before any direction was explored")]
    DeadlineExceeded,
}
