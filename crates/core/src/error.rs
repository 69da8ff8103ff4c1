//! Engine error types.

/// Error returned when an input cannot be applied to a game.
///
/// Rejections happen before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// The input does not name one of up, down, left or right.
    #[display("Invalid direction: {:?}", _0)]
    InvalidDirection(String),
}

impl std::error::Error for EngineError {}
