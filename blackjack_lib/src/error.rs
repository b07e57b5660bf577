use thiserror::Error;

/// Errors raised by the table primitives and the game built on them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlackjackGameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Drawing from an exhausted shoe. The simulation guards against this, so
    /// seeing it means the minimum card guard is broken.
    #[error("attempted to draw from an empty shoe")]
    ShoeEmpty,
}
