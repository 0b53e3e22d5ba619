use thiserror::Error;

/// Failure of an extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The markup has no German word type header, so it is not a usable entry.
    #[error("no German word type found in markup")]
    NotFound,
}
