use thiserror::Error;

/// Reasons a credential could not be produced.
///
/// Every variant is recoverable at the call site; none of them is ever
/// rendered into a string that could be mistaken for a credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No character class selected, or every selected class was filtered out")]
    NoAlphabetSelected,

    #[error("Word list is empty")]
    EmptyWordList,

    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
