use thiserror::Error;

/// Errors raised while reading or combining sequences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("empty sequence")]
    Empty,

    #[error("invalid nucleotide '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("strand lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}
