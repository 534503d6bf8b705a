use thiserror::Error;

/// Outcome of a store operation that did not commit.
///
/// Conditional-write failures are ordinary control flow for the protocol
/// layer, only `OutOfMemory` and `ValueTooLarge` are reported as server errors.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CacheError {
    #[error("not found")]
    NotFound,
    #[error("key exists")]
    KeyExists,
    #[error("object too large for cache")]
    ValueTooLarge,
    #[error("cannot increment or decrement non-numeric value")]
    ArithOnNonNumeric,
    #[error("out of memory")]
    OutOfMemory,
}

pub type Result<T> = std::result::Result<T, CacheError>;
