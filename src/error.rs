//! Error taxonomy for the query engine.
//!
//! Construction of an expression tree is eager for shape errors: wrong
//! operand kinds or a sum over a non-array both fail at the point where
//! the offending node would be built. A divisor that cannot be bounded
//! away from zero is checked lazily instead, inside `sensitivity()`/`dp()`
//! — the reachable range of a compound divisor expression isn't known
//! until its own operands are evaluated, so `Binary::new` only validates
//! operand numeric-ness and the zero-straddling check runs later.

/// Failure modes for schema, type, and expression construction/evaluation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DpError {
    /// An operator received a non-numeric type, or `Sum` was applied to a
    /// non-array expression.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// The reachable range of a divisor straddles zero, so no finite
    /// sensitivity bound exists.
    #[error("infinite sensitivity: {0}")]
    InfiniteSensitivity(String),

    /// `dp(epsilon)` was called on a node whose type cannot be released
    /// directly (an `Array`, or `Boolean` pending randomized response).
    #[error("value is not directly releasable: {0}")]
    NotReleasable(String),

    /// A dataset was indexed by an expression that is neither a column
    /// name nor a `Condition`.
    #[error("unsupported dataset index: {0}")]
    UnsupportedIndex(String),

    /// A column lookup named a column absent from the schema.
    #[error("unknown column {0:?}")]
    SchemaMismatch(String),
}

pub type Result<T> = std::result::Result<T, DpError>;
