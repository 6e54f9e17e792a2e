//! Error types for emitter configuration and record generation.

/// Error type for all fixturegen operations.
///
/// Configuration problems are surfaced at the point of misconfiguration
/// (construction or mutation), never deferred to the first emit call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An items collection was empty
    #[error("the 'items' collection must be a non-empty sequence")]
    EmptyItems,

    /// Weights do not line up with items
    #[error("mismatched number of choices ({items}) to choice weights ({weights}); these amounts must match")]
    WeightCountMismatch { items: usize, weights: usize },

    /// Both plain and cumulative weights were supplied
    #[error("'weights' and 'cum_weights' cannot both be provided")]
    ConflictingWeights,

    /// A weight was negative, non-finite, or all weights were zero
    #[error("choice weights must be finite and non-negative, with at least one positive weight")]
    InvalidWeights,

    /// Cumulative weights were not non-decreasing or totalled zero
    #[error("cumulative choice weights must be non-decreasing, with a positive total")]
    InvalidCumWeights,

    /// A batch requested more unique values than are available
    #[error("could not emit: {requested} new unique value(s) requested, out of {available} possible selection(s)")]
    UniquenessViolation { requested: usize, available: usize },

    /// An iterator factory produced an empty iterator
    #[error("the iterator factory returned an empty iterator")]
    EmptyIterator,

    /// A source field group was constructed without any fields
    #[error("a source field group must contain at least one field")]
    EmptySourceGroup,

    /// A wrapper emitter was constructed without any source emitters
    #[error("at least one source emitter is required")]
    EmptySources,

    /// A single-value derivation was paired with a multi-field group
    #[error("a single-value derivation requires exactly one source field, but the group has {0}")]
    DerivationArity(usize),

    /// A field references a source that is not declared earlier in the schema
    #[error("field '{field}' reads from '{source_name}', which is not declared earlier in the schema")]
    UnknownSourceField { field: String, source_name: String },

    /// A source field has no value in the current record context
    #[error("no value for source field '{0}' in the current record")]
    MissingSourceValue(String),

    /// A timestamp range was configured with start after end, or a zero step
    #[error("invalid timestamp range: start must not be after end, and the step must be positive")]
    InvalidTimestampRange,

    /// A user-supplied derivation or wrapper function failed
    #[error("derivation function failed: {0}")]
    Derivation(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
