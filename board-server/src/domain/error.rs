//! Domain error types.
//!
//! Field-level failures raised while normalizing a single upstream
//! departure. Callers resolve them into documented defaults; they never
//! abort processing of the remaining items.

/// A single field of a departure item could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldParseError {
    /// Timestamp is empty or not ISO-8601
    #[error("unparseable timestamp: {input:?}")]
    Time { input: String },

    /// Delay is not an integer number of seconds
    #[error("unparseable delay: {input}")]
    Delay { input: String },
}
