//! Error handling for ray traces
//!
//! Misconfiguration is the only failure a trace can report. A trace that
//! finds nothing is not an error and comes back as `Ok(None)`.

/// Main error type for ray traces
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// The request was executed with missing or invalid configuration.
    #[error("Ray trace misconfigured: {reason}")]
    Configuration { reason: String },
}

impl TraceError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        TraceError::Configuration {
            reason: reason.into(),
        }
    }
}

/// Type alias for Results in ray traces
pub type TraceResult<T> = Result<T, TraceError>;

/// Convert Option to Result with a configuration failure
pub trait OptionExt<T> {
    fn ok_or_config(self, reason: &str) -> TraceResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config(self, reason: &str) -> TraceResult<T> {
        self.ok_or_else(|| TraceError::configuration(reason))
    }
}
