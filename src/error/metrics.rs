use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid accumulator state: {operation} {reason}.")]
    InvalidState {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to serialize report: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

impl MetricsError {
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, MetricsError::InvalidState { .. })
    }
}
