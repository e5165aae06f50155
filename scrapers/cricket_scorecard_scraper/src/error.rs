use thiserror::Error;

/// Failures that abort a whole extraction call.
///
/// Row- and table-level anomalies never show up here: they are skipped inside the
/// aggregators and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Could not detect two distinct teams")]
    TeamsNotDetected,

    #[error("Could not extract any batting statistics")]
    NoBattingDataFound,

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}
