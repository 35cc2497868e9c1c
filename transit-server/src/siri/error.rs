//! SIRI client error types.
//!
//! Only non-recoverable problems surface as errors. Transient provider
//! failures (open circuit, timeout, network errors) are recorded on the
//! source and reported to the caller as "no real-time data" instead.

/// Errors from the SIRI client.
#[derive(Debug, thiserror::Error)]
pub enum SiriError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The provider answered with something that isn't XML.
    #[error("invalid xml: {0}")]
    InvalidXml(#[from] roxmltree::Error),

    /// A matching stop visit lacks data we need.
    #[error("malformed stop visit: {0}")]
    MalformedVisit(String),
}
