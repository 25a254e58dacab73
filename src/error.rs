use thiserror::Error;

/// Failures coming back from the backend or the market-data source.
///
/// `Rejected` carries the server's own error text when the response body had
/// one; it is the only variant whose message is ever shown to the user
/// verbatim. Transport and decode problems are logged with full detail but
/// surfaced only as a generic notice.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rejected by server: {}", .message.as_deref().unwrap_or("no detail"))]
    Rejected { message: Option<String> },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}
