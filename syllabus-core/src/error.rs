use thiserror::Error;

/// Failures of the upstream extraction provider itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a completion (connect, TLS, timeout,
    /// or an unreadable response body).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered successfully but without any completion.
    #[error("provider returned no completion choices")]
    EmptyCompletion,
}

/// The three ways an extraction can fail, kept distinct so callers can
/// tell "the provider broke" from "the output was garbage" from "the
/// document simply has no dated items".
///
/// Per-event invalid dates are not an error here: they are absorbed at
/// encoding time and surfaced as a skip count.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// The completion, after stripping any markdown fencing, did not
    /// parse as a JSON array of event objects.
    #[error("provider response is not a JSON event array: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The provider returned a valid but empty array.
    #[error("no events found in the document text")]
    NoEventsFound,
}
