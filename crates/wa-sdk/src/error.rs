use std::fmt;

/// Message used when the service answers with an empty or unreadable body.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Received an unexpected response";

/// Error type tag paired with [`UNEXPECTED_RESPONSE_MESSAGE`].
pub const UNEXPECTED_RESPONSE_TYPE: &str = "unexpectedResponse";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed API key or call arguments. Carries every violation, joined
    /// with `"; "`.
    #[error("{0}")]
    InvalidArgument(String),

    /// The service reported `success: false`, or sent nothing usable back.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Network or HTTP-status failure, exactly as the transport reported it.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Remote messages for [`Error::Remote`], empty otherwise.
    pub fn messages(&self) -> &[String] {
        match self {
            Error::Remote(e) => e.messages(),
            _ => &[],
        }
    }

    /// Remote error type tags for [`Error::Remote`], empty otherwise.
    pub fn err_types(&self) -> &[String] {
        match self {
            Error::Remote(e) => e.err_types(),
            _ => &[],
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

/// Failure reported by the WrapAPI service.
///
/// `messages` are meant for people, `err_types` for branching in code. The two
/// sequences come straight from the response envelope and are kept in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    messages: Vec<String>,
    err_types: Vec<String>,
}

impl RemoteError {
    pub fn new(messages: Vec<String>, err_types: Vec<String>) -> Self {
        Self {
            messages,
            err_types,
        }
    }

    /// The synthesized error for an empty or unparsable response body.
    pub fn unexpected_response() -> Self {
        Self::new(
            vec![UNEXPECTED_RESPONSE_MESSAGE.to_string()],
            vec![UNEXPECTED_RESPONSE_TYPE.to_string()],
        )
    }

    /// All messages joined with `"; "`.
    pub fn message(&self) -> String {
        self.messages.join("; ")
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn err_types(&self) -> &[String] {
        &self.err_types
    }

    pub fn has_err_type(&self, tag: &str) -> bool {
        self.err_types.iter().any(|t| t == tag)
    }

    pub fn is_unexpected_response(&self) -> bool {
        self.has_err_type(UNEXPECTED_RESPONSE_TYPE)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for RemoteError {}

pub type Result<T> = std::result::Result<T, Error>;
