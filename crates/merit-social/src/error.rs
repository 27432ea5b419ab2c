use thiserror::Error;

pub type SocialResult<T> = Result<T, SocialError>;

/// Errors that can occur while reading the social graph
#[derive(Error, Debug)]
pub enum SocialError {
    #[error("Hub transport error: {0}")]
    Http(String),

    #[error("Hub returned HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Hub response did not parse: {0}")]
    Payload(String),

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl SocialError {
    /// Whether a retry with identical arguments can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SocialError::Http(_) => true,
            SocialError::Status { status, .. } => *status >= 500 || *status == 429,
            SocialError::Payload(_) | SocialError::UnsupportedQuery(_) => false,
        }
    }
}
