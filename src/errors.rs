use diesel::result::Error as DieselError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Diesel error: {0}")]
    DieselError(#[from] DieselError),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failure fetching the pending-task batch from the upstream task source.
/// Kept separate from [`SendError`] so a dead task API is never recorded
/// against an individual notification.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("task source responded with status {0}")]
    Status(u16),
    #[error("task source request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failure of a single outbound WhatsApp send attempt.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("missing messaging credentials: {0}")]
    MissingCredentials(String),
    #[error("invalid phone number: {0}")]
    InvalidNumber(String),
    #[error("provider rejected message: {0}")]
    Rejected(String),
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<crate::core::InvalidPhoneNumber> for SendError {
    fn from(err: crate::core::InvalidPhoneNumber) -> Self {
        SendError::InvalidNumber(err.0)
    }
}

/// Failure sending a manual operator reply through the handoff relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("reply text is empty")]
    EmptyText,
    #[error("invalid phone number: {0}")]
    InvalidNumber(String),
    #[error("relay responded with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
