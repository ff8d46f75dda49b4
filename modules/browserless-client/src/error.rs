use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserlessError>;

#[derive(Debug, Error)]
pub enum BrowserlessError {
    /// The render or navigation did not finish in time, either on the
    /// Browserless side (HTTP 408) or on our side (request timeout).
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BrowserlessError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserlessError::Timeout(_))
    }
}

impl From<reqwest::Error> for BrowserlessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BrowserlessError::Timeout(err.to_string())
        } else {
            BrowserlessError::Network(err.to_string())
        }
    }
}
