//! Error types and handling for the forecast client

use thiserror::Error;

/// Main error type for the forecast client
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The request never produced a response (refused, DNS, timeout)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Chart drawing errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new status error
    pub fn status<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file.")
            }
            ForecastError::Transport { .. } => {
                "Unable to reach the forecast server. Please check the server URL and that it is running."
                    .to_string()
            }
            ForecastError::Status { status, .. } => {
                format!("The forecast server rejected the request (HTTP {status}).")
            }
            ForecastError::Parse { .. } => {
                "The forecast server sent a response that could not be understood.".to_string()
            }
            ForecastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            ForecastError::Render { .. } => "Failed to draw the chart.".to_string(),
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::parse(err.to_string())
    }
}
