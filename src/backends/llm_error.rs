use std::time::Duration;

/// A failed call to one tier's remote model. Carried as data through the
/// fallback chain and into the final result.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmError {
    RateLimit { retry_after: Option<u64>, message: String },
    ServerError { status: u16, message: String },
    AuthenticationError { message: String },
    NetworkError { message: String },
    Timeout { after: Duration },
    InvalidResponse { message: String },
    NotConfigured { message: String },
}

impl LlmError {
    /// Terminal errors end the fallback chain: a larger tier would fail the same way.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LlmError::NotConfigured { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            LlmError::RateLimit { message, .. } => format!("Rate limit: {}", message),
            LlmError::ServerError { status, message } => {
                format!("Server error ({}): {}", status, message)
            }
            LlmError::AuthenticationError { message } => {
                format!("Authentication error: {}", message)
            }
            LlmError::NetworkError { message } => format!("Network error: {}", message),
            LlmError::Timeout { after } => {
                format!("Request timed out after {}s", after.as_secs())
            }
            LlmError::InvalidResponse { message } => format!("Invalid response: {}", message),
            LlmError::NotConfigured { message } => format!("Not configured: {}", message),
        }
    }

    pub fn short_message(&self) -> String {
        match self {
            LlmError::RateLimit { .. } => "Rate limit hit".to_string(),
            LlmError::ServerError { status, .. } => format!("Server error ({})", status),
            LlmError::AuthenticationError { .. } => "Authentication error".to_string(),
            LlmError::NetworkError { .. } => "Network error".to_string(),
            LlmError::Timeout { .. } => "Timeout".to_string(),
            LlmError::InvalidResponse { .. } => "Invalid response".to_string(),
            LlmError::NotConfigured { .. } => "Not configured".to_string(),
        }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for LlmError {}
