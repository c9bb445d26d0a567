// ! Authorization Error Types
// !
// ! Module defines error types specific to the OAuth 2.0 authorization flow.

use std::fmt;
use std::time::Duration;

use crate::auth::types::OAuth2Error;

/// Authorization-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Client secret file missing or malformed
    Config(String),

    /// Callback listener could not bind its address
    ListenerBind { addr: String, reason: String },

    /// No callback arrived in time
    CallbackTimeout(Duration),

    /// Callback carried no authorization code (consent denied, or provider error)
    MissingAuthCode(Option<String>),

    /// State mismatch (CSRF protection)
    StateMismatch,

    /// Exchanging the code for tokens failed
    TokenExchange(String),

    /// Writing the token file failed
    Persist(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::ListenerBind { addr, reason } => {
                write!(f, "Failed to bind callback listener on {}: {}", addr, reason)
            }
            Self::CallbackTimeout(after) => write!(
                f,
                "No authorization callback received within {}s",
                after.as_secs()
            ),
            Self::MissingAuthCode(reason) => {
                write!(f, "No authorization code in callback")?;
                if let Some(reason) = reason {
                    write!(f, ": {}", reason)?;
                }
                Ok(())
            }
            Self::StateMismatch => write!(f, "State parameter mismatch (possible CSRF attack)"),
            Self::TokenExchange(msg) => write!(f, "Token exchange failed: {}", msg),
            Self::Persist(msg) => write!(f, "Failed to persist credentials: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Convert AuthError to McpError
impl From<AuthError> for crate::core::error::McpError {
    fn from(err: AuthError) -> Self {
        crate::core::error::McpError::Auth(err.to_string())
    }
}

/// Render an OAuth error response body as one line
pub fn describe_oauth_error(error: &OAuth2Error) -> String {
    let mut out = error.error.clone();
    if let Some(ref desc) = error.error_description {
        out.push_str(" - ");
        out.push_str(desc);
    }
    if let Some(ref uri) = error.error_uri {
        out.push_str(&format!(" (see: {uri})"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::McpError;

    #[test]
    fn test_display() {
        assert_eq!(
            AuthError::MissingAuthCode(Some("access_denied".to_string())).to_string(),
            "No authorization code in callback: access_denied"
        );
        assert_eq!(
            AuthError::MissingAuthCode(None).to_string(),
            "No authorization code in callback"
        );
        assert_eq!(
            AuthError::CallbackTimeout(Duration::from_secs(300)).to_string(),
            "No authorization callback received within 300s"
        );
    }

    #[test]
    fn test_into_mcp_error() {
        let err: McpError = AuthError::StateMismatch.into();
        assert!(matches!(err, McpError::Auth(ref msg) if msg.contains("State parameter mismatch")));
    }

    #[test]
    fn test_describe_oauth_error() {
        let error = OAuth2Error {
            error: "invalid_grant".to_string(),
            error_description: Some("Bad Request".to_string()),
            error_uri: None,
        };
        assert_eq!(describe_oauth_error(&error), "invalid_grant - Bad Request");
    }
}
