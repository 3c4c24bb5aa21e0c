//! Bearer credential for the log storage service

use std::fmt;

/// Log-access bearer token, obtained by the embedding system
///
/// The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct LogCredential {
    token: String,
}

impl LogCredential {
    /// Wrap a bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_string(),
        }
    }

    /// Raw token value for the `Authorization` header
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the token is blank and therefore unusable
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for LogCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}
