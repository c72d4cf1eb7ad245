//! Inputs needed to open a fragment stream

use std::fmt;

/// A system/user prompt pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    /// System instructions
    pub system: String,

    /// User request
    pub user: String,
}

impl Prompt {
    /// Create a prompt from a system and a user part
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// A prompt with no system part
    pub fn user(user: impl Into<String>) -> Self {
        Self::new(String::new(), user)
    }
}

/// Opaque authorization token for a prompt source.
///
/// Resolved once per session and never mutated afterwards. `Debug` and
/// `Display` never print the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A token that carries no credentials
    pub fn anonymous() -> Self {
        Self(String::new())
    }

    /// The raw secret, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token carries no credentials
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "ApiToken(<anonymous>)")
        } else {
            write!(f, "ApiToken(<redacted>)")
        }
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
