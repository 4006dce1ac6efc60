//! Credential handling for the completion service
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The API key sent to the completion service.
///
/// `Debug` and `Display` never print the key itself, so the key can sit inside configuration
/// structs that get logged at startup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The value of the `Authorization` header for this key.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.trim())
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ApiKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = ApiKey::new("sk-secret-value");
        assert!(!format!("{key:?}").contains("sk-secret-value"));
        assert!(!format!("{key}").contains("sk-secret-value"));
    }

    #[test]
    fn test_bearer_trims_whitespace() {
        let key: ApiKey = "  sk-abc\n".parse().unwrap();
        assert_eq!(key.bearer(), "Bearer sk-abc");
    }

    #[test]
    fn test_blank_key() {
        assert!(ApiKey::new("   ").is_blank());
        assert!(ApiKey::new("").is_blank());
        assert!(!ApiKey::new("x").is_blank());
    }
}
