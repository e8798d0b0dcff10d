//! Bearer token storage
//!
//! The records API token lives in a [`secrecy::Secret`], so it is zeroed on
//! drop and never shows up in `Debug` output. Surrounding whitespace is
//! stripped when the token is read; `.env` files and `${VAR}` substitution
//! often leave a trailing newline behind.
//!
//! ```rust
//! use hms_export::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string(" abc123\n".to_string());
//! assert_eq!(token.expose_secret().as_str(), "abc123");
//! assert!(!format!("{token:?}").contains("abc123"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Written in place of the token when a config is serialized
const REDACTED: &str = "[redacted]";

/// Token text, already trimmed
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ApiToken(String);

impl ApiToken {
    fn new(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            let token = Self(trimmed.to_string());
            let mut raw = raw;
            raw.zeroize();
            token
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank token means "no authentication"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl CloneableSecret for ApiToken {}
impl DebugSecret for ApiToken {}
impl SerializableSecret for ApiToken {}

impl Serialize for ApiToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for ApiToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ApiToken::new)
    }
}

/// The `api.token` value as held by [`ApiConfig`](super::ApiConfig)
pub type SecretString = Secret<ApiToken>;

/// Wrap a token read from the environment or a config file
pub fn secret_string(value: String) -> SecretString {
    Secret::new(ApiToken::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_token_is_trimmed_once() {
        let token = secret_string("  abc123\n".to_string());
        assert_eq!(token.expose_secret().as_str(), "abc123");

        let blank = secret_string(" \t ".to_string());
        assert!(blank.expose_secret().is_empty());
    }

    #[test]
    fn test_token_hidden_from_debug_and_serialization() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Section {
            token: SecretString,
        }

        let section: Section = toml::from_str("token = \"s3cret-token \"").unwrap();
        assert_eq!(section.token.expose_secret().as_str(), "s3cret-token");

        assert!(!format!("{section:?}").contains("s3cret"));
        let written = toml::to_string(&section).unwrap();
        assert!(!written.contains("s3cret"));
        assert!(written.contains(REDACTED));
    }
}
