//! Error handler for tokenkit.

use thiserror::Error;

use crate::crypto::KeyError;
use crate::paseto::FormatError;

pub type Result<T> = std::result::Result<T, TokenError>;

/// Enum representing token issuance and verification errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid key configuration: {0}")]
    Configuration(#[from] KeyError),

    #[error("failed to encode token")]
    Encoding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Message stays generic; the cause is only reachable through `source()`.
    #[error("token is invalid")]
    InvalidToken(#[source] FormatError),

    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub(crate) fn encoding<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Encoding(Box::new(err))
    }

    /// Whether key material was rejected at construction.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether the token failed authentication or could not be parsed.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::InvalidToken(_))
    }

    /// Whether the token was authentic but past its validity window.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_invalid_token_hides_cause() {
        let err = TokenError::InvalidToken(FormatError::FooterMismatch);

        assert_eq!(err.to_string(), "token is invalid");
        assert!(err.source().is_some());
        assert!(err.is_invalid());
        assert!(!err.is_expired());
    }

    #[test]
    fn test_expired_message() {
        assert!(TokenError::Expired.to_string().contains("expired"));
    }

    #[test]
    fn test_configuration_from_key_error() {
        let err: TokenError = KeyError::MissingKey.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("should not be null"));
    }
}
