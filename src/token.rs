//! Issue and verify PASETO v2 tokens.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::crypto::{KeyPair, Keys, SymmetricKey};
use crate::error::{Result, TokenError};
use crate::paseto::{FormatError, local, public};
use crate::payload::{PayloadOptions, TokenPayload};

const DEFAULT_APP: &str = "tokenkit";
const DEFAULT_VERSION: &str = "2";

/// Clear but authenticated context attached to every token of a service.
///
/// Default is `{"app": "tokenkit", "version": "2"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footer(BTreeMap<String, String>);

impl Footer {
    /// Create a new [`Footer`] from its entries.
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// No footer segment at all.
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace one entry.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    fn encode(&self) -> Result<Vec<u8>> {
        if self.0.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(&self.0).map_err(TokenError::encoding)
    }
}

impl Default for Footer {
    fn default() -> Self {
        Self::none()
            .insert("app", DEFAULT_APP)
            .insert("version", DEFAULT_VERSION)
    }
}

/// Issue and verify tokens.
///
/// Holds only immutable state once built: share it freely across threads.
#[derive(Clone)]
pub struct TokenService {
    keys: Keys,
    footer: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("purpose", &self.keys.purpose())
            .field("footer", &String::from_utf8_lossy(&self.footer))
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a new [`TokenService`] from validated key material.
    pub fn new(keys: impl Into<Keys>, footer: Footer) -> Result<Self> {
        let keys = keys.into();
        let footer = footer.encode()?;
        tracing::debug!(purpose = keys.purpose(), "token service created");

        Ok(Self {
            keys,
            footer,
            clock: Arc::new(SystemClock),
        })
    }

    /// Symmetric (`v2.local`) service. `key` must be exactly 32 bytes.
    pub fn symmetric(key: impl AsRef<[u8]>, footer: Footer) -> Result<Self> {
        Self::new(SymmetricKey::from_bytes(key)?, footer)
    }

    /// Asymmetric (`v2.public`) service. Both keys are required.
    pub fn asymmetric(
        public_key: Option<&[u8]>,
        private_key: Option<&[u8]>,
        footer: Footer,
    ) -> Result<Self> {
        Self::new(KeyPair::from_bytes(public_key, private_key)?, footer)
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a new token from `options`.
    pub fn create_token(&self, options: PayloadOptions) -> Result<String> {
        let payload = options.build(self.clock.now());
        let message = serde_json::to_vec(&payload).map_err(TokenError::encoding)?;

        let token = match &self.keys {
            Keys::Symmetric(key) => local::encrypt(key, &message, &self.footer)
                .map_err(TokenError::encoding)?,
            Keys::Asymmetric(pair) => {
                public::sign(pair.signing_key(), &message, &self.footer)
            },
        };

        tracing::debug!(
            id = %payload.id,
            purpose = self.keys.purpose(),
            expired_at = %payload.expired_at,
            "token issued"
        );

        Ok(token)
    }

    /// Authenticate, decode and check a token.
    pub fn verify_token(&self, token: &str) -> Result<TokenPayload> {
        let payload = self.open(token).map_err(|err| {
            tracing::warn!(error = %err, purpose = self.keys.purpose(), "token rejected");
            TokenError::InvalidToken(err)
        })?;

        if let Err(err) = payload.validate(self.clock.now()) {
            tracing::debug!(id = %payload.id, expired_at = %payload.expired_at, "token expired");
            return Err(err);
        }

        Ok(payload)
    }

    fn open(&self, token: &str) -> std::result::Result<TokenPayload, FormatError> {
        let message = match &self.keys {
            Keys::Symmetric(key) => local::decrypt(key, token, &self.footer)?,
            Keys::Asymmetric(pair) => {
                public::verify(pair.verifying_key(), token, &self.footer)?
            },
        };

        Ok(serde_json::from_slice(&message)?)
    }
}
