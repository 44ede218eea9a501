//! Configuration manager for tokenkit.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{KEY_LENGTH, KeyError, KeyPair, Keys, SymmetricKey};
use crate::token::{Footer, TokenService};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Overrides `token.symmetric_key` when set.
pub const KEY_ENV: &str = "TOKENKIT_KEY";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to token issuance.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
}

/// Token operating mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Shared secret, `v2.local`.
    #[default]
    Local,
    /// Ed25519 key pair, `v2.public`.
    Public,
}

/// Token configuration. Keys are hex-encoded.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub mode: Mode,
    pub symmetric_key: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    /// Replaces the default footer. An empty map disables it.
    pub footer: Option<BTreeMap<String, String>>,
}

impl Token {
    /// Decode key material matching `mode`.
    pub fn keys(&self) -> Result<Keys, KeyError> {
        match self.mode {
            Mode::Local => {
                let Some(key) = self.symmetric_key.as_deref() else {
                    return Err(KeyError::KeyLength {
                        value: 0,
                        excepted: KEY_LENGTH,
                    });
                };
                Ok(SymmetricKey::from_hex(key)?.into())
            },
            Mode::Public => {
                let public = self.public_key.as_deref().map(hex::decode).transpose()?;
                let private = self
                    .private_key
                    .as_deref()
                    .map(|key| hex::decode(key).map(Zeroizing::new))
                    .transpose()?;

                Ok(KeyPair::from_bytes(
                    public.as_deref(),
                    private.as_deref().map(Vec::as_slice),
                )?
                .into())
            },
        }
    }

    /// Footer set on configuration, or the default one.
    pub fn footer(&self) -> Footer {
        self.footer.clone().map(Footer::new).unwrap_or_default()
    }

    /// Build the [`TokenService`] described by this section.
    pub fn build_service(&self) -> crate::error::Result<TokenService> {
        let keys = self.keys().inspect_err(|err| {
            tracing::error!(error = %err, mode = ?self.mode, "invalid `token` entry");
        })?;

        TokenService::new(keys, self.footer())
    }
}

impl Configuration {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml(document: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Configuration = serde_yaml::from_str(document)?;
        config.version = VERSION.to_owned();
        Ok(config)
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies the `TOKENKIT_KEY` override.
    pub fn read(self) -> Self {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            PathBuf::from(DEFAULT_CONFIG_PATH)
        };

        let config = match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(mut config) => {
                    // set app version.
                    config.version = VERSION.to_owned();
                    config.path = file_path;
                    config
                },
                Err(err) => Self::error(&file_path, err),
            },
            Err(err) => Self::error(&file_path, err),
        };

        config.apply_env(std::env::var(KEY_ENV).ok())
    }

    /// Replace `token.symmetric_key` with `key`, if any.
    fn apply_env(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self.token.get_or_insert_with(Token::default).symmetric_key = Some(key);
        }
        self
    }

    /// Crate version that loaded this configuration.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return a default configuration as fallback.
    fn error(path: &Path, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, path = %path.display(), "cannot load configuration file");
        Self {
            version: VERSION.to_owned(),
            path: path.to_path_buf(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::payload::PayloadOptions;

    const KEY: &str = "4242424242424242424242424242424242424242424242424242424242424242";

    const LOCAL: &str = r#"
name: tokenkit
token:
  mode: local
  symmetric_key: "4242424242424242424242424242424242424242424242424242424242424242"
  footer:
    app: billing
"#;

    const PUBLIC: &str = r#"
name: tokenkit
token:
  mode: public
  public_key: "1eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2"
  private_key: "b4cbfb43df4ce210727d953e4a713307fa19bb7d9f85041438d9e11b942a37741eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2"
"#;

    #[test]
    fn test_local_configuration() {
        let config = Configuration::from_yaml(LOCAL).unwrap();
        assert_eq!(config.name, "tokenkit");
        assert_eq!(config.version(), VERSION);

        let token = config.token.unwrap();
        assert_eq!(token.mode, Mode::Local);
        assert_eq!(token.footer().entries().get("app").map(String::as_str), Some("billing"));

        let service = token.build_service().unwrap();
        let issued = service
            .create_token(PayloadOptions::new().id("abc").duration(TimeDelta::minutes(1)))
            .unwrap();
        assert!(issued.starts_with("v2.local."));
        assert_eq!(service.verify_token(&issued).unwrap().id, "abc");
    }

    #[test]
    fn test_public_configuration() {
        let token = Configuration::from_yaml(PUBLIC).unwrap().token.unwrap();
        assert_eq!(token.mode, Mode::Public);
        assert_eq!(token.footer(), Footer::default());

        let service = token.build_service().unwrap();
        let issued = service
            .create_token(PayloadOptions::new().id("abc").duration(TimeDelta::minutes(1)))
            .unwrap();
        assert!(issued.starts_with("v2.public."));
    }

    #[test]
    fn test_missing_keys() {
        let local = Token::default();
        assert!(matches!(local.keys(), Err(KeyError::KeyLength { value: 0, .. })));
        assert!(local.build_service().unwrap_err().is_configuration());

        let public = Token {
            mode: Mode::Public,
            public_key: Some("1eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2".into()),
            ..Default::default()
        };
        assert!(matches!(public.keys(), Err(KeyError::MissingKey)));
    }

    #[test]
    fn test_invalid_hex() {
        let token = Token {
            symmetric_key: Some("not hex".into()),
            ..Default::default()
        };
        assert!(matches!(token.keys(), Err(KeyError::Hex(_))));
    }

    #[test]
    fn test_empty_footer_disables_it() {
        let token = Token {
            footer: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert_eq!(token.footer(), Footer::none());
    }

    #[test]
    fn test_missing_file_fallback() {
        let config = Configuration::default()
            .path("/nonexistent/tokenkit.yaml")
            .read();

        assert_eq!(config.version(), VERSION);
        assert_eq!(config.name, "");
        // not a file, so the default location was the one tried.
        assert_eq!(config.path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_env_key_without_file() {
        let config = Configuration::default()
            .path("/nonexistent/tokenkit.yaml")
            .read()
            .apply_env(Some(KEY.into()));

        let token = config.token.unwrap();
        assert_eq!(token.mode, Mode::Local);
        assert_eq!(token.symmetric_key.as_deref(), Some(KEY));

        let service = token.build_service().unwrap();
        let issued = service
            .create_token(PayloadOptions::new().id("abc").duration(TimeDelta::minutes(1)))
            .unwrap();
        assert_eq!(service.verify_token(&issued).unwrap().id, "abc");
    }

    #[test]
    fn test_env_key_replaces_file_key() {
        let key = "07".repeat(32);
        let config = Configuration::from_yaml(LOCAL).unwrap().apply_env(Some(key.clone()));

        let token = config.token.unwrap();
        assert_eq!(token.symmetric_key, Some(key));
        assert_eq!(token.footer().entries().get("app").map(String::as_str), Some("billing"));
        assert!(token.build_service().is_ok());
    }

    #[test]
    fn test_env_key_unset() {
        let config = Configuration::from_yaml(LOCAL).unwrap().apply_env(None);
        assert_eq!(config.token.unwrap().symmetric_key.as_deref(), Some(KEY));

        assert_eq!(Configuration::default().apply_env(None).token, None);
    }
}
