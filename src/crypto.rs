//! Key material used to seal and open tokens.

use std::fmt;

use ed25519_dalek::{
    KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SigningKey,
    VerifyingKey,
};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Required length of a symmetric key, in bytes.
pub const KEY_LENGTH: usize = 32;

type Result<T> = std::result::Result<T, KeyError>;

#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    #[error("invalid key size: must be exactly {excepted} bytes, got {value}")]
    KeyLength { value: usize, excepted: usize },
    #[error("private/public key should not be null")]
    MissingKey,
    #[error(transparent)]
    Ed25519(#[from] ed25519_dalek::SignatureError),
    #[error("public key does not match private key")]
    Mismatch,
    #[error("hex is not valid")]
    Hex(#[from] hex::FromHexError),
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| KeyError::KeyLength {
        value: bytes.len(),
        excepted: N,
    })
}

/// SymmetricKey holds a fixed-size key protected by Zeroizing.
#[derive(Clone)]
pub struct SymmetricKey(Zeroizing<[u8; KEY_LENGTH]>);

impl SymmetricKey {
    /// Create from raw bytes (must be 32 bytes).
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self(Zeroizing::new(fixed::<KEY_LENGTH>(bytes.as_ref())?)))
    }

    /// Create from an hex-encoded string.
    pub fn from_hex(data: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(data)?);
        Self::from_bytes(bytes.as_slice())
    }

    /// Generate a random key from the OS entropy pool.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        OsRng.fill_bytes(key.as_mut_slice());
        Self(key)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Hex representation, meant to be written to a configuration file.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Ed25519 signing and verifying keys.
#[derive(Clone, Debug)]
pub struct KeyPair {
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl KeyPair {
    /// Build a [`KeyPair`] from raw bytes.
    ///
    /// The private key is either the 32 bytes seed or the 64 bytes
    /// `seed || public` form. Both keys are required and must belong together.
    pub fn from_bytes(
        public: Option<&[u8]>,
        private: Option<&[u8]>,
    ) -> Result<Self> {
        let (Some(public), Some(private)) = (public, private) else {
            return Err(KeyError::MissingKey);
        };
        if public.is_empty() || private.is_empty() {
            return Err(KeyError::MissingKey);
        }

        let verifying =
            VerifyingKey::from_bytes(&fixed::<PUBLIC_KEY_LENGTH>(public)?)?;
        let signing = match private.len() {
            KEYPAIR_LENGTH => SigningKey::from_keypair_bytes(&fixed::<
                KEYPAIR_LENGTH,
            >(private)?)?,
            _ => SigningKey::from_bytes(&fixed::<SECRET_KEY_LENGTH>(private)?),
        };

        if signing.verifying_key() != verifying {
            return Err(KeyError::Mismatch);
        }

        Ok(Self { signing, verifying })
    }

    /// Build a [`KeyPair`] from hex-encoded keys.
    pub fn from_hex(public: &str, private: &str) -> Result<Self> {
        let public = hex::decode(public)?;
        let private = Zeroizing::new(hex::decode(private)?);

        Self::from_bytes(Some(public.as_slice()), Some(private.as_slice()))
    }

    /// Generate a random key pair from the OS entropy pool.
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        OsRng.fill_bytes(seed.as_mut_slice());

        let signing = SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        Self { signing, verifying }
    }

    /// Public key bytes.
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying.to_bytes()
    }

    /// Private key in its 64 bytes `seed || public` form.
    pub fn private_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.signing.to_keypair_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }
}

/// Key material of a token service. The variant fixes the operating mode.
#[derive(Clone, Debug)]
pub enum Keys {
    /// Encrypt-then-authenticate with one shared secret (`v2.local`).
    Symmetric(SymmetricKey),
    /// Sign with the private key, verify with the public one (`v2.public`).
    Asymmetric(KeyPair),
}

impl Keys {
    /// PASETO purpose matching the key material.
    pub fn purpose(&self) -> &'static str {
        match self {
            Keys::Symmetric(_) => "local",
            Keys::Asymmetric(_) => "public",
        }
    }
}

impl From<SymmetricKey> for Keys {
    fn from(key: SymmetricKey) -> Self {
        Keys::Symmetric(key)
    }
}

impl From<KeyPair> for Keys {
    fn from(pair: KeyPair) -> Self {
        Keys::Asymmetric(pair)
    }
}

/// Generate a random identifier (UUID v4), suitable as a token ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
