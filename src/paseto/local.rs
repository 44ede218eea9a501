//! `v2.local`: XChaCha20-Poly1305 with a BLAKE2b-derived nonce.

use blake2::Blake2bMac;
use blake2::digest::Mac;
use blake2::digest::consts::U24;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;

use super::{FormatError, assemble, open_envelope, pae};
use crate::crypto::SymmetricKey;

pub const HEADER: &str = "v2.local.";
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

/// Encrypt `message`, binding `footer` to the ciphertext.
pub fn encrypt(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
) -> Result<String, FormatError> {
    let mut seed = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut seed);

    seal(key, message, footer, &seed)
}

fn seal(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    seed: &[u8; NONCE_SIZE],
) -> Result<String, FormatError> {
    // Nonce misuse resistance: the nonce also depends on the message.
    let mut mac = Blake2bMac::<U24>::new_with_salt_and_personal(seed, &[], &[])
        .map_err(|_| FormatError::Nonce)?;
    mac.update(message);
    let nonce = mac.finalize().into_bytes();

    let aad = pae(&[HEADER.as_bytes(), nonce.as_slice(), footer]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: message, aad: &aad })
        .map_err(|_| FormatError::Aead)?;

    let mut body = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    body.extend_from_slice(&nonce);
    body.extend_from_slice(&ciphertext);

    Ok(assemble(HEADER, &body, footer))
}

/// Authenticate and decrypt a `v2.local` token.
pub fn decrypt(
    key: &SymmetricKey,
    token: &str,
    footer: &[u8],
) -> Result<Vec<u8>, FormatError> {
    let body = open_envelope(token, HEADER, footer)?;
    if body.len() < NONCE_SIZE + TAG_SIZE {
        return Err(FormatError::TooShort);
    }

    let (nonce, ciphertext) = body.split_at(NONCE_SIZE);
    let aad = pae(&[HEADER.as_bytes(), nonce, footer]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad: &aad })
        .map_err(|_| FormatError::Aead)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SymmetricKey {
        SymmetricKey::from_bytes([0x42; 32]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let token = encrypt(&key(), b"{\"id\":\"abc\"}", b"footer").unwrap();
        assert!(token.starts_with(HEADER));

        let plain = decrypt(&key(), &token, b"footer").unwrap();
        assert_eq!(plain, b"{\"id\":\"abc\"}");
    }

    #[test]
    fn test_nonce_depends_on_message() {
        let seed = [7u8; NONCE_SIZE];
        let a = seal(&key(), b"first", b"", &seed).unwrap();
        let b = seal(&key(), b"second", b"", &seed).unwrap();

        // First 32 base64 chars after the header cover the 24 nonce bytes.
        assert_ne!(a[HEADER.len()..HEADER.len() + 32], b[HEADER.len()..HEADER.len() + 32]);
    }

    #[test]
    fn test_wrong_key() {
        let token = encrypt(&key(), b"secret", b"").unwrap();
        let other = SymmetricKey::from_bytes([0x24; 32]).unwrap();

        assert!(matches!(decrypt(&other, &token, b""), Err(FormatError::Aead)));
    }

    #[test]
    fn test_truncated_body() {
        assert!(matches!(
            decrypt(&key(), "v2.local.AAAA", b""),
            Err(FormatError::TooShort)
        ));
    }
}
