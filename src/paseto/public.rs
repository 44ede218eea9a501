//! `v2.public`: Ed25519 signatures over a clear message.

use ed25519_dalek::{SIGNATURE_LENGTH, Signature, Signer, SigningKey, VerifyingKey};

use super::{FormatError, assemble, open_envelope, pae};

pub const HEADER: &str = "v2.public.";

/// Sign `message`, binding `footer` to the signature.
pub fn sign(key: &SigningKey, message: &[u8], footer: &[u8]) -> String {
    let signature = key.sign(&pae(&[HEADER.as_bytes(), message, footer]));

    let mut body = Vec::with_capacity(message.len() + SIGNATURE_LENGTH);
    body.extend_from_slice(message);
    body.extend_from_slice(&signature.to_bytes());

    assemble(HEADER, &body, footer)
}

/// Verify a `v2.public` token and return the signed message.
pub fn verify(
    key: &VerifyingKey,
    token: &str,
    footer: &[u8],
) -> Result<Vec<u8>, FormatError> {
    let body = open_envelope(token, HEADER, footer)?;
    if body.len() < SIGNATURE_LENGTH {
        return Err(FormatError::TooShort);
    }

    let (message, signature) = body.split_at(body.len() - SIGNATURE_LENGTH);
    let signature = Signature::from_slice(signature)?;
    key.verify_strict(&pae(&[HEADER.as_bytes(), message, footer]), &signature)?;

    Ok(message.to_vec())
}
