//! PASETO version 2 envelope.
//!
//! A token is `v2.<purpose>.<base64url body>[.<base64url footer>]`. The footer
//! travels in clear but is bound to the token through the
//! pre-authentication encoding (PAE) of every authenticated piece.

pub mod local;
pub mod public;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use subtle::ConstantTimeEq;

/// Any reason a token could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("token header is not `{excepted}`")]
    Header { excepted: &'static str },
    #[error("token has an unexpected number of segments")]
    Segments,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error("token body is too short")]
    TooShort,
    #[error("footer does not match")]
    FooterMismatch,
    #[error("nonce derivation failed")]
    Nonce,
    #[error("aead seal or open failed")]
    Aead,
    #[error(transparent)]
    Signature(#[from] ed25519_dalek::SignatureError),
    #[error("authenticated payload is not valid json")]
    Payload(#[from] serde_json::Error),
}

/// Pre-Authentication Encoding.
///
/// Count of pieces, then each piece prefixed by its length. Every integer is a
/// little-endian u64 with the most significant bit cleared.
pub fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let size = 8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>();
    let mut out = Vec::with_capacity(size);

    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }

    out
}

fn le64(n: u64) -> [u8; 8] {
    (n & (u64::MAX >> 1)).to_le_bytes()
}

/// Join header, body and optional footer into the transmittable string.
fn assemble(header: &str, body: &[u8], footer: &[u8]) -> String {
    let mut token = format!("{header}{}", URL_SAFE_NO_PAD.encode(body));
    if !footer.is_empty() {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }
    token
}

/// Check header and footer, then return the decoded body.
fn open_envelope(
    token: &str,
    header: &'static str,
    footer: &[u8],
) -> Result<Vec<u8>, FormatError> {
    let rest = token
        .strip_prefix(header)
        .ok_or(FormatError::Header { excepted: header })?;

    let mut segments = rest.split('.');
    let body = segments.next().unwrap_or_default();
    let found_footer = match segments.next() {
        Some("") => return Err(FormatError::Segments),
        Some(encoded) => URL_SAFE_NO_PAD.decode(encoded)?,
        None => Vec::new(),
    };
    if segments.next().is_some() {
        return Err(FormatError::Segments);
    }

    if !bool::from(found_footer.as_slice().ct_eq(footer)) {
        return Err(FormatError::FooterMismatch);
    }

    Ok(URL_SAFE_NO_PAD.decode(body)?)
}
