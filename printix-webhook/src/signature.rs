//! HMAC-SHA512 webhook signatures.
//!
//! Printix signs `<timestamp>.<raw body>` with the shared secret and sends the
//! lowercase hex digest in `X-Printix-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Length of a hex-encoded HMAC-SHA512 digest.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// The exact byte string that is signed: the timestamp header value as
/// received, a literal `.`, then the untouched body bytes.
#[derive(Debug, Clone, Copy)]
pub struct SignedPayload<'a> {
    pub timestamp: &'a str,
    pub body: &'a [u8],
}

impl<'a> SignedPayload<'a> {
    pub fn new(timestamp: &'a str, body: &'a [u8]) -> Self {
        Self { timestamp, body }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.timestamp.len() + 1 + self.body.len());
        bytes.extend_from_slice(self.timestamp.as_bytes());
        bytes.push(b'.');
        bytes.extend_from_slice(self.body);
        bytes
    }
}

/// Compute the lowercase hex HMAC-SHA512 of `payload` under `secret`.
pub fn sign(payload: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature` against the digest of `payload` under `secret`.
///
/// The comparison runs in constant time over the hex strings. An empty or
/// malformed signature simply does not match.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    if signature.is_empty() {
        return false;
    }
    let expected = sign(payload, secret);
    if expected.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
