//! HMAC-SHA256 verification of webhook bodies.
//!
//! GitHub signs each delivery with the shared webhook secret and sends the
//! digest in `X-Hub-Signature-256` as `sha256=<hex>`. Verification runs
//! before the body is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix expected on the signature header.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Output length of HMAC-SHA256 in bytes.
pub const DIGEST_LEN: usize = 32;

/// Verify `signature_header` against `body` keyed by `secret`.
///
/// Returns `false` when:
/// - `secret` is empty (an unconfigured secret never disables verification)
/// - the header does not start with `sha256=`
/// - the remainder is not hex or does not decode to exactly 32 bytes
/// - the digest does not match
///
/// The digest comparison runs in constant time.
pub fn verify(signature_header: &str, body: &[u8], secret: &[u8]) -> bool {
    if secret.is_empty() {
        debug!("Rejecting signature: webhook secret is not configured");
        return false;
    }

    let Some(hex_part) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        debug!("Rejecting signature: missing sha256= prefix");
        return false;
    };

    let provided = match hex::decode(hex_part) {
        Ok(bytes) if bytes.len() == DIGEST_LEN => bytes,
        Ok(bytes) => {
            debug!(len = bytes.len(), "Rejecting signature: wrong digest length");
            return false;
        }
        Err(_) => {
            debug!("Rejecting signature: not valid hex");
            return false;
        }
    };

    let expected = compute_signature(body, secret);
    expected[..].ct_eq(&provided[..]).into()
}

/// Compute the raw HMAC-SHA256 digest of `body` keyed by `secret`.
pub fn compute_signature(body: &[u8], secret: &[u8]) -> [u8; DIGEST_LEN] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

/// Format a digest as a `sha256=<hex>` header value.
pub fn format_signature_header(digest: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest))
}

/// Compute the header value GitHub would send for `body`.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    format_signature_header(&compute_signature(body, secret))
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
