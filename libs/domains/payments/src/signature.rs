//! HMAC-SHA256 signing for gateway callbacks.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with the shared key secret
//! and sends the lowercase hex digest back to us. Verification recomputes the
//! digest locally and compares in constant time.

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, PaymentResult};

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 signature for an order/payment pair.
pub fn compute_signature(secret: &str, order_id: &str, payment_id: &str) -> PaymentResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(format!("Invalid signing key: {}", e)))?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

/// Check a signature supplied by the gateway against the locally computed one.
///
/// The comparison is constant-time so the check leaks nothing about how many
/// leading characters matched.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    provided: &str,
) -> PaymentResult<bool> {
    let expected = compute_signature(secret, order_id, payment_id)?;
    Ok(constant_time_eq(expected.as_bytes(), provided.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_signing_secret";

    #[test]
    fn test_signature_is_deterministic() {
        let first = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();
        let second = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64, "HMAC-SHA256 hex digest should be 64 chars");
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signature_depends_on_both_ids() {
        let base = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();
        let other_order = compute_signature(SECRET, "order_def", "pay_xyz").unwrap();
        let other_payment = compute_signature(SECRET, "order_abc", "pay_uvw").unwrap();

        assert_ne!(base, other_order);
        assert_ne!(base, other_payment);
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let signature = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();

        assert!(verify_signature(SECRET, "order_abc", "pay_xyz", &signature).unwrap());
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let mut signature = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();
        // Flip the last hex character
        let last = if signature.ends_with('0') { '1' } else { '0' };
        signature.pop();
        signature.push(last);

        assert!(!verify_signature(SECRET, "order_abc", "pay_xyz", &signature).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signature = compute_signature("other_secret", "order_abc", "pay_xyz").unwrap();

        assert!(!verify_signature(SECRET, "order_abc", "pay_xyz", &signature).unwrap());
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let signature = compute_signature(SECRET, "order_abc", "pay_xyz").unwrap();

        assert!(!verify_signature(SECRET, "order_abc", "pay_xyz", &signature.to_uppercase()).unwrap());
    }
}
