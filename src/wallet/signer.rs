//! Signer capability seam and signature placement.
//!
//! The actual signature scheme (key derivation, curve math) is an
//! external capability consumed through [`TransactionSigner`]; this
//! module only knows where the signature lives inside the transaction
//! bytes.

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::util::hex;

/// Byte offset of the signature window inside transaction bytes.
pub const SIGNATURE_OFFSET_BYTES: usize = 96;

/// Length of the signature window, in bytes.
pub const SIGNATURE_LENGTH_BYTES: usize = 64;

const SIG_HEX_START: usize = SIGNATURE_OFFSET_BYTES * 2;
const SIG_HEX_END: usize = (SIGNATURE_OFFSET_BYTES + SIGNATURE_LENGTH_BYTES) * 2;

/// Capability that signs unsigned transaction bytes.
///
/// Implementations return the raw 64-byte signature as 128 hex
/// characters; the SDK splices it into place.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_bytes(&self, unsigned_hex: &str) -> ClientResult<String>;
}

/// Replace the signature window of `unsigned_hex` with
/// `signature_hex`, yielding the signed transaction bytes.
pub fn apply_signature(unsigned_hex: &str, signature_hex: &str) -> ClientResult<String> {
    if !hex::is_hex(unsigned_hex) || unsigned_hex.len() < SIG_HEX_END {
        return Err(ClientError::InvalidHex(format!(
            "unsigned transaction bytes too short for a signature window: {} hex chars",
            unsigned_hex.len()
        )));
    }
    if !hex::is_hex(signature_hex) || signature_hex.len() != SIGNATURE_LENGTH_BYTES * 2 {
        return Err(ClientError::InvalidHex(format!(
            "signature must be {} hex chars, got {}",
            SIGNATURE_LENGTH_BYTES * 2,
            signature_hex.len()
        )));
    }
    Ok(format!(
        "{}{}{}",
        &unsigned_hex[..SIG_HEX_START],
        signature_hex,
        &unsigned_hex[SIG_HEX_END..]
    ))
}

/// Read the signature window back out of signed transaction bytes.
pub fn extract_signature(signed_hex: &str) -> ClientResult<&str> {
    if !hex::is_hex(signed_hex) || signed_hex.len() < SIG_HEX_END {
        return Err(ClientError::InvalidHex(format!(
            "signed transaction bytes too short: {} hex chars",
            signed_hex.len()
        )));
    }
    Ok(&signed_hex[SIG_HEX_START..SIG_HEX_END])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_extract() {
        let unsigned = format!("{}{}{}", "ab".repeat(96), "00".repeat(64), "cd".repeat(10));
        let signature = "1f".repeat(64);

        let signed = apply_signature(&unsigned, &signature).unwrap();
        assert_eq!(signed.len(), unsigned.len());
        assert_eq!(&signed[..192], "ab".repeat(96));
        assert_eq!(extract_signature(&signed).unwrap(), signature);
        assert_eq!(&signed[320..], "cd".repeat(10));
    }

    #[test]
    fn test_rejects_short_or_bad_input() {
        assert!(apply_signature("abcd", &"1f".repeat(64)).is_err());
        let unsigned = "ab".repeat(170);
        assert!(apply_signature(&unsigned, "1f1f").is_err());
        assert!(apply_signature(&unsigned, &"zz".repeat(64)).is_err());
        assert!(extract_signature("beef").is_err());
    }
}
