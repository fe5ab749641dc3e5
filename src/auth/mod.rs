//! Password gate for the backoffice.
//!
//! The entered password is hashed with SHA-256 and compared in constant time
//! against a configured digest. This gates a view transition only.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Proof that the password gate was passed.
///
/// Only [`PasswordGate::unlock`] constructs it.
#[derive(Debug, Clone)]
pub struct AdminAccess {
    _private: (),
}

/// Holds the expected password digest.
#[derive(Clone)]
pub struct PasswordGate {
    digest: [u8; 32],
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate").finish_non_exhaustive()
    }
}

impl PasswordGate {
    /// Build a gate from a hex SHA-256 digest.
    pub fn from_hex(hex_digest: &str) -> Result<Self, AppError> {
        let bytes = hex::decode(hex_digest.trim())
            .map_err(|e| AppError::Validation(format!("Invalid admin digest: {}", e)))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| {
            AppError::Validation("Admin digest must be 32 bytes of hex".to_string())
        })?;
        Ok(Self { digest })
    }

    /// Check a password without granting access.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = hash_password(password);
        candidate[..].ct_eq(&self.digest[..]).into()
    }

    /// Exchange a correct password for backoffice access.
    pub fn unlock(&self, password: &str) -> Result<AdminAccess, AppError> {
        if self.verify(password) {
            tracing::info!("Backoffice unlocked");
            Ok(AdminAccess { _private: () })
        } else {
            tracing::warn!("Backoffice password rejected");
            Err(AppError::Unauthorized("Wrong password".to_string()))
        }
    }
}

fn hash_password(password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Hex digest of a password, for configuring `RUIDOS_ADMIN_DIGEST`.
pub fn password_digest(password: &str) -> String {
    hex::encode(hash_password(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ADMIN_DIGEST;

    #[test]
    fn test_default_digest_accepts_bundled_password() {
        let gate = PasswordGate::from_hex(DEFAULT_ADMIN_DIGEST).unwrap();
        assert!(gate.verify("atmosfera"));
        assert!(gate.unlock("atmosfera").is_ok());
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let gate = PasswordGate::from_hex(DEFAULT_ADMIN_DIGEST).unwrap();
        assert!(!gate.verify("wrong"));
        assert!(!gate.verify(""));
        let err = gate.unlock("Atmosfera").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_digest_round_trip() {
        let digest = password_digest("wrong");
        assert_eq!(
            digest,
            "8810ad581e59f2bc3928b261707a71308f7e139eb04820366dc4d5c18d980225"
        );
        let gate = PasswordGate::from_hex(&digest).unwrap();
        assert!(gate.verify("wrong"));
    }

    #[test]
    fn test_malformed_digest() {
        assert!(PasswordGate::from_hex("zz").is_err());
        assert!(PasswordGate::from_hex("abcd").is_err());
    }
}
