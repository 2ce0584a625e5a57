//! Shared-secret check for mutating requests.
//!
//! Requests carry the secret in a `Password` field. There is no session model:
//! each protected call is checked on its own.

use crate::error::{FolioError, FolioResult};
use sha2::{Digest, Sha256};

/// The configured secret, kept only as a digest.
#[derive(Clone)]
pub struct Credentials {
    digest: Option<[u8; 32]>,
}

impl Credentials {
    /// `None` or an empty secret disables every protected operation.
    pub fn new(secret: Option<&str>) -> Self {
        let digest = secret.filter(|s| !s.is_empty()).map(digest);
        Self { digest }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Compare a candidate with the secret.
    ///
    /// Both sides are hashed first so the byte comparison always covers the
    /// full 32 bytes regardless of where the inputs differ.
    pub fn matches(&self, candidate: &str) -> bool {
        let Some(expected) = &self.digest else {
            return false;
        };
        let given = digest(candidate);
        expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// `Ok` when `candidate` is present and correct.
    pub fn verify(&self, candidate: Option<&str>) -> FolioResult<()> {
        match candidate {
            Some(c) if self.matches(c) => Ok(()),
            _ => {
                tracing::warn!(configured = self.is_configured(), "Rejected password");
                Err(FolioError::InvalidPassword)
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
