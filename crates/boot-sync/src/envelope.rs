//! Envelope codec
//!
//! Small files are encrypted by the key-management service and stored as
//! standard base64 text. Files above the policy threshold skip this path
//! entirely because KMS caps the encrypt payload size.

use crate::error::Result;
use crate::kms::KeyManagement;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::Zeroizing;

/// Largest file (in bytes) that is sent through KMS; AWS KMS accepts 4 KiB
pub const DEFAULT_MAX_ENCRYPTED_SIZE: u64 = 4000;

/// Size policy deciding which files are encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionPolicy {
    pub max_encrypted_size: u64,
}

impl EncryptionPolicy {
    pub fn new(max_encrypted_size: u64) -> Self {
        Self { max_encrypted_size }
    }

    /// Files at or below the threshold are encrypted
    pub fn should_encrypt(&self, size: u64) -> bool {
        size <= self.max_encrypted_size
    }
}

impl Default for EncryptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENCRYPTED_SIZE)
    }
}

/// Turns plaintext into storable envelope text and back
pub struct EnvelopeCodec<K> {
    kms: K,
}

impl<K: KeyManagement> EnvelopeCodec<K> {
    pub fn new(kms: K) -> Self {
        Self { kms }
    }

    /// Encrypt under `key_id` and encode the ciphertext as base64 text
    pub async fn encrypt(&self, plaintext: &[u8], key_id: &str) -> Result<String> {
        let ciphertext = self.kms.encrypt(key_id, plaintext).await?;
        Ok(BASE64.encode(ciphertext))
    }

    /// Decode envelope text and decrypt it
    ///
    /// Fails with [`SyncError::Decode`](crate::SyncError::Decode) on malformed text and
    /// [`SyncError::Kms`](crate::SyncError::Kms) when the service rejects the ciphertext.
    pub async fn decrypt(&self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let ciphertext = BASE64.decode(envelope)?;
        let plaintext = self.kms.decrypt(&ciphertext).await?;
        Ok(Zeroizing::new(plaintext))
    }
}

impl<K> std::fmt::Debug for EnvelopeCodec<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec").finish_non_exhaustive()
    }
}
