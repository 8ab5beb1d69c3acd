//! Key-management capability
//!
//! The envelope codec only needs two primitives from a key-management
//! service. Keeping them behind a trait lets the sync core run against AWS
//! KMS in production and a local fake in tests.

pub mod aws;

use crate::error::Result;
use async_trait::async_trait;

/// Encrypt/decrypt primitives of a key-management service
#[async_trait]
pub trait KeyManagement: Send + Sync {
    /// Encrypt `plaintext` under the key identified by `key_id`
    ///
    /// Returns the raw ciphertext blob. Services cap the payload size, which
    /// is why only small files take this path.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext blob produced by [`KeyManagement::encrypt`]
    ///
    /// The blob identifies its own key, so no key id is passed. Any corruption
    /// or key mismatch must surface as an error, never as garbage plaintext.
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

#[async_trait]
impl<K: KeyManagement + ?Sized> KeyManagement for &K {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt(key_id, plaintext).await
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(ciphertext).await
    }
}

pub use aws::AwsKms;
