//! Fake key-management service for testing
//!
//! Ciphertext is `FAKE:<key-id>:` followed by the plaintext XORed with a
//! fixed byte, so it round-trips but is never equal to the plaintext.

use async_trait::async_trait;
use boot_sync::{KeyManagement, Result, SyncError};
use std::sync::{Arc, Mutex};

const TAG: &[u8] = b"FAKE:";
const MASK: u8 = 0xa5;

#[derive(Clone, Default)]
pub struct FakeKms {
    calls: Arc<Mutex<Vec<String>>>,
    known_key: Option<String>,
}

impl FakeKms {
    /// Accepts any key id
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects encrypt calls for any other key id
    pub fn with_key(key_id: &str) -> Self {
        Self {
            known_key: Some(key_id.to_string()),
            ..Default::default()
        }
    }

    /// Build a ciphertext without recording a call
    pub fn seal(key_id: &str, plaintext: &[u8]) -> Vec<u8> {
        let mut blob = TAG.to_vec();
        blob.extend_from_slice(key_id.as_bytes());
        blob.push(b':');
        blob.extend(plaintext.iter().map(|b| b ^ MASK));
        blob
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl KeyManagement for FakeKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.record(format!("encrypt:{}:{}", key_id, plaintext.len()));
        if let Some(known) = &self.known_key {
            if known != key_id {
                return Err(SyncError::kms("encrypt", format!("NotFoundException: {}", key_id)));
            }
        }
        Ok(Self::seal(key_id, plaintext))
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.record(format!("decrypt:{}", ciphertext.len()));
        let rest = ciphertext
            .strip_prefix(TAG)
            .ok_or_else(|| SyncError::kms("decrypt", "InvalidCiphertextException"))?;
        let split = rest
            .iter()
            .position(|b| *b == b':')
            .ok_or_else(|| SyncError::kms("decrypt", "InvalidCiphertextException"))?;
        Ok(rest[split + 1..].iter().map(|b| b ^ MASK).collect())
    }
}
