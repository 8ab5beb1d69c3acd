//! AWS KMS implementation of [`KeyManagement`]

use crate::error::{Result, SyncError};
use crate::kms::KeyManagement;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use tracing::debug;

/// KMS client wrapper
pub struct AwsKms {
    client: Client,
}

impl AwsKms {
    /// Build a client from shared SDK configuration
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl KeyManagement for AwsKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        debug!("KMS encrypt ({} bytes) with key {}", plaintext.len(), key_id);

        let resp = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .send()
            .await
            .map_err(|e| SyncError::kms("encrypt", e.into_service_error()))?;

        resp.ciphertext_blob
            .map(Blob::into_inner)
            .ok_or_else(|| SyncError::kms("encrypt", "response carried no ciphertext"))
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        debug!("KMS decrypt ({} bytes)", ciphertext.len());

        let resp = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|e| SyncError::kms("decrypt", e.into_service_error()))?;

        resp.plaintext
            .map(Blob::into_inner)
            .ok_or_else(|| SyncError::kms("decrypt", "response carried no plaintext"))
    }
}

impl std::fmt::Debug for AwsKms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsKms").finish_non_exhaustive()
    }
}
