// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signing key lifecycle management.
//!
//! Keys are generated here and never leave the manager in private form:
//! token signing borrows the private material, everything else sees only
//! the public half. Rotation retires the previous key instead of deleting
//! it, so tokens signed before the rotation keep verifying until the
//! retired key is explicitly purged.

use std::sync::Arc;

use chrono::{Duration, Utc};
use ed25519_dalek::pkcs8::EncodePrivateKey;
use rand::rngs::OsRng;
use tracing::info;
use uuid::Uuid;

use ward_core::error::{IamError, IamResult, TokenError};
use ward_core::types::{KeyAlgorithm, KeyPurpose, SigningKey};
use ward_store::KeyStore;

use crate::config::KeyConfig;

// =============================================================================
// SigningKeyManager
// =============================================================================

/// Manages the signing key lifecycle: generation, rotation and purge.
#[derive(Clone)]
pub struct SigningKeyManager {
    store: Arc<dyn KeyStore>,
    config: KeyConfig,
}

impl SigningKeyManager {
    /// Creates a manager over the given key store.
    pub fn new(store: Arc<dyn KeyStore>, config: KeyConfig) -> Self {
        Self { store, config }
    }

    /// Rotates the signing key for a purpose.
    ///
    /// Generates a fresh Ed25519 key pair, activates it and retires the
    /// previous ACTIVE key in one atomic step. With `skip_if_present` set,
    /// an existing ACTIVE key is returned unchanged, which makes startup
    /// bootstrapping idempotent: racing bootstrappers all come away with
    /// the same key, decided inside the store.
    pub async fn rotate_key(
        &self,
        purpose: KeyPurpose,
        skip_if_present: bool,
    ) -> IamResult<SigningKey> {
        if skip_if_present {
            if let Some(active) = self.store.get_active(purpose).await? {
                return Ok(active);
            }
            // The check above is only a fast path; another bootstrapper
            // may install a key between it and our insert. The store
            // resolves the race and every caller gets the winner.
            let candidate = generate_key(purpose)?;
            let candidate_id = candidate.key_id.clone();
            let key = self.store.insert_active_if_absent(candidate).await?;
            if key.key_id == candidate_id {
                info!(key_id = %key.key_id, purpose = purpose.as_str(), "signing key rotated");
            }
            return Ok(key);
        }

        let key = generate_key(purpose)?;
        let key = self.store.insert_active_and_retire_previous(key).await?;
        info!(key_id = %key.key_id, purpose = purpose.as_str(), "signing key rotated");
        Ok(key)
    }

    /// Returns the ACTIVE key for a purpose.
    ///
    /// A missing active key is an operational fault, not a client error.
    pub async fn get_active_key(&self, purpose: KeyPurpose) -> IamResult<SigningKey> {
        self.store
            .get_active(purpose)
            .await?
            .ok_or_else(|| IamError::internal(format!("no active {} key", purpose.as_str())))
    }

    /// Returns the key with the given id, active or retired.
    pub async fn get_key_by_id(&self, key_id: &str) -> IamResult<SigningKey> {
        self.store
            .get_by_id(key_id)
            .await?
            .ok_or_else(|| TokenError::unknown_key(key_id).into())
    }

    /// Deletes retired keys older than the configured retention period.
    ///
    /// Purging is always explicit; rotation alone never destroys key
    /// material. Returns the number of keys removed.
    pub async fn purge_retired(&self, purpose: KeyPurpose) -> IamResult<usize> {
        let cutoff = Utc::now() - Duration::seconds(self.config.retired_retention_secs);
        let removed = self.store.delete_retired_before(purpose, cutoff).await?;
        if removed > 0 {
            info!(purpose = purpose.as_str(), removed, "retired signing keys purged");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for SigningKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyManager")
            .field("retired_retention_secs", &self.config.retired_retention_secs)
            .finish()
    }
}

/// Generates a fresh Ed25519 key pair.
///
/// The private half is stored as PKCS#8 DER, the public half as the raw
/// 32-byte Ed25519 point, matching what the token codec expects.
fn generate_key(purpose: KeyPurpose) -> IamResult<SigningKey> {
    let secret = ed25519_dalek::SigningKey::generate(&mut OsRng);
    let private = secret
        .to_pkcs8_der()
        .map_err(|e| TokenError::signing(format!("key encoding failed: {e}")))?
        .as_bytes()
        .to_vec();
    let public = secret.verifying_key().to_bytes().to_vec();

    Ok(SigningKey::new(
        Uuid::now_v7().to_string(),
        KeyAlgorithm::Ed25519,
        purpose,
        private,
        public,
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ward_core::types::KeyStatus;
    use ward_store::MemoryKeyStore;

    fn manager(retention_secs: i64) -> SigningKeyManager {
        SigningKeyManager::new(
            Arc::new(MemoryKeyStore::new()),
            KeyConfig {
                retired_retention_secs: retention_secs,
            },
        )
    }

    #[tokio::test]
    async fn test_rotation_retires_previous_key() {
        let manager = manager(86400);

        let first = manager
            .rotate_key(KeyPurpose::TokenSigning, false)
            .await
            .unwrap();
        let second = manager
            .rotate_key(KeyPurpose::TokenSigning, false)
            .await
            .unwrap();
        assert_ne!(first.key_id, second.key_id);

        let active = manager
            .get_active_key(KeyPurpose::TokenSigning)
            .await
            .unwrap();
        assert_eq!(active.key_id, second.key_id);

        let retired = manager.get_key_by_id(&first.key_id).await.unwrap();
        assert_eq!(retired.status, KeyStatus::Retired);
    }

    #[tokio::test]
    async fn test_skip_if_present_is_idempotent() {
        let manager = manager(86400);

        let first = manager
            .rotate_key(KeyPurpose::TokenSigning, true)
            .await
            .unwrap();
        let again = manager
            .rotate_key(KeyPurpose::TokenSigning, true)
            .await
            .unwrap();
        assert_eq!(first.key_id, again.key_id);
    }

    #[tokio::test]
    async fn test_concurrent_bootstrap_yields_one_key() {
        // Many processes racing the idempotent bootstrap must all end up
        // holding the single key that won, never a silently retired one.
        for _ in 0..16 {
            let manager = manager(86400);

            let mut handles = Vec::new();
            for _ in 0..8 {
                let manager = manager.clone();
                handles.push(tokio::spawn(async move {
                    manager
                        .rotate_key(KeyPurpose::TokenSigning, true)
                        .await
                        .unwrap()
                }));
            }

            let mut ids = Vec::new();
            for handle in handles {
                ids.push(handle.await.unwrap().key_id);
            }

            let active = manager
                .get_active_key(KeyPurpose::TokenSigning)
                .await
                .unwrap();
            assert!(ids.iter().all(|id| id == &active.key_id), "ids: {ids:?}");
        }
    }

    #[tokio::test]
    async fn test_purge_spares_the_active_key() {
        let manager = manager(0);

        let first = manager
            .rotate_key(KeyPurpose::TokenSigning, false)
            .await
            .unwrap();
        let second = manager
            .rotate_key(KeyPurpose::TokenSigning, false)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let removed = manager.purge_retired(KeyPurpose::TokenSigning).await.unwrap();
        assert_eq!(removed, 1);

        assert!(manager.get_key_by_id(&first.key_id).await.is_err());
        assert!(manager.get_key_by_id(&second.key_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_active_key_is_an_error() {
        let manager = manager(86400);
        let err = manager
            .get_active_key(KeyPurpose::TokenSigning)
            .await
            .unwrap_err();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_generated_material_shapes() {
        let key = generate_key(KeyPurpose::TokenSigning).unwrap();
        assert_eq!(key.public_material.len(), 32);
        // PKCS#8 v2 Ed25519 documents embed the public key: 83 bytes.
        assert_eq!(key.private_material().len(), 83);
    }
}
