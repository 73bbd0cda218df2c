// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance and verification.
//!
//! Access tokens are Ed25519-signed JWTs with a deliberately narrow claim
//! set. The signing key id travels in the JOSE header, so verification can
//! look up the exact key a token was signed with and keep honoring tokens
//! issued before a rotation. Refresh credentials are opaque random secrets;
//! only their hash is persisted.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use ward_core::error::{IamResult, TokenError};
use ward_core::hrn::ResourceHrn;
use ward_core::types::{CredentialStatus, KeyPurpose, RefreshCredentialRecord};
use ward_store::CredentialStore;

use crate::config::TokenConfig;
use crate::keys::SigningKeyManager;

// =============================================================================
// TokenClaims
// =============================================================================

/// The claim set of an access token.
///
/// Deliberately narrow: these five claims are everything the engine
/// interprets. Anything else a caller wants to carry must travel outside
/// the token, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the acting principal's HRN.
    pub sub: String,
    /// Originating leader of a delegated session, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obo: Option<String>,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Id of the signing key that produced the signature.
    pub kid: String,
}

impl TokenClaims {
    /// Parses the subject claim back into an HRN.
    pub fn subject_hrn(&self) -> IamResult<ResourceHrn> {
        Ok(ResourceHrn::parse(&self.sub)?)
    }

    /// Parses the on-behalf-of claim back into an HRN, if present.
    pub fn on_behalf_of_hrn(&self) -> IamResult<Option<ResourceHrn>> {
        match &self.obo {
            Some(leader) => Ok(Some(ResourceHrn::parse(leader)?)),
            None => Ok(None),
        }
    }

    /// Returns the expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A freshly issued access token with its decoded claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The serialized JWT.
    pub token: String,
    /// The claims baked into it.
    pub claims: TokenClaims,
}

impl IssuedToken {
    /// Returns the id of the key that signed the token.
    pub fn key_id(&self) -> &str {
        &self.claims.kid
    }
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and verifies access tokens, and manages refresh credentials.
#[derive(Clone)]
pub struct TokenService {
    keys: SigningKeyManager,
    credentials: Arc<dyn CredentialStore>,
    config: TokenConfig,
}

impl TokenService {
    /// Creates a token service.
    pub fn new(
        keys: SigningKeyManager,
        credentials: Arc<dyn CredentialStore>,
        config: TokenConfig,
    ) -> Self {
        Self {
            keys,
            credentials,
            config,
        }
    }

    /// Issues an access token with the configured default lifetime.
    pub async fn issue(
        &self,
        subject: &ResourceHrn,
        on_behalf_of: Option<&ResourceHrn>,
    ) -> IamResult<IssuedToken> {
        self.issue_with_ttl(subject, on_behalf_of, self.config.access_ttl_secs)
            .await
    }

    /// Issues an access token with an explicit lifetime in seconds.
    ///
    /// Lifetimes above the configured default are clamped down to it. A
    /// non-positive lifetime is honored literally: the token comes out
    /// already expired and verification is the enforcement point.
    pub async fn issue_with_ttl(
        &self,
        subject: &ResourceHrn,
        on_behalf_of: Option<&ResourceHrn>,
        ttl_secs: i64,
    ) -> IamResult<IssuedToken> {
        let ttl_secs = ttl_secs.min(self.config.access_ttl_secs);

        let key = self.keys.get_active_key(KeyPurpose::TokenSigning).await?;
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            obo: on_behalf_of.map(ToString::to_string),
            iat: now,
            exp: now + ttl_secs,
            kid: key.key_id.clone(),
        };

        // kid rides in the JOSE header as well, so verifiers can pick the
        // key before touching the payload.
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(key.key_id.clone());

        let encoding_key = EncodingKey::from_ed_der(key.private_material());
        let token = encode(&header, &claims, &encoding_key)
            .map_err(|e| TokenError::signing(format!("token encoding failed: {e}")))?;

        debug!(subject = %subject, key_id = %key.key_id, "access token issued");
        Ok(IssuedToken { token, claims })
    }

    /// Verifies a token and returns its claims.
    ///
    /// The key is resolved from the `kid` header, so tokens signed by a
    /// retired key still verify until that key is purged.
    pub async fn verify(&self, token: &str) -> IamResult<TokenClaims> {
        let header =
            decode_header(token).map_err(|e| TokenError::invalid(format!("bad header: {e}")))?;
        let key_id = header
            .kid
            .ok_or_else(|| TokenError::invalid("missing key id"))?;

        let key = self.keys.get_key_by_id(&key_id).await?;
        let decoding_key = DecodingKey::from_ed_der(&key.public_material);

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.leeway = self.config.leeway_secs;

        let data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    TokenError::invalid("signature does not verify")
                }
                _ => TokenError::invalid(format!("verification failed: {e}")),
            }
        })?;

        let claims = data.claims;
        if claims.kid != key_id {
            return Err(TokenError::invalid("key id mismatch").into());
        }
        if claims.subject_hrn().is_err() || claims.on_behalf_of_hrn().is_err() {
            return Err(TokenError::invalid("malformed principal claim").into());
        }
        Ok(claims)
    }

    /// Issues a refresh credential for a subject.
    ///
    /// Returns the plaintext secret exactly once; only its hash is stored.
    pub async fn issue_refresh_credential(&self, subject: &ResourceHrn) -> IamResult<String> {
        let mut bytes = vec![0u8; self.config.refresh_secret_bytes];
        OsRng.fill_bytes(&mut bytes);
        let secret = URL_SAFE_NO_PAD.encode(&bytes);

        let record = RefreshCredentialRecord {
            id: Uuid::now_v7().to_string(),
            subject_hrn: subject.clone(),
            secret_hash: hash_secret(&secret),
            status: CredentialStatus::Active,
            created_at: Utc::now(),
        };
        self.credentials.insert(record).await?;

        debug!(subject = %subject, "refresh credential issued");
        Ok(secret)
    }

    /// Redeems a refresh credential, returning the subject it is bound to.
    ///
    /// Unknown and revoked credentials fail identically so a caller cannot
    /// probe which secrets ever existed.
    pub async fn redeem_refresh_credential(&self, secret: &str) -> IamResult<ResourceHrn> {
        let record = self
            .credentials
            .find_by_hash(&hash_secret(secret))
            .await?
            .filter(|record| record.status == CredentialStatus::Active)
            .ok_or(TokenError::InvalidCredential)?;
        Ok(record.subject_hrn)
    }

    /// Revokes a single refresh credential by its plaintext secret.
    pub async fn revoke_refresh_credential(&self, secret: &str) -> IamResult<bool> {
        Ok(self.credentials.revoke_by_hash(&hash_secret(secret)).await?)
    }

    /// Revokes every refresh credential bound to a subject.
    pub async fn revoke_all_refresh_credentials(
        &self,
        subject: &ResourceHrn,
    ) -> IamResult<usize> {
        Ok(self.credentials.revoke_all_for(subject).await?)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .finish()
    }
}

/// SHA-256 of the secret, base64url-encoded.
fn hash_secret(secret: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(secret.as_bytes()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ward_core::error::IamError;
    use ward_store::{MemoryCredentialStore, MemoryKeyStore};

    use crate::config::KeyConfig;

    fn service() -> TokenService {
        let keys = SigningKeyManager::new(Arc::new(MemoryKeyStore::new()), KeyConfig::default());
        TokenService::new(
            keys,
            Arc::new(MemoryCredentialStore::new()),
            TokenConfig::default(),
        )
    }

    fn alice() -> ResourceHrn {
        ResourceHrn::user("acme", None::<String>, "alice").unwrap()
    }

    async fn bootstrap(service: &TokenService) {
        service
            .keys
            .rotate_key(KeyPurpose::TokenSigning, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_issue_and_verify_roundtrip() {
        let service = service();
        bootstrap(&service).await;

        let issued = service.issue(&alice(), None).await.unwrap();
        let claims = service.verify(&issued.token).await.unwrap();

        assert_eq!(claims.subject_hrn().unwrap(), alice());
        assert!(claims.obo.is_none());
        assert_eq!(claims.kid, issued.key_id());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_on_behalf_of_claim_roundtrip() {
        let service = service();
        bootstrap(&service).await;

        let bob = ResourceHrn::user("acme", None::<String>, "bob").unwrap();
        let issued = service.issue(&bob, Some(&alice())).await.unwrap();
        let claims = service.verify(&issued.token).await.unwrap();

        assert_eq!(claims.on_behalf_of_hrn().unwrap(), Some(alice()));
    }

    #[tokio::test]
    async fn test_zero_ttl_token_is_born_expired() {
        let keys = SigningKeyManager::new(Arc::new(MemoryKeyStore::new()), KeyConfig::default());
        let service = TokenService::new(
            keys,
            Arc::new(MemoryCredentialStore::new()),
            TokenConfig {
                leeway_secs: 0,
                ..TokenConfig::default()
            },
        );
        bootstrap(&service).await;

        // Issuance succeeds; the token is simply dead on arrival.
        let issued = service.issue_with_ttl(&alice(), None, 0).await.unwrap();
        assert_eq!(issued.claims.exp, issued.claims.iat);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let err = service.verify(&issued.token).await.unwrap_err();
        assert!(matches!(err, IamError::Token(TokenError::Expired)));
    }

    #[tokio::test]
    async fn test_retired_key_still_verifies() {
        let service = service();
        bootstrap(&service).await;

        let issued = service.issue(&alice(), None).await.unwrap();
        service
            .keys
            .rotate_key(KeyPurpose::TokenSigning, false)
            .await
            .unwrap();

        // Old token verifies through the retired key, new tokens use the
        // new key.
        let claims = service.verify(&issued.token).await.unwrap();
        assert_eq!(claims.sub, alice().to_string());

        let fresh = service.issue(&alice(), None).await.unwrap();
        assert_ne!(fresh.key_id(), issued.key_id());
        service.verify(&fresh.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_key_id_rejected() {
        let issuer = service();
        bootstrap(&issuer).await;
        let issued = issuer.issue(&alice(), None).await.unwrap();

        // A verifier with a different key store has never seen the kid.
        let stranger = service();
        bootstrap(&stranger).await;
        let err = stranger.verify(&issued.token).await.unwrap_err();
        assert!(matches!(err, IamError::Token(TokenError::UnknownKey { .. })));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let keys = SigningKeyManager::new(Arc::new(MemoryKeyStore::new()), KeyConfig::default());
        let service = TokenService::new(
            keys,
            Arc::new(MemoryCredentialStore::new()),
            TokenConfig {
                leeway_secs: 0,
                ..TokenConfig::default()
            },
        );
        bootstrap(&service).await;

        let issued = service.issue_with_ttl(&alice(), None, 1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        let err = service.verify(&issued.token).await.unwrap_err();
        assert!(matches!(err, IamError::Token(TokenError::Expired)));
    }

    #[tokio::test]
    async fn test_refresh_credential_lifecycle() {
        let service = service();
        bootstrap(&service).await;

        let secret = service.issue_refresh_credential(&alice()).await.unwrap();
        let subject = service.redeem_refresh_credential(&secret).await.unwrap();
        assert_eq!(subject, alice());

        assert!(service.revoke_refresh_credential(&secret).await.unwrap());
        let err = service.redeem_refresh_credential(&secret).await.unwrap_err();
        assert!(matches!(err, IamError::Token(TokenError::InvalidCredential)));
    }

    #[tokio::test]
    async fn test_revoke_all_for_subject() {
        let service = service();
        bootstrap(&service).await;

        let one = service.issue_refresh_credential(&alice()).await.unwrap();
        let two = service.issue_refresh_credential(&alice()).await.unwrap();
        assert_ne!(one, two);

        let revoked = service.revoke_all_refresh_credentials(&alice()).await.unwrap();
        assert_eq!(revoked, 2);
        assert!(service.redeem_refresh_credential(&one).await.is_err());
        assert!(service.redeem_refresh_credential(&two).await.is_err());
    }
}
