// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared value types for the WARD engine.
//!
//! These are plain data types moved between the engine and its stores:
//! signing keys, refresh credentials, delegation links, principal records,
//! passcodes and pagination. None of them perform I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hrn::ResourceHrn;

// =============================================================================
// Signing Keys
// =============================================================================

/// The signature algorithm of a signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// Ed25519, serialized as the JOSE `EdDSA` algorithm.
    Ed25519,
}

impl KeyAlgorithm {
    /// Returns the JOSE algorithm name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "EdDSA",
        }
    }
}

/// What a signing key is used for.
///
/// Exactly one ACTIVE key exists per purpose at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPurpose {
    /// Signing access tokens.
    TokenSigning,
}

impl KeyPurpose {
    /// Returns the purpose name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPurpose::TokenSigning => "token_signing",
        }
    }
}

/// The lifecycle status of a signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// The key signs newly issued tokens.
    Active,
    /// The key only verifies tokens issued before the last rotation.
    Retired,
}

impl KeyStatus {
    /// Returns `true` if the key is the active signer.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, KeyStatus::Active)
    }
}

/// An asymmetric signing key.
///
/// The private material is owned exclusively by the signing key manager: it
/// is skipped by serialization and redacted from `Debug` output. Only the
/// public material is exposed for verification.
#[derive(Clone, Serialize, Deserialize)]
pub struct SigningKey {
    /// Stable identifier, recorded in the `kid` claim of issued tokens.
    pub key_id: String,
    /// The signature algorithm.
    pub algorithm: KeyAlgorithm,
    /// The purpose this key serves.
    pub purpose: KeyPurpose,
    /// Lifecycle status.
    pub status: KeyStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Public key material (raw Ed25519 public key bytes).
    pub public_material: Vec<u8>,
    #[serde(skip)]
    private_material: Vec<u8>,
}

impl SigningKey {
    /// Creates an active signing key from freshly generated material.
    pub fn new(
        key_id: impl Into<String>,
        algorithm: KeyAlgorithm,
        purpose: KeyPurpose,
        private_material: Vec<u8>,
        public_material: Vec<u8>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            algorithm,
            purpose,
            status: KeyStatus::Active,
            created_at: Utc::now(),
            public_material,
            private_material,
        }
    }

    /// Returns the private key material (PKCS#8 DER).
    ///
    /// Never leaves the signing key manager.
    pub fn private_material(&self) -> &[u8] {
        &self.private_material
    }

    /// Returns a copy marked retired.
    pub fn retired(&self) -> Self {
        Self {
            status: KeyStatus::Retired,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("purpose", &self.purpose)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("private_material", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Refresh Credentials
// =============================================================================

/// The lifecycle status of a refresh credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    /// The credential can be redeemed.
    Active,
    /// The credential has been revoked and fails closed.
    Revoked,
}

/// A persisted, revocable refresh credential.
///
/// Only the hash of the secret is stored; the secret itself is returned to
/// the caller exactly once at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshCredentialRecord {
    /// Stable identifier.
    pub id: String,
    /// The principal this credential mints tokens for.
    pub subject_hrn: ResourceHrn,
    /// SHA-256 hash of the opaque secret, base64-encoded.
    pub secret_hash: String,
    /// Lifecycle status.
    pub status: CredentialStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Delegation
// =============================================================================

/// A directed leader-to-subordinate identity link.
///
/// Links form a graph: many leaders may share a subordinate and vice versa.
/// The two endpoints are always distinct principals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationLink {
    /// Stable identifier.
    pub id: String,
    /// The delegating principal.
    pub leader_hrn: ResourceHrn,
    /// The principal acting on the leader's behalf.
    pub subordinate_hrn: ResourceHrn,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl DelegationLink {
    /// Returns `true` if `hrn` is one of the link's endpoints.
    pub fn is_endpoint(&self, hrn: &ResourceHrn) -> bool {
        &self.leader_hrn == hrn || &self.subordinate_hrn == hrn
    }
}

/// Which side of a delegation link a listing is filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DelegationRole {
    /// Links where the principal is the leader.
    Leader,
    /// Links where the principal is the subordinate.
    Subordinate,
}

// =============================================================================
// Principals
// =============================================================================

/// The lifecycle status of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    /// The principal may authenticate.
    Enabled,
    /// Authentication fails with an account-disabled error.
    Disabled,
}

/// A stored principal record, the minimal shape the engine requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    /// The principal's HRN.
    pub hrn: ResourceHrn,
    /// Login username, unique within its organization scope.
    pub username: String,
    /// Contact email, if any.
    pub email: Option<String>,
    /// Lifecycle status.
    pub status: PrincipalStatus,
    /// Whether password-based login is provisioned for this principal.
    pub login_access: bool,
    /// Identity-provider group the principal's password lives in.
    pub identity_group: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl PrincipalRecord {
    /// Returns `true` if the principal may authenticate.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self.status, PrincipalStatus::Enabled)
    }
}

/// An authenticated identity, produced by the principal resolver.
///
/// Resolution establishes identity only; authorization is a separate step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrincipal {
    /// The acting identity, evaluated against policies.
    pub hrn: ResourceHrn,
    /// The originating leader of a delegated session, for audit.
    pub on_behalf_of: Option<ResourceHrn>,
}

impl ResolvedPrincipal {
    /// Creates a directly authenticated principal.
    pub fn direct(hrn: ResourceHrn) -> Self {
        Self {
            hrn,
            on_behalf_of: None,
        }
    }

    /// Creates a delegated principal acting on behalf of a leader.
    pub fn delegated(hrn: ResourceHrn, leader: ResourceHrn) -> Self {
        Self {
            hrn,
            on_behalf_of: Some(leader),
        }
    }

    /// Returns `true` if this session acts on behalf of another principal.
    #[inline]
    pub fn is_delegated(&self) -> bool {
        self.on_behalf_of.is_some()
    }

    /// Returns the identity that originated this session.
    ///
    /// For a delegated session that is the leader; otherwise the subject
    /// itself.
    pub fn originating(&self) -> &ResourceHrn {
        self.on_behalf_of.as_ref().unwrap_or(&self.hrn)
    }
}

// =============================================================================
// Passcodes
// =============================================================================

/// What a one-time passcode was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasscodePurpose {
    /// Account sign-up verification.
    Signup,
    /// Password reset.
    Reset,
    /// Organization invite.
    Invite,
    /// Accepting a delegation link.
    LinkUser,
}

/// A persisted one-time passcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasscodeRecord {
    /// The opaque passcode value.
    pub passcode: String,
    /// The email the passcode was delivered to.
    pub email: String,
    /// The purpose it may be used for.
    pub purpose: PasscodePurpose,
    /// The principal the passcode resolves to.
    pub subject_hrn: ResourceHrn,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl PasscodeRecord {
    /// Returns `true` if the passcode is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A pagination request: page size plus an opaque continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    /// Continuation token from a previous page, if any.
    #[serde(default)]
    pub next_token: Option<String>,
}

fn default_page_limit() -> usize {
    50
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_page_limit(),
            next_token: None,
        }
    }
}

impl PageRequest {
    /// Creates a request for the first page with the given size.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            next_token: None,
        }
    }

    /// Creates a request continuing from the given token.
    pub fn after(token: impl Into<String>, limit: usize) -> Self {
        Self {
            limit,
            next_token: Some(token.into()),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Token for the next page; `None` when exhausted.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Creates an empty, final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_token: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_debug_redacts_private_material() {
        let key = SigningKey::new(
            "key-1",
            KeyAlgorithm::Ed25519,
            KeyPurpose::TokenSigning,
            vec![1, 2, 3],
            vec![4, 5, 6],
        );
        let debug = format!("{key:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[test]
    fn test_signing_key_private_material_is_not_serialized() {
        let key = SigningKey::new(
            "key-1",
            KeyAlgorithm::Ed25519,
            KeyPurpose::TokenSigning,
            vec![1, 2, 3],
            vec![4, 5, 6],
        );
        let json = serde_json::to_string(&key).unwrap();
        assert!(!json.contains("private_material"));
        assert!(json.contains("public_material"));
    }

    #[test]
    fn test_signing_key_retired_copy() {
        let key = SigningKey::new(
            "key-1",
            KeyAlgorithm::Ed25519,
            KeyPurpose::TokenSigning,
            vec![],
            vec![],
        );
        assert!(key.status.is_active());
        let retired = key.retired();
        assert_eq!(retired.status, KeyStatus::Retired);
        assert_eq!(retired.key_id, key.key_id);
    }

    #[test]
    fn test_resolved_principal_originating() {
        let alice = ResourceHrn::user("acme", None::<String>, "alice").unwrap();
        let bob = ResourceHrn::user("acme", None::<String>, "bob").unwrap();

        let direct = ResolvedPrincipal::direct(alice.clone());
        assert!(!direct.is_delegated());
        assert_eq!(direct.originating(), &alice);

        let delegated = ResolvedPrincipal::delegated(bob.clone(), alice.clone());
        assert!(delegated.is_delegated());
        assert_eq!(delegated.hrn, bob);
        assert_eq!(delegated.originating(), &alice);
    }

    #[test]
    fn test_delegation_link_endpoints() {
        let alice = ResourceHrn::user("acme", None::<String>, "alice").unwrap();
        let bob = ResourceHrn::user("acme", None::<String>, "bob").unwrap();
        let carol = ResourceHrn::user("acme", None::<String>, "carol").unwrap();

        let link = DelegationLink {
            id: "link-1".to_string(),
            leader_hrn: alice.clone(),
            subordinate_hrn: bob.clone(),
            created_at: Utc::now(),
        };

        assert!(link.is_endpoint(&alice));
        assert!(link.is_endpoint(&bob));
        assert!(!link.is_endpoint(&carol));
    }

    #[test]
    fn test_passcode_validity() {
        let record = PasscodeRecord {
            passcode: "123456".to_string(),
            email: "alice@example.com".to_string(),
            purpose: PasscodePurpose::LinkUser,
            subject_hrn: ResourceHrn::user("acme", None::<String>, "alice").unwrap(),
            expires_at: Utc::now() + chrono::Duration::minutes(10),
        };

        assert!(record.is_valid_at(Utc::now()));
        assert!(!record.is_valid_at(Utc::now() + chrono::Duration::hours(1)));
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.limit, 50);
        assert!(request.next_token.is_none());

        let continued = PageRequest::after("cursor", 10);
        assert_eq!(continued.next_token.as_deref(), Some("cursor"));
    }
}
