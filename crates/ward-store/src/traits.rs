// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store traits and interfaces.
//!
//! The engine consumes storage exclusively through these traits; it never
//! assumes a concrete backend. Every implementation must be thread-safe
//! (`Send + Sync`) and every method is async for non-blocking I/O.
//!
//! # Atomicity contracts
//!
//! Three operations carry the engine's concurrency discipline and MUST be
//! atomic in any implementation:
//!
//! - [`KeyStore::insert_active_and_retire_previous`]: exactly one ACTIVE key
//!   per purpose survives a rotation race; the losers observe the winner's
//!   key.
//! - [`KeyStore::insert_active_if_absent`]: the presence check and the
//!   insert are one step, so racing bootstrappers all come away with the
//!   same key.
//! - [`PolicyStore::save_statements`]: an optimistic version check; a stale
//!   writer gets [`StoreError::ConcurrentModification`] instead of silently
//!   overwriting.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ward_core::error::StoreError;
use ward_core::hrn::ResourceHrn;
use ward_core::policy::{Policy, PolicyStatement};
use ward_core::types::{
    DelegationLink, KeyPurpose, Page, PageRequest, PasscodePurpose, PasscodeRecord,
    PrincipalRecord, PrincipalStatus, RefreshCredentialRecord, SigningKey,
};

// =============================================================================
// PolicyStore
// =============================================================================

/// Storage for policies and principal-policy attachments.
#[async_trait]
pub trait PolicyStore: Send + Sync + Debug {
    /// Returns every policy attached to the given principal.
    async fn find_attached(&self, principal: &ResourceHrn) -> Result<Vec<Policy>, StoreError>;

    /// Looks up a policy by its HRN.
    async fn get(&self, hrn: &ResourceHrn) -> Result<Option<Policy>, StoreError>;

    /// Creates a new policy.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a policy with the same
    /// HRN exists.
    async fn create(&self, policy: Policy) -> Result<Policy, StoreError>;

    /// Replaces a policy's statement set under an optimistic version check.
    ///
    /// `expected_version` is the version the writer read. If the stored
    /// version has advanced, the write is rejected with
    /// [`StoreError::ConcurrentModification`] and the caller must re-read
    /// and retry. On success the stored version is bumped and the updated
    /// policy returned.
    async fn save_statements(
        &self,
        hrn: &ResourceHrn,
        expected_version: u64,
        statements: Vec<PolicyStatement>,
    ) -> Result<Policy, StoreError>;

    /// Deletes a policy and all of its attachments.
    async fn delete(&self, hrn: &ResourceHrn) -> Result<(), StoreError>;

    /// Attaches a policy to a principal. Idempotent.
    ///
    /// Fails with [`StoreError::EntityNotFound`] if the policy does not
    /// exist.
    async fn attach(&self, principal: &ResourceHrn, policy: &ResourceHrn)
        -> Result<(), StoreError>;

    /// Detaches a policy from a principal. Idempotent.
    async fn detach(&self, principal: &ResourceHrn, policy: &ResourceHrn)
        -> Result<(), StoreError>;
}

// =============================================================================
// KeyStore
// =============================================================================

/// Storage for signing keys.
#[async_trait]
pub trait KeyStore: Send + Sync + Debug {
    /// Returns the ACTIVE key for the given purpose, if one exists.
    async fn get_active(&self, purpose: KeyPurpose) -> Result<Option<SigningKey>, StoreError>;

    /// Atomically inserts `key` as ACTIVE and retires the previous ACTIVE
    /// key of the same purpose.
    ///
    /// This is the single-writer point for rotation: concurrent calls must
    /// serialize so that exactly one ACTIVE key per purpose exists
    /// afterwards.
    async fn insert_active_and_retire_previous(
        &self,
        key: SigningKey,
    ) -> Result<SigningKey, StoreError>;

    /// Atomically installs `key` as ACTIVE only if no ACTIVE key exists
    /// for its purpose.
    ///
    /// Returns whichever key is ACTIVE afterwards: the candidate if it
    /// won, the already-present key otherwise. The check and the insert
    /// must be one step so that concurrent bootstrappers cannot both
    /// install a key and all observe the same winner.
    async fn insert_active_if_absent(&self, key: SigningKey) -> Result<SigningKey, StoreError>;

    /// Looks up a key (active or retired) by its identifier.
    async fn get_by_id(&self, key_id: &str) -> Result<Option<SigningKey>, StoreError>;

    /// Deletes retired keys of the given purpose created before `cutoff`.
    ///
    /// Returns the number of keys removed. Never touches the ACTIVE key.
    async fn delete_retired_before(
        &self,
        purpose: KeyPurpose,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
}

// =============================================================================
// CredentialStore
// =============================================================================

/// Storage for hashed refresh credentials.
///
/// The plaintext secret never reaches the store; lookups are by hash.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Persists a new credential record.
    async fn insert(&self, record: RefreshCredentialRecord) -> Result<(), StoreError>;

    /// Looks up a credential by its secret hash.
    async fn find_by_hash(&self, hash: &str) -> Result<Option<RefreshCredentialRecord>, StoreError>;

    /// Revokes the credential with the given secret hash.
    ///
    /// Returns `true` if a credential was revoked.
    async fn revoke_by_hash(&self, hash: &str) -> Result<bool, StoreError>;

    /// Revokes every credential bound to the given subject.
    ///
    /// Returns the number of credentials revoked.
    async fn revoke_all_for(&self, subject: &ResourceHrn) -> Result<usize, StoreError>;
}

// =============================================================================
// DelegationStore
// =============================================================================

/// Storage for delegation links.
///
/// Links are independent edges; only row-level atomicity per link is
/// required.
#[async_trait]
pub trait DelegationStore: Send + Sync + Debug {
    /// Persists a new link.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a link with the same
    /// (leader, subordinate) pair already exists.
    async fn insert(&self, link: DelegationLink) -> Result<DelegationLink, StoreError>;

    /// Looks up a link by id.
    async fn get(&self, id: &str) -> Result<Option<DelegationLink>, StoreError>;

    /// Deletes a link by id. Returns `true` if a link was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Lists links where the given principal is the leader.
    async fn list_by_leader(
        &self,
        leader: &ResourceHrn,
        page: &PageRequest,
    ) -> Result<Page<DelegationLink>, StoreError>;

    /// Lists links where the given principal is the subordinate.
    async fn list_by_subordinate(
        &self,
        subordinate: &ResourceHrn,
        page: &PageRequest,
    ) -> Result<Page<DelegationLink>, StoreError>;
}

// =============================================================================
// PrincipalStore
// =============================================================================

/// Storage for principal records.
#[async_trait]
pub trait PrincipalStore: Send + Sync + Debug {
    /// Looks up a principal by HRN.
    async fn find_by_hrn(&self, hrn: &ResourceHrn) -> Result<Option<PrincipalRecord>, StoreError>;

    /// Returns every principal with the given login username.
    ///
    /// Usernames are only unique within an organization scope, so the
    /// caller filters the result down to the scope it is resolving for.
    async fn find_by_username(&self, username: &str)
        -> Result<Vec<PrincipalRecord>, StoreError>;

    /// Persists a new principal record.
    ///
    /// Fails with [`StoreError::AlreadyExists`] on a duplicate HRN.
    async fn insert(&self, record: PrincipalRecord) -> Result<(), StoreError>;

    /// Updates a principal's lifecycle status.
    async fn set_status(
        &self,
        hrn: &ResourceHrn,
        status: PrincipalStatus,
    ) -> Result<(), StoreError>;
}

// =============================================================================
// PasscodeStore
// =============================================================================

/// Storage for one-time passcodes.
#[async_trait]
pub trait PasscodeStore: Send + Sync + Debug {
    /// Persists a new passcode record.
    async fn insert(&self, record: PasscodeRecord) -> Result<(), StoreError>;

    /// Returns the passcode record if it exists, serves the given purpose
    /// and has not expired at `now`.
    async fn get_valid(
        &self,
        passcode: &str,
        purpose: PasscodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<PasscodeRecord>, StoreError>;

    /// Consumes a passcode so it cannot be used again.
    ///
    /// Returns `true` if the passcode existed.
    async fn consume(&self, passcode: &str) -> Result<bool, StoreError>;
}
