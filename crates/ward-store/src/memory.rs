// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementations.
//!
//! The default backend for embedded use and tests. Reads go through
//! lock-free concurrent maps; the two operations with cross-entry
//! atomicity contracts (key rotation, policy statement replacement)
//! serialize through a single lock per store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use ward_core::error::StoreError;
use ward_core::hrn::ResourceHrn;
use ward_core::policy::{Policy, PolicyStatement};
use ward_core::types::{
    CredentialStatus, DelegationLink, KeyPurpose, KeyStatus, Page, PageRequest, PasscodePurpose,
    PasscodeRecord, PrincipalRecord, PrincipalStatus, RefreshCredentialRecord, SigningKey,
};

use crate::traits::{
    CredentialStore, DelegationStore, KeyStore, PasscodeStore, PolicyStore, PrincipalStore,
};

// =============================================================================
// MemoryPolicyStore
// =============================================================================

/// In-memory [`PolicyStore`].
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    policies: DashMap<String, Policy>,
    // principal HRN -> set of attached policy HRNs
    attachments: DashMap<String, HashSet<String>>,
}

impl MemoryPolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn find_attached(&self, principal: &ResourceHrn) -> Result<Vec<Policy>, StoreError> {
        let Some(attached) = self.attachments.get(&principal.to_string()) else {
            return Ok(Vec::new());
        };

        let mut policies = Vec::with_capacity(attached.len());
        for policy_hrn in attached.iter() {
            if let Some(policy) = self.policies.get(policy_hrn) {
                policies.push(policy.clone());
            }
        }
        Ok(policies)
    }

    async fn get(&self, hrn: &ResourceHrn) -> Result<Option<Policy>, StoreError> {
        Ok(self.policies.get(&hrn.to_string()).map(|p| p.clone()))
    }

    async fn create(&self, policy: Policy) -> Result<Policy, StoreError> {
        let key = policy.hrn.to_string();
        match self.policies.entry(key.clone()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(key)),
            Entry::Vacant(slot) => {
                slot.insert(policy.clone());
                debug!(policy = %key, "policy created");
                Ok(policy)
            }
        }
    }

    async fn save_statements(
        &self,
        hrn: &ResourceHrn,
        expected_version: u64,
        statements: Vec<PolicyStatement>,
    ) -> Result<Policy, StoreError> {
        let key = hrn.to_string();
        // get_mut holds the shard write lock, making check-and-replace atomic.
        let mut entry = self
            .policies
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found(key.clone()))?;

        if entry.version != expected_version {
            return Err(StoreError::conflict(key, expected_version, entry.version));
        }

        let updated = entry.with_statements(statements);
        *entry = updated.clone();
        debug!(policy = %key, version = updated.version, "policy statements replaced");
        Ok(updated)
    }

    async fn delete(&self, hrn: &ResourceHrn) -> Result<(), StoreError> {
        let key = hrn.to_string();
        self.policies
            .remove(&key)
            .ok_or_else(|| StoreError::not_found(key.clone()))?;
        for mut attached in self.attachments.iter_mut() {
            attached.remove(&key);
        }
        debug!(policy = %key, "policy deleted");
        Ok(())
    }

    async fn attach(
        &self,
        principal: &ResourceHrn,
        policy: &ResourceHrn,
    ) -> Result<(), StoreError> {
        let policy_key = policy.to_string();
        if !self.policies.contains_key(&policy_key) {
            return Err(StoreError::not_found(policy_key));
        }
        self.attachments
            .entry(principal.to_string())
            .or_default()
            .insert(policy_key);
        Ok(())
    }

    async fn detach(
        &self,
        principal: &ResourceHrn,
        policy: &ResourceHrn,
    ) -> Result<(), StoreError> {
        if let Some(mut attached) = self.attachments.get_mut(&principal.to_string()) {
            attached.remove(&policy.to_string());
        }
        Ok(())
    }
}

// =============================================================================
// MemoryKeyStore
// =============================================================================

/// In-memory [`KeyStore`].
///
/// Rotation serializes through a single lock over the active-key index so
/// that concurrent rotations cannot leave two ACTIVE keys for one purpose.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: DashMap<String, SigningKey>,
    active: Mutex<HashMap<KeyPurpose, String>>,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn get_active(&self, purpose: KeyPurpose) -> Result<Option<SigningKey>, StoreError> {
        let active = self.active.lock();
        let Some(key_id) = active.get(&purpose) else {
            return Ok(None);
        };
        let key = self
            .keys
            .get(key_id)
            .map(|k| k.clone())
            .ok_or_else(|| StoreError::internal(format!("active key {key_id} missing")))?;
        Ok(Some(key))
    }

    async fn insert_active_and_retire_previous(
        &self,
        key: SigningKey,
    ) -> Result<SigningKey, StoreError> {
        let mut active = self.active.lock();

        if let Some(previous_id) = active.get(&key.purpose) {
            if let Some(mut previous) = self.keys.get_mut(previous_id) {
                let retired = previous.retired();
                *previous = retired;
            }
        }

        self.keys.insert(key.key_id.clone(), key.clone());
        active.insert(key.purpose, key.key_id.clone());
        debug!(key_id = %key.key_id, purpose = key.purpose.as_str(), "signing key activated");
        Ok(key)
    }

    async fn insert_active_if_absent(&self, key: SigningKey) -> Result<SigningKey, StoreError> {
        let mut active = self.active.lock();

        if let Some(existing_id) = active.get(&key.purpose) {
            let existing = self
                .keys
                .get(existing_id)
                .map(|k| k.clone())
                .ok_or_else(|| StoreError::internal(format!("active key {existing_id} missing")))?;
            return Ok(existing);
        }

        self.keys.insert(key.key_id.clone(), key.clone());
        active.insert(key.purpose, key.key_id.clone());
        debug!(key_id = %key.key_id, purpose = key.purpose.as_str(), "signing key activated");
        Ok(key)
    }

    async fn get_by_id(&self, key_id: &str) -> Result<Option<SigningKey>, StoreError> {
        Ok(self.keys.get(key_id).map(|k| k.clone()))
    }

    async fn delete_retired_before(
        &self,
        purpose: KeyPurpose,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let before = self.keys.len();
        self.keys.retain(|_, key| {
            !(key.purpose == purpose
                && key.status == KeyStatus::Retired
                && key.created_at < cutoff)
        });
        let removed = before - self.keys.len();
        if removed > 0 {
            debug!(purpose = purpose.as_str(), removed, "retired keys purged");
        }
        Ok(removed)
    }
}

// =============================================================================
// MemoryCredentialStore
// =============================================================================

/// In-memory [`CredentialStore`], keyed by secret hash.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    by_hash: DashMap<String, RefreshCredentialRecord>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, record: RefreshCredentialRecord) -> Result<(), StoreError> {
        match self.by_hash.entry(record.secret_hash.clone()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn find_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<RefreshCredentialRecord>, StoreError> {
        Ok(self.by_hash.get(hash).map(|r| r.clone()))
    }

    async fn revoke_by_hash(&self, hash: &str) -> Result<bool, StoreError> {
        match self.by_hash.get_mut(hash) {
            Some(mut record) => {
                record.status = CredentialStatus::Revoked;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for(&self, subject: &ResourceHrn) -> Result<usize, StoreError> {
        let mut revoked = 0;
        for mut record in self.by_hash.iter_mut() {
            if &record.subject_hrn == subject && record.status == CredentialStatus::Active {
                record.status = CredentialStatus::Revoked;
                revoked += 1;
            }
        }
        if revoked > 0 {
            debug!(subject = %subject, revoked, "refresh credentials revoked");
        }
        Ok(revoked)
    }
}

// =============================================================================
// MemoryDelegationStore
// =============================================================================

#[derive(Debug, Default)]
struct DelegationInner {
    links: HashMap<String, DelegationLink>,
    // (leader HRN, subordinate HRN) uniqueness index
    pairs: HashSet<(String, String)>,
}

/// In-memory [`DelegationStore`].
///
/// A single lock covers the link table and the pair-uniqueness index so
/// that duplicate detection and insertion are one step.
#[derive(Debug, Default)]
pub struct MemoryDelegationStore {
    inner: Mutex<DelegationInner>,
}

impl MemoryDelegationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts links by id and cuts one page out of them.
///
/// Link ids are time-ordered (UUIDv7), so id order is creation order and
/// the id itself serves as the continuation token.
fn paginate(mut links: Vec<DelegationLink>, page: &PageRequest) -> Page<DelegationLink> {
    links.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(token) = &page.next_token {
        links.retain(|link| link.id.as_str() > token.as_str());
    }
    let has_more = links.len() > page.limit;
    links.truncate(page.limit);
    let next_token = if has_more {
        links.last().map(|link| link.id.clone())
    } else {
        None
    };
    Page::new(links, next_token)
}

#[async_trait]
impl DelegationStore for MemoryDelegationStore {
    async fn insert(&self, link: DelegationLink) -> Result<DelegationLink, StoreError> {
        let mut inner = self.inner.lock();
        let pair = (
            link.leader_hrn.to_string(),
            link.subordinate_hrn.to_string(),
        );
        if inner.pairs.contains(&pair) || inner.links.contains_key(&link.id) {
            return Err(StoreError::already_exists(format!(
                "delegation link {} -> {}",
                pair.0, pair.1
            )));
        }
        inner.pairs.insert(pair);
        inner.links.insert(link.id.clone(), link.clone());
        debug!(link = %link.id, "delegation link created");
        Ok(link)
    }

    async fn get(&self, id: &str) -> Result<Option<DelegationLink>, StoreError> {
        Ok(self.inner.lock().links.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        let Some(link) = inner.links.remove(id) else {
            return Ok(false);
        };
        inner.pairs.remove(&(
            link.leader_hrn.to_string(),
            link.subordinate_hrn.to_string(),
        ));
        debug!(link = %id, "delegation link removed");
        Ok(true)
    }

    async fn list_by_leader(
        &self,
        leader: &ResourceHrn,
        page: &PageRequest,
    ) -> Result<Page<DelegationLink>, StoreError> {
        let links: Vec<DelegationLink> = self
            .inner
            .lock()
            .links
            .values()
            .filter(|link| &link.leader_hrn == leader)
            .cloned()
            .collect();
        Ok(paginate(links, page))
    }

    async fn list_by_subordinate(
        &self,
        subordinate: &ResourceHrn,
        page: &PageRequest,
    ) -> Result<Page<DelegationLink>, StoreError> {
        let links: Vec<DelegationLink> = self
            .inner
            .lock()
            .links
            .values()
            .filter(|link| &link.subordinate_hrn == subordinate)
            .cloned()
            .collect();
        Ok(paginate(links, page))
    }
}

// =============================================================================
// MemoryPrincipalStore
// =============================================================================

/// In-memory [`PrincipalStore`].
#[derive(Debug, Default)]
pub struct MemoryPrincipalStore {
    by_hrn: DashMap<String, PrincipalRecord>,
}

impl MemoryPrincipalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_hrn(&self, hrn: &ResourceHrn) -> Result<Option<PrincipalRecord>, StoreError> {
        Ok(self.by_hrn.get(&hrn.to_string()).map(|r| r.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<PrincipalRecord>, StoreError> {
        Ok(self
            .by_hrn
            .iter()
            .filter(|record| record.username == username)
            .map(|record| record.clone())
            .collect())
    }

    async fn insert(&self, record: PrincipalRecord) -> Result<(), StoreError> {
        let key = record.hrn.to_string();
        match self.by_hrn.entry(key.clone()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(key)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn set_status(
        &self,
        hrn: &ResourceHrn,
        status: PrincipalStatus,
    ) -> Result<(), StoreError> {
        let key = hrn.to_string();
        let mut record = self
            .by_hrn
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found(key.clone()))?;
        record.status = status;
        debug!(principal = %key, ?status, "principal status updated");
        Ok(())
    }
}

// =============================================================================
// MemoryPasscodeStore
// =============================================================================

/// In-memory [`PasscodeStore`].
#[derive(Debug, Default)]
pub struct MemoryPasscodeStore {
    by_code: DashMap<String, PasscodeRecord>,
}

impl MemoryPasscodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PasscodeStore for MemoryPasscodeStore {
    async fn insert(&self, record: PasscodeRecord) -> Result<(), StoreError> {
        match self.by_code.entry(record.passcode.clone()) {
            Entry::Occupied(_) => {
                Err(StoreError::already_exists(format!("passcode for {}", record.email)))
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get_valid(
        &self,
        passcode: &str,
        purpose: PasscodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<PasscodeRecord>, StoreError> {
        Ok(self
            .by_code
            .get(passcode)
            .filter(|record| record.purpose == purpose && record.is_valid_at(now))
            .map(|record| record.clone()))
    }

    async fn consume(&self, passcode: &str) -> Result<bool, StoreError> {
        Ok(self.by_code.remove(passcode).is_some())
    }
}

// =============================================================================
// Tests
// =============================================================================
