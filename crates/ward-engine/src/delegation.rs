// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Delegation ledger.
//!
//! A delegation link lets a subordinate principal act on a leader's
//! behalf. Sessions moving across a link carry the leader in the token's
//! `obo` claim, so the acting identity is always the subject and the
//! originating identity stays visible for audit.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use ward_core::error::{AuthError, IamResult, StoreError};
use ward_core::hrn::ResourceHrn;
use ward_core::types::{DelegationLink, DelegationRole, Page, PageRequest, ResolvedPrincipal};
use ward_store::{DelegationStore, PrincipalStore};

use crate::token::{IssuedToken, TokenService};

// =============================================================================
// DelegationService
// =============================================================================

/// Creates, traverses and removes delegation links.
#[derive(Clone)]
pub struct DelegationService {
    links: Arc<dyn DelegationStore>,
    principals: Arc<dyn PrincipalStore>,
    tokens: TokenService,
}

impl DelegationService {
    /// Creates a delegation service.
    pub fn new(
        links: Arc<dyn DelegationStore>,
        principals: Arc<dyn PrincipalStore>,
        tokens: TokenService,
    ) -> Self {
        Self {
            links,
            principals,
            tokens,
        }
    }

    /// Links a subordinate to a leader.
    ///
    /// Both principals must exist and be distinct; duplicate pairs are
    /// rejected by the store. Returns the link together with a token for
    /// the subordinate session, already marked as acting on the leader's
    /// behalf.
    pub async fn link(
        &self,
        leader: &ResourceHrn,
        subordinate: &ResourceHrn,
    ) -> IamResult<(DelegationLink, IssuedToken)> {
        if leader == subordinate {
            return Err(AuthError::denied("a principal cannot delegate to itself").into());
        }
        self.ensure_exists(leader).await?;
        self.ensure_exists(subordinate).await?;

        let link = self
            .links
            .insert(DelegationLink {
                id: Uuid::now_v7().to_string(),
                leader_hrn: leader.clone(),
                subordinate_hrn: subordinate.clone(),
                created_at: Utc::now(),
            })
            .await?;

        let token = self.tokens.issue(subordinate, Some(leader)).await?;
        info!(link = %link.id, leader = %leader, subordinate = %subordinate, "delegation created");
        Ok((link, token))
    }

    /// Switches the caller's session to the link's other party.
    ///
    /// Only the leader's identity may traverse a link: directly, or through
    /// the delegated session the link produced (whose `obo` names the
    /// leader). The leader switching into the subordinate gets a token with
    /// `obo` set to the leader; the delegated session switching back gets a
    /// plain leader token. Everyone else, including the subordinate on its
    /// own credentials, is denied.
    pub async fn switch(
        &self,
        current: &ResolvedPrincipal,
        link_id: &str,
    ) -> IamResult<IssuedToken> {
        let link = self.get_link(link_id).await?;
        let acting = &current.hrn;

        // The session's effective leader must own the link.
        if current.originating() != &link.leader_hrn {
            return Err(
                AuthError::denied(format!("{acting} is not the leader of link {link_id}")).into(),
            );
        }

        if acting == &link.leader_hrn {
            return self
                .tokens
                .issue(&link.subordinate_hrn, Some(&link.leader_hrn))
                .await;
        }
        if acting == &link.subordinate_hrn {
            // The leader returning from the delegated session.
            return self.tokens.issue(&link.leader_hrn, None).await;
        }

        Err(AuthError::denied(format!("{acting} is not part of link {link_id}")).into())
    }

    /// Deletes a link.
    ///
    /// Either endpoint may remove it; anyone else is denied.
    pub async fn unlink(&self, principal: &ResourceHrn, link_id: &str) -> IamResult<()> {
        let link = self.get_link(link_id).await?;
        if !link.is_endpoint(principal) {
            return Err(
                AuthError::denied(format!("{principal} is not part of link {link_id}")).into(),
            );
        }
        self.links.delete(link_id).await?;
        info!(link = %link_id, "delegation removed");
        Ok(())
    }

    /// Lists a principal's links on one side of the relation.
    pub async fn list_links(
        &self,
        principal: &ResourceHrn,
        role: DelegationRole,
        page: &PageRequest,
    ) -> IamResult<Page<DelegationLink>> {
        let page = match role {
            DelegationRole::Leader => self.links.list_by_leader(principal, page).await?,
            DelegationRole::Subordinate => self.links.list_by_subordinate(principal, page).await?,
        };
        Ok(page)
    }

    async fn get_link(&self, link_id: &str) -> IamResult<DelegationLink> {
        Ok(self
            .links
            .get(link_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("delegation link {link_id}")))?)
    }

    async fn ensure_exists(&self, hrn: &ResourceHrn) -> IamResult<()> {
        self.principals
            .find_by_hrn(hrn)
            .await?
            .ok_or_else(|| StoreError::not_found(hrn.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for DelegationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegationService").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
