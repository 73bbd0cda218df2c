// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization against stored policies.
//!
//! Thin wrapper that loads a principal's attached policies and hands them
//! to the pure evaluator. Read-only; concurrent checks never contend.

use std::sync::Arc;

use tracing::debug;

use ward_core::error::{AuthError, IamResult};
use ward_core::evaluator::{evaluate, Decision};
use ward_core::hrn::{ActionHrn, ResourceHrn};
use ward_store::PolicyStore;

// =============================================================================
// AuthorizationEvaluator
// =============================================================================

/// Decides whether a principal may perform an action on a resource.
#[derive(Clone)]
pub struct AuthorizationEvaluator {
    policies: Arc<dyn PolicyStore>,
}

impl AuthorizationEvaluator {
    /// Creates an evaluator over the given policy store.
    pub fn new(policies: Arc<dyn PolicyStore>) -> Self {
        Self { policies }
    }

    /// Evaluates a request and returns the decision.
    ///
    /// DENIED is a normal outcome here; only store failures are errors.
    pub async fn authorize(
        &self,
        principal: &ResourceHrn,
        resource: &ResourceHrn,
        action: &ActionHrn,
    ) -> IamResult<Decision> {
        let attached = self.policies.find_attached(principal).await?;
        let decision = evaluate(&attached, resource, action);
        debug!(
            principal = %principal,
            resource = %resource,
            action = %action,
            %decision,
            "authorization evaluated"
        );
        Ok(decision)
    }

    /// Evaluates a request and converts a denial into
    /// [`AuthError::PermissionDenied`].
    pub async fn require(
        &self,
        principal: &ResourceHrn,
        resource: &ResourceHrn,
        action: &ActionHrn,
    ) -> IamResult<()> {
        match self.authorize(principal, resource, action).await? {
            Decision::Allowed => Ok(()),
            Decision::Denied => Err(AuthError::denied(format!(
                "{principal} may not perform {action} on {resource}"
            ))
            .into()),
        }
    }
}

impl std::fmt::Debug for AuthorizationEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEvaluator").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
