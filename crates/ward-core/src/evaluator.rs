// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pure authorization evaluation.
//!
//! [`evaluate`] folds every statement of every attached policy into a single
//! [`Decision`] under least-privilege semantics: an explicit DENY overrides
//! any number of ALLOWs, and a request with no matching statement at all is
//! denied. DENIED is a normal decision value, not an error, so callers can
//! branch on it directly.

use serde::{Deserialize, Serialize};

use crate::hrn::{ActionHrn, ResourceHrn};
use crate::policy::{Effect, Policy};

// =============================================================================
// Decision
// =============================================================================

/// The outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// A statement positively granted the request and none denied it.
    Allowed,
    /// No statement granted the request, or a statement denied it.
    Denied,
}

impl Decision {
    /// Returns `true` if the request was allowed.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allowed => write!(f, "ALLOWED"),
            Decision::Denied => write!(f, "DENIED"),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a request against a set of attached policies.
///
/// Scans every statement across every policy. Any DENY match is
/// authoritative; an ALLOW match only wins when no DENY matched anywhere.
/// Absent any match, the decision is [`Decision::Denied`].
pub fn evaluate(policies: &[Policy], resource: &ResourceHrn, action: &ActionHrn) -> Decision {
    let mut allowed = false;

    for policy in policies {
        for statement in policy.statements() {
            if !statement.matches(resource, action) {
                continue;
            }
            match statement.effect {
                Effect::Deny => return Decision::Denied,
                Effect::Allow => allowed = true,
            }
        }
    }

    if allowed {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}

// =============================================================================
// Tests
// =============================================================================
