// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing.
//!
//! ## Design Principles
//!
//! - Fixtures are immutable and thread-safe
//! - Each fixture represents a realistic scenario
//! - Fixtures can be composed for complex test scenarios

use chrono::Utc;
use ward_core::hrn::{ActionHrn, ResourceHrn};
use ward_core::policy::Policy;
use ward_core::types::{PrincipalRecord, PrincipalStatus};

// =============================================================================
// HRN Fixtures
// =============================================================================

/// Fixture providing standard HRNs within the `acme` organization.
pub struct HrnFixtures;

impl HrnFixtures {
    /// The user `alice`.
    pub fn alice() -> ResourceHrn {
        ResourceHrn::user("acme", None::<String>, "alice").unwrap()
    }

    /// The user `bob`.
    pub fn bob() -> ResourceHrn {
        ResourceHrn::user("acme", None::<String>, "bob").unwrap()
    }

    /// The user `carol`, scoped to the `engineering` sub-organization.
    pub fn carol() -> ResourceHrn {
        ResourceHrn::user("acme", Some("engineering"), "carol").unwrap()
    }

    /// A user in a different organization.
    pub fn outsider() -> ResourceHrn {
        ResourceHrn::user("globex", None::<String>, "mallory").unwrap()
    }

    /// The widget resource instance `42`.
    pub fn widget_42() -> ResourceHrn {
        ResourceHrn::parse("hrn:acme:widget/42").unwrap()
    }

    /// The read action on widgets.
    pub fn widget_read() -> ActionHrn {
        ActionHrn::parse("hrn:acme:widget$read").unwrap()
    }

    /// The delete action on widgets.
    pub fn widget_delete() -> ActionHrn {
        ActionHrn::parse("hrn:acme:widget$delete").unwrap()
    }
}

// =============================================================================
// Policy Fixtures
// =============================================================================

/// Fixture providing standard policies.
pub struct PolicyFixtures;

impl PolicyFixtures {
    /// Allows reading every widget in `acme`.
    pub fn widget_readers() -> Policy {
        Policy::from_lines(
            ResourceHrn::policy("acme", "widget-readers").unwrap(),
            "widget-readers",
            "read access to all widgets",
            "p, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW",
        )
        .unwrap()
    }

    /// Allows every action on every widget in `acme`.
    pub fn widget_admins() -> Policy {
        Policy::from_lines(
            ResourceHrn::policy("acme", "widget-admins").unwrap(),
            "widget-admins",
            "full access to all widgets",
            "p, x, hrn:acme:widget/*, hrn:acme:widget$*, ALLOW",
        )
        .unwrap()
    }

    /// Denies every action on widget `42` specifically.
    pub fn widget_42_lockdown() -> Policy {
        Policy::from_lines(
            ResourceHrn::policy("acme", "widget-42-lockdown").unwrap(),
            "widget-42-lockdown",
            "widget 42 is frozen",
            "p, x, hrn:acme:widget/42, hrn:acme:widget$*, DENY",
        )
        .unwrap()
    }
}

// =============================================================================
// Principal Fixtures
// =============================================================================

/// Fixture providing standard principal records.
pub struct PrincipalFixtures;

impl PrincipalFixtures {
    /// An enabled principal with password login provisioned.
    pub fn enabled(hrn: &ResourceHrn, username: &str) -> PrincipalRecord {
        PrincipalRecord {
            hrn: hrn.clone(),
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            status: PrincipalStatus::Enabled,
            login_access: true,
            identity_group: None,
            created_at: Utc::now(),
        }
    }

    /// A disabled principal.
    pub fn disabled(hrn: &ResourceHrn, username: &str) -> PrincipalRecord {
        PrincipalRecord {
            status: PrincipalStatus::Disabled,
            ..Self::enabled(hrn, username)
        }
    }
}
