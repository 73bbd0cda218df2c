// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builder patterns for constructing complex test objects with sensible
//! defaults.
//!
//! ## Design Principles
//!
//! - Sensible defaults for common test scenarios
//! - Chainable methods for fluent API
//! - Clear separation between required and optional fields

use chrono::Utc;
use ward_core::hrn::ResourceHrn;
use ward_core::policy::{Policy, PolicyStatement};
use ward_core::types::{PrincipalRecord, PrincipalStatus};

// =============================================================================
// Policy Builder
// =============================================================================

/// Builder for constructing policies from statement lines.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    organization: String,
    name: String,
    description: String,
    lines: Vec<String>,
}

impl PolicyBuilder {
    /// Create a new builder for a policy in the given organization.
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            description: String::new(),
            lines: Vec::new(),
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a statement line.
    pub fn statement(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Add an ALLOW statement for a resource/action pattern pair.
    pub fn allow(self, resource: &str, action: &str) -> Self {
        self.statement(format!("p, x, {resource}, {action}, ALLOW"))
    }

    /// Add a DENY statement for a resource/action pattern pair.
    pub fn deny(self, resource: &str, action: &str) -> Self {
        self.statement(format!("p, x, {resource}, {action}, DENY"))
    }

    /// Build the policy. Panics on malformed statements.
    pub fn build(self) -> Policy {
        let statements: Vec<PolicyStatement> = self
            .lines
            .iter()
            .map(|line| PolicyStatement::parse(line).expect("builder statement must parse"))
            .collect();
        Policy::new(
            ResourceHrn::policy(&self.organization, &self.name).expect("valid policy hrn"),
            self.name,
            self.description,
            statements,
        )
    }
}

// =============================================================================
// Principal Builder
// =============================================================================

/// Builder for constructing principal records.
#[derive(Debug, Clone)]
pub struct PrincipalBuilder {
    hrn: ResourceHrn,
    username: String,
    email: Option<String>,
    status: PrincipalStatus,
    login_access: bool,
    identity_group: Option<String>,
}

impl PrincipalBuilder {
    /// Create a builder for a user in the given organization.
    pub fn new(organization: &str, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            hrn: ResourceHrn::user(organization, None::<String>, &username)
                .expect("valid user hrn"),
            username,
            email: None,
            status: PrincipalStatus::Enabled,
            login_access: true,
            identity_group: None,
        }
    }

    /// Set the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Mark the principal disabled.
    pub fn disabled(mut self) -> Self {
        self.status = PrincipalStatus::Disabled;
        self
    }

    /// Remove password login access.
    pub fn without_login(mut self) -> Self {
        self.login_access = false;
        self
    }

    /// Set the identity-provider group.
    pub fn identity_group(mut self, group: impl Into<String>) -> Self {
        self.identity_group = Some(group.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> PrincipalRecord {
        PrincipalRecord {
            hrn: self.hrn,
            username: self.username,
            email: self.email,
            status: self.status,
            login_access: self.login_access,
            identity_group: self.identity_group,
            created_at: Utc::now(),
        }
    }
}
