// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Stub collaborators for the engine's external seams: the password
//! authority and federated auth providers.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use ward_core::error::{AuthError, IamResult};
use ward_core::hrn::ResourceHrn;
use ward_engine::resolver::{AuthProvider, IdentityProvider};

// =============================================================================
// StubIdentityProvider
// =============================================================================

/// An in-memory password authority.
#[derive(Debug, Default)]
pub struct StubIdentityProvider {
    passwords: Mutex<HashMap<String, String>>,
}

impl StubIdentityProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider seeded with (username, password) pairs.
    pub fn with_passwords(pairs: &[(&str, &str)]) -> Self {
        let passwords = pairs
            .iter()
            .map(|(user, pass)| (user.to_string(), pass.to_string()))
            .collect();
        Self {
            passwords: Mutex::new(passwords),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn authenticate(
        &self,
        _group: Option<&str>,
        username: &str,
        password: &str,
    ) -> IamResult<bool> {
        Ok(self.passwords.lock().get(username).map(String::as_str) == Some(password))
    }

    async fn set_password(
        &self,
        _group: Option<&str>,
        username: &str,
        password: &str,
    ) -> IamResult<()> {
        self.passwords
            .lock()
            .insert(username.to_string(), password.to_string());
        Ok(())
    }
}

// =============================================================================
// StubAuthProvider
// =============================================================================

/// A federated provider that accepts a fixed token for a fixed subject.
#[derive(Debug)]
pub struct StubAuthProvider {
    token: String,
    subject: ResourceHrn,
}

impl StubAuthProvider {
    /// Creates a provider accepting `token` for `subject`.
    pub fn new(token: impl Into<String>, subject: ResourceHrn) -> Self {
        Self {
            token: token.into(),
            subject,
        }
    }
}

#[async_trait]
impl AuthProvider for StubAuthProvider {
    async fn authenticate(&self, token: &str) -> IamResult<ResourceHrn> {
        if token == self.token {
            Ok(self.subject.clone())
        } else {
            Err(AuthError::failed("federated token rejected").into())
        }
    }
}
