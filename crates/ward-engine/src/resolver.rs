// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Principal resolution.
//!
//! Turns a presented credential into a [`ResolvedPrincipal`]. Resolution
//! establishes identity only; whether the resolved principal may do
//! anything is the authorization evaluator's question. Every path fails
//! closed: there is no anonymous fallback.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use ward_core::error::{AuthError, IamResult, StoreError};
use ward_core::hrn::ResourceHrn;
use ward_core::types::{PasscodePurpose, PrincipalRecord, ResolvedPrincipal};
use ward_store::{PasscodeStore, PrincipalStore};

use crate::token::TokenService;

// =============================================================================
// Credential
// =============================================================================

/// A credential presented for authentication.
///
/// Closed set: the resolver interprets exactly these shapes and nothing
/// else.
#[derive(Debug, Clone)]
pub enum Credential {
    /// A signed access token.
    Jwt {
        /// The serialized JWT.
        token: String,
    },
    /// An opaque refresh secret.
    RefreshSecret {
        /// The plaintext secret returned at issuance.
        secret: String,
    },
    /// A username and password within an organization scope.
    UsernamePassword {
        /// The organization the login is scoped to.
        organization: String,
        /// Optional sub-organization scope.
        sub_organization: Option<String>,
        /// Login username.
        username: String,
        /// Plaintext password, checked against the identity provider.
        password: String,
    },
    /// A one-time passcode delivered out of band.
    Passcode {
        /// The passcode value.
        passcode: String,
        /// The purpose it must have been issued for.
        purpose: PasscodePurpose,
        /// The email it was delivered to.
        email: String,
    },
    /// A token from an external identity provider.
    Federated {
        /// Registered provider name.
        provider: String,
        /// The provider-specific token.
        token: String,
    },
}

// =============================================================================
// Collaborator traits
// =============================================================================

/// External password authority.
///
/// The engine never stores passwords; it delegates password checks and
/// updates to this collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync + Debug {
    /// Checks a password for a username within an identity group.
    ///
    /// Returns `true` only on an exact match.
    async fn authenticate(
        &self,
        group: Option<&str>,
        username: &str,
        password: &str,
    ) -> IamResult<bool>;

    /// Replaces the password for a username within an identity group.
    async fn set_password(
        &self,
        group: Option<&str>,
        username: &str,
        password: &str,
    ) -> IamResult<()>;
}

/// External federated authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync + Debug {
    /// Validates a provider token and returns the principal it belongs to.
    async fn authenticate(&self, token: &str) -> IamResult<ResourceHrn>;
}

/// An immutable name-to-provider map, assembled once at startup.
#[derive(Debug, Clone, Default)]
pub struct AuthProviderRegistry {
    providers: HashMap<String, Arc<dyn AuthProvider>>,
}

impl AuthProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider under the given name.
    pub fn with_provider(
        mut self,
        name: impl Into<String>,
        provider: Arc<dyn AuthProvider>,
    ) -> Self {
        self.providers.insert(name.into(), provider);
        self
    }

    /// Looks up a provider by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AuthProvider>> {
        self.providers.get(name)
    }
}

// =============================================================================
// PrincipalResolver
// =============================================================================

/// Resolves credentials into authenticated principals.
#[derive(Clone)]
pub struct PrincipalResolver {
    tokens: TokenService,
    principals: Arc<dyn PrincipalStore>,
    passcodes: Arc<dyn PasscodeStore>,
    identity: Arc<dyn IdentityProvider>,
    registry: AuthProviderRegistry,
}

impl PrincipalResolver {
    /// Creates a resolver.
    pub fn new(
        tokens: TokenService,
        principals: Arc<dyn PrincipalStore>,
        passcodes: Arc<dyn PasscodeStore>,
        identity: Arc<dyn IdentityProvider>,
        registry: AuthProviderRegistry,
    ) -> Self {
        Self {
            tokens,
            principals,
            passcodes,
            identity,
            registry,
        }
    }

    /// Resolves a credential to a principal.
    pub async fn resolve(&self, credential: &Credential) -> IamResult<ResolvedPrincipal> {
        match credential {
            Credential::Jwt { token } => self.resolve_jwt(token).await,
            Credential::RefreshSecret { secret } => self.resolve_refresh(secret).await,
            Credential::UsernamePassword {
                organization,
                sub_organization,
                username,
                password,
            } => {
                self.resolve_password(
                    organization,
                    sub_organization.as_deref(),
                    username,
                    password,
                )
                .await
            }
            Credential::Passcode {
                passcode,
                purpose,
                email,
            } => self.resolve_passcode(passcode, *purpose, email).await,
            Credential::Federated { provider, token } => {
                self.resolve_federated(provider, token).await
            }
        }
    }

    async fn resolve_jwt(&self, token: &str) -> IamResult<ResolvedPrincipal> {
        let claims = self.tokens.verify(token).await?;
        let subject = claims.subject_hrn()?;
        self.ensure_active(&subject).await?;

        let resolved = match claims.on_behalf_of_hrn()? {
            Some(leader) => ResolvedPrincipal::delegated(subject, leader),
            None => ResolvedPrincipal::direct(subject),
        };
        debug!(principal = %resolved.hrn, delegated = resolved.is_delegated(), "jwt resolved");
        Ok(resolved)
    }

    async fn resolve_refresh(&self, secret: &str) -> IamResult<ResolvedPrincipal> {
        let subject = self.tokens.redeem_refresh_credential(secret).await?;
        self.ensure_active(&subject).await?;
        Ok(ResolvedPrincipal::direct(subject))
    }

    async fn resolve_password(
        &self,
        organization: &str,
        sub_organization: Option<&str>,
        username: &str,
        password: &str,
    ) -> IamResult<ResolvedPrincipal> {
        // Usernames repeat across organizations; only the record in the
        // requested scope is a candidate.
        let record = self
            .principals
            .find_by_username(username)
            .await?
            .into_iter()
            .find(|record| {
                record.hrn.organization() == organization
                    && record.hrn.sub_organization() == sub_organization
            })
            .ok_or_else(|| AuthError::failed("invalid username or password"))?;

        if !record.is_enabled() {
            return Err(AuthError::disabled(record.hrn.to_string()).into());
        }
        if !record.login_access {
            return Err(AuthError::failed("invalid username or password").into());
        }

        let group = record.identity_group.as_deref();
        let ok = self.identity.authenticate(group, username, password).await?;
        if !ok {
            return Err(AuthError::failed("invalid username or password").into());
        }

        debug!(principal = %record.hrn, "password login resolved");
        Ok(ResolvedPrincipal::direct(record.hrn))
    }

    async fn resolve_passcode(
        &self,
        passcode: &str,
        purpose: PasscodePurpose,
        email: &str,
    ) -> IamResult<ResolvedPrincipal> {
        let record = self
            .passcodes
            .get_valid(passcode, purpose, Utc::now())
            .await?
            .filter(|record| record.email == email)
            .ok_or_else(|| AuthError::failed("invalid or expired passcode"))?;

        self.ensure_active(&record.subject_hrn).await?;

        // Single use: consume only after every check passed.
        self.passcodes.consume(passcode).await?;
        debug!(principal = %record.subject_hrn, "passcode resolved");
        Ok(ResolvedPrincipal::direct(record.subject_hrn))
    }

    async fn resolve_federated(&self, provider: &str, token: &str) -> IamResult<ResolvedPrincipal> {
        let provider = self
            .registry
            .get(provider)
            .ok_or_else(|| AuthError::failed(format!("unknown auth provider: {provider}")))?;

        let subject = provider.authenticate(token).await?;
        self.ensure_active(&subject).await?;
        Ok(ResolvedPrincipal::direct(subject))
    }

    /// Checks that the principal still exists and may authenticate.
    async fn ensure_active(&self, hrn: &ResourceHrn) -> IamResult<PrincipalRecord> {
        let record = self
            .principals
            .find_by_hrn(hrn)
            .await?
            .ok_or_else(|| StoreError::not_found(hrn.to_string()))?;
        if !record.is_enabled() {
            return Err(AuthError::disabled(hrn.to_string()).into());
        }
        Ok(record)
    }
}

impl Debug for PrincipalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalResolver").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use ward_core::error::IamError;
    use ward_core::types::{KeyPurpose, PasscodeRecord, PrincipalStatus};
    use ward_store::{
        MemoryCredentialStore, MemoryKeyStore, MemoryPasscodeStore, MemoryPrincipalStore,
    };

    use crate::config::{KeyConfig, TokenConfig};
    use crate::keys::SigningKeyManager;

    #[derive(Debug, Default)]
    struct StaticPasswords {
        entries: HashMap<String, String>,
    }

    #[async_trait]
    impl IdentityProvider for StaticPasswords {
        async fn authenticate(
            &self,
            _group: Option<&str>,
            username: &str,
            password: &str,
        ) -> IamResult<bool> {
            Ok(self.entries.get(username).map(String::as_str) == Some(password))
        }

        async fn set_password(
            &self,
            _group: Option<&str>,
            _username: &str,
            _password: &str,
        ) -> IamResult<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct StaticFederation {
        token: String,
        subject: ResourceHrn,
    }

    #[async_trait]
    impl AuthProvider for StaticFederation {
        async fn authenticate(&self, token: &str) -> IamResult<ResourceHrn> {
            if token == self.token {
                Ok(self.subject.clone())
            } else {
                Err(AuthError::failed("federated token rejected").into())
            }
        }
    }

    struct Fixture {
        resolver: PrincipalResolver,
        tokens: TokenService,
        principals: Arc<MemoryPrincipalStore>,
        passcodes: Arc<MemoryPasscodeStore>,
    }

    fn alice() -> ResourceHrn {
        ResourceHrn::user("acme", None::<String>, "alice").unwrap()
    }

    fn record(hrn: &ResourceHrn, username: &str) -> PrincipalRecord {
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

    async fn fixture() -> Fixture {
        let keys = SigningKeyManager::new(Arc::new(MemoryKeyStore::new()), KeyConfig::default());
        keys.rotate_key(KeyPurpose::TokenSigning, true).await.unwrap();
        let tokens = TokenService::new(
            keys,
            Arc::new(MemoryCredentialStore::new()),
            TokenConfig::default(),
        );

        let principals = Arc::new(MemoryPrincipalStore::new());
        principals.insert(record(&alice(), "alice")).await.unwrap();

        let passcodes = Arc::new(MemoryPasscodeStore::new());
        let identity = Arc::new(StaticPasswords {
            entries: HashMap::from([("alice".to_string(), "hunter2".to_string())]),
        });
        let registry = AuthProviderRegistry::new().with_provider(
            "corp-sso",
            Arc::new(StaticFederation {
                token: "sso-token".to_string(),
                subject: alice(),
            }),
        );

        Fixture {
            resolver: PrincipalResolver::new(
                tokens.clone(),
                principals.clone(),
                passcodes.clone(),
                identity,
                registry,
            ),
            tokens,
            principals,
            passcodes,
        }
    }

    #[tokio::test]
    async fn test_jwt_resolution() {
        let fx = fixture().await;
        let issued = fx.tokens.issue(&alice(), None).await.unwrap();

        let resolved = fx
            .resolver
            .resolve(&Credential::Jwt {
                token: issued.token,
            })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, alice());
        assert!(!resolved.is_delegated());
    }

    #[tokio::test]
    async fn test_jwt_for_deleted_subject_rejected() {
        let fx = fixture().await;
        let ghost = ResourceHrn::user("acme", None::<String>, "ghost").unwrap();
        let issued = fx.tokens.issue(&ghost, None).await.unwrap();

        let err = fx
            .resolver
            .resolve(&Credential::Jwt {
                token: issued.token,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IamError::Store(StoreError::EntityNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_subject_rejected() {
        let fx = fixture().await;
        fx.principals
            .set_status(&alice(), PrincipalStatus::Disabled)
            .await
            .unwrap();
        let issued = fx.tokens.issue(&alice(), None).await.unwrap();

        let err = fx
            .resolver
            .resolve(&Credential::Jwt {
                token: issued.token,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IamError::Auth(AuthError::AccountDisabled { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_secret_resolution() {
        let fx = fixture().await;
        let secret = fx.tokens.issue_refresh_credential(&alice()).await.unwrap();

        let resolved = fx
            .resolver
            .resolve(&Credential::RefreshSecret { secret })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, alice());
    }

    #[tokio::test]
    async fn test_password_resolution() {
        let fx = fixture().await;

        let resolved = fx
            .resolver
            .resolve(&Credential::UsernamePassword {
                organization: "acme".to_string(),
                sub_organization: None,
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, alice());

        let err = fx
            .resolver
            .resolve(&Credential::UsernamePassword {
                organization: "acme".to_string(),
                sub_organization: None,
                username: "alice".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IamError::Auth(AuthError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_password_scoped_to_organization() {
        let fx = fixture().await;

        // Right username and password, wrong organization.
        let err = fx
            .resolver
            .resolve(&Credential::UsernamePassword {
                organization: "globex".to_string(),
                sub_organization: None,
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IamError::Auth(AuthError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_same_username_resolves_per_organization() {
        let fx = fixture().await;
        let globex_alice = ResourceHrn::user("globex", None::<String>, "alice").unwrap();
        fx.principals
            .insert(record(&globex_alice, "alice"))
            .await
            .unwrap();

        // Two principals share the username; each login lands on the one
        // in the requested organization.
        let resolved = fx
            .resolver
            .resolve(&Credential::UsernamePassword {
                organization: "globex".to_string(),
                sub_organization: None,
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, globex_alice);

        let resolved = fx
            .resolver
            .resolve(&Credential::UsernamePassword {
                organization: "acme".to_string(),
                sub_organization: None,
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, alice());
    }

    #[tokio::test]
    async fn test_passcode_is_single_use() {
        let fx = fixture().await;
        fx.passcodes
            .insert(PasscodeRecord {
                passcode: "123456".to_string(),
                email: "alice@example.com".to_string(),
                purpose: PasscodePurpose::Reset,
                subject_hrn: alice(),
                expires_at: Utc::now() + Duration::minutes(10),
            })
            .await
            .unwrap();

        let credential = Credential::Passcode {
            passcode: "123456".to_string(),
            purpose: PasscodePurpose::Reset,
            email: "alice@example.com".to_string(),
        };

        let resolved = fx.resolver.resolve(&credential).await.unwrap();
        assert_eq!(resolved.hrn, alice());

        // Second use fails: the passcode was consumed.
        assert!(fx.resolver.resolve(&credential).await.is_err());
    }

    #[tokio::test]
    async fn test_federated_resolution() {
        let fx = fixture().await;

        let resolved = fx
            .resolver
            .resolve(&Credential::Federated {
                provider: "corp-sso".to_string(),
                token: "sso-token".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resolved.hrn, alice());

        let err = fx
            .resolver
            .resolve(&Credential::Federated {
                provider: "unknown".to_string(),
                token: "sso-token".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IamError::Auth(AuthError::AuthenticationFailed { .. })
        ));
    }
}
