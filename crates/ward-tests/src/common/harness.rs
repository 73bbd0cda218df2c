// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! A fully wired engine over in-memory stores. Each harness is isolated;
//! nothing is shared between tests.

use std::sync::Arc;

use ward_core::hrn::ResourceHrn;
use ward_core::policy::Policy;
use ward_core::types::{KeyPurpose, PrincipalRecord};
use ward_engine::authorize::AuthorizationEvaluator;
use ward_engine::config::EngineConfig;
use ward_engine::delegation::DelegationService;
use ward_engine::keys::SigningKeyManager;
use ward_engine::resolver::{AuthProviderRegistry, PrincipalResolver};
use ward_engine::token::TokenService;
use ward_store::{
    MemoryCredentialStore, MemoryDelegationStore, MemoryKeyStore, MemoryPasscodeStore,
    MemoryPolicyStore, MemoryPrincipalStore, PolicyStore, PrincipalStore,
};

use super::mocks::StubIdentityProvider;

/// A complete engine over fresh in-memory stores.
pub struct TestEngine {
    /// The policy store.
    pub policies: Arc<MemoryPolicyStore>,
    /// The principal store.
    pub principals: Arc<MemoryPrincipalStore>,
    /// The passcode store.
    pub passcodes: Arc<MemoryPasscodeStore>,
    /// The signing key manager.
    pub keys: SigningKeyManager,
    /// The token service.
    pub tokens: TokenService,
    /// The authorization evaluator.
    pub authorizer: AuthorizationEvaluator,
    /// The principal resolver.
    pub resolver: PrincipalResolver,
    /// The delegation service.
    pub delegation: DelegationService,
}

impl TestEngine {
    /// Bootstraps an engine with a default configuration, seeded passwords
    /// and federated providers, and an active signing key.
    pub async fn bootstrap(
        config: EngineConfig,
        identity: StubIdentityProvider,
        registry: AuthProviderRegistry,
    ) -> Self {
        config.validate().expect("test config must be valid");

        let policies = Arc::new(MemoryPolicyStore::new());
        let principals = Arc::new(MemoryPrincipalStore::new());
        let passcodes = Arc::new(MemoryPasscodeStore::new());
        let key_store = Arc::new(MemoryKeyStore::new());
        let credentials = Arc::new(MemoryCredentialStore::new());
        let links = Arc::new(MemoryDelegationStore::new());

        let keys = SigningKeyManager::new(key_store, config.keys.clone());
        keys.rotate_key(KeyPurpose::TokenSigning, true)
            .await
            .expect("bootstrap key rotation");

        let tokens = TokenService::new(keys.clone(), credentials, config.token.clone());
        let authorizer = AuthorizationEvaluator::new(policies.clone());
        let resolver = PrincipalResolver::new(
            tokens.clone(),
            principals.clone(),
            passcodes.clone(),
            Arc::new(identity),
            registry,
        );
        let delegation =
            DelegationService::new(links, principals.clone(), tokens.clone());

        Self {
            policies,
            principals,
            passcodes,
            keys,
            tokens,
            authorizer,
            resolver,
            delegation,
        }
    }

    /// Bootstraps an engine with defaults and no external providers.
    pub async fn default_setup() -> Self {
        Self::bootstrap(
            EngineConfig::default(),
            StubIdentityProvider::new(),
            AuthProviderRegistry::new(),
        )
        .await
    }

    /// Seeds a principal record.
    pub async fn seed_principal(&self, record: PrincipalRecord) {
        self.principals
            .insert(record)
            .await
            .expect("seed principal");
    }

    /// Creates a policy and attaches it to a principal.
    pub async fn seed_attached_policy(&self, principal: &ResourceHrn, policy: Policy) {
        let hrn = policy.hrn.clone();
        self.policies.create(policy).await.expect("seed policy");
        self.policies
            .attach(principal, &hrn)
            .await
            .expect("attach policy");
    }
}
