// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-engine
//!
//! The WARD engine proper: signing key lifecycle, token issuance and
//! verification, principal resolution, authorization and the delegation
//! ledger, all composed over the `ward-store` traits.
//!
//! ## Components
//!
//! - [`SigningKeyManager`]: Ed25519 key generation, rotation, purge
//! - [`TokenService`]: JWT access tokens and opaque refresh credentials
//! - [`PrincipalResolver`]: credential-to-principal resolution
//! - [`AuthorizationEvaluator`]: policy checks over stored policies
//! - [`DelegationService`]: leader/subordinate links and session switching

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod authorize;
pub mod config;
pub mod delegation;
pub mod keys;
pub mod resolver;
pub mod token;

pub use authorize::AuthorizationEvaluator;
pub use config::{EngineConfig, KeyConfig, TokenConfig};
pub use delegation::DelegationService;
pub use keys::SigningKeyManager;
pub use resolver::{
    AuthProvider, AuthProviderRegistry, Credential, IdentityProvider, PrincipalResolver,
};
pub use token::{IssuedToken, TokenClaims, TokenService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
