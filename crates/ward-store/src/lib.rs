// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-store
//!
//! Storage abstractions for the WARD identity and access engine.
//!
//! The engine talks to persistence only through the async traits in
//! [`traits`]; [`memory`] provides the concurrent in-memory implementations
//! used for embedded deployments and tests. Swapping in a durable backend
//! means implementing the same traits against it.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod memory;
pub mod traits;

pub use memory::{
    MemoryCredentialStore, MemoryDelegationStore, MemoryKeyStore, MemoryPasscodeStore,
    MemoryPolicyStore, MemoryPrincipalStore,
};
pub use traits::{
    CredentialStore, DelegationStore, KeyStore, PasscodeStore, PolicyStore, PrincipalStore,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
