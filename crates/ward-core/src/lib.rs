// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-core
//!
//! Core domain model for the WARD identity and access engine.
//!
//! This crate provides the pure, I/O-free foundation used across all WARD
//! components:
//!
//! - **Hrn**: hierarchical resource names addressing organizations, users,
//!   policies and actions
//! - **Policy**: the statement model and pattern matcher
//! - **Evaluator**: the ALLOW/DENY decision algorithm
//! - **Types**: signing keys, credentials, delegation links, principals,
//!   pagination
//! - **Error**: the unified error hierarchy
//!
//! ## Example
//!
//! ```
//! use ward_core::evaluator::{evaluate, Decision};
//! use ward_core::hrn::{ActionHrn, ResourceHrn};
//! use ward_core::policy::Policy;
//!
//! let policy = Policy::from_lines(
//!     ResourceHrn::policy("acme", "widget-readers").unwrap(),
//!     "widget-readers",
//!     "read access to widgets",
//!     "p, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW",
//! )
//! .unwrap();
//!
//! let resource = ResourceHrn::parse("hrn:acme:widget/42").unwrap();
//! let action = ActionHrn::parse("hrn:acme:widget$read").unwrap();
//!
//! assert_eq!(evaluate(&[policy], &resource, &action), Decision::Allowed);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod hrn;
pub mod policy;
pub mod types;

pub use error::{AuthError, HrnError, IamError, IamResult, PolicyError, StoreError, TokenError};
pub use evaluator::{evaluate, Decision};
pub use hrn::{ActionHrn, Hrn, ResourceHrn};
pub use policy::{Effect, Policy, PolicyStatement, PrincipalPolicyAttachment};
pub use types::{
    CredentialStatus, DelegationLink, DelegationRole, KeyAlgorithm, KeyPurpose, KeyStatus, Page,
    PageRequest, PasscodePurpose, PasscodeRecord, PrincipalRecord, PrincipalStatus,
    RefreshCredentialRecord, ResolvedPrincipal, SigningKey,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
