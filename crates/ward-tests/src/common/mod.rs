// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared test utilities, fixtures, and helpers for integration tests.
//!
//! ## Module Structure
//!
//! - `fixtures`: Pre-built HRNs, policies and principal records
//! - `builders`: Builder patterns for constructing test objects
//! - `mocks`: Stub identity and federation providers
//! - `harness`: A fully wired engine over in-memory stores
//! - `assertions`: Custom assertion helpers

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod harness;
pub mod mocks;

// Re-exports for convenience
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use harness::*;
pub use mocks::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test module.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,ward=debug")),
            )
            .with_test_writer()
            .init();
    });
}
