// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # WARD Integration Tests
//!
//! This crate provides integration tests for the WARD identity and access
//! engine, along with shared test utilities, fixtures and helpers.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities, fixtures, and helpers
//!   - `fixtures`: Pre-built HRNs, policies and principal records
//!   - `builders`: Builder patterns for constructing test objects
//!   - `mocks`: Stub identity and federation providers
//!   - `harness`: A fully wired engine over in-memory stores
//!   - `assertions`: Custom assertion helpers
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p ward-tests
//!
//! # Run specific test suite
//! cargo test -p ward-tests --test integration_hrn
//! cargo test -p ward-tests --test integration_policy
//! cargo test -p ward-tests --test integration_token
//! cargo test -p ward-tests --test integration_engine
//! cargo test -p ward-tests --test integration_delegation
//!
//! # Run with verbose output
//! cargo test -p ward-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! ### HRN Tests (`integration_hrn.rs`)
//! - Parse/format round-trips
//! - Segment validation and wildcard placement
//! - Sub-organization scoping
//!
//! ### Policy Tests (`integration_policy.rs`)
//! - Statement grammar
//! - Matching semantics and organization confinement
//! - Evaluation: deny-overrides, default deny
//! - Optimistic concurrency on statement updates
//!
//! ### Token Tests (`integration_token.rs`)
//! - Issue/verify lifecycle across rotations
//! - Refresh credential redemption and revocation
//! - Principal resolution for every credential kind
//!
//! ### Engine Tests (`integration_engine.rs`)
//! - Signing key rotation and purge
//! - Authorization over stored policies
//!
//! ### Delegation Tests (`integration_delegation.rs`)
//! - Link/unlink symmetry
//! - Session switching in both directions
//! - Paginated listing by role

pub mod common;
