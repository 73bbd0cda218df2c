// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertion Helpers
//!
//! Small assertion wrappers that produce readable failure messages for the
//! outcomes integration tests check most often.

use ward_core::error::{AuthError, IamError, StoreError};
use ward_core::evaluator::Decision;

/// Asserts that a decision is ALLOWED.
pub fn assert_allowed(decision: Decision) {
    assert_eq!(decision, Decision::Allowed, "expected ALLOWED");
}

/// Asserts that a decision is DENIED.
pub fn assert_denied(decision: Decision) {
    assert_eq!(decision, Decision::Denied, "expected DENIED");
}

/// Asserts that an error is a permission denial.
pub fn assert_permission_denied(err: IamError) {
    assert!(
        matches!(err, IamError::Auth(AuthError::PermissionDenied { .. })),
        "expected PermissionDenied, got: {err}"
    );
}

/// Asserts that an error is an authentication failure.
pub fn assert_authentication_failed(err: IamError) {
    assert!(
        matches!(err, IamError::Auth(AuthError::AuthenticationFailed { .. })),
        "expected AuthenticationFailed, got: {err}"
    );
}

/// Asserts that an error is a version conflict.
pub fn assert_version_conflict(err: IamError) {
    assert!(
        matches!(err, IamError::Store(StoreError::ConcurrentModification { .. })),
        "expected ConcurrentModification, got: {err}"
    );
}
