// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for WARD.
//!
//! This module defines the error type system shared by every WARD crate:
//!
//! - Parsing errors are raised at the boundary that detects them and are
//!   always caller-input problems, never server faults
//! - Identity errors never degrade to an anonymous principal
//! - Authorization DENIED is a [`Decision`](crate::evaluator::Decision)
//!   value, not an error
//! - Token verification errors carry no information about whether the
//!   subject exists
//!
//! # Error Hierarchy
//!
//! ```text
//! IamError (root)
//! ├── HrnError     - Resource name parsing and validation
//! ├── PolicyError  - Policy statement parsing
//! ├── AuthError    - Authentication and delegation ownership
//! ├── TokenError   - Token signing, verification, refresh credentials
//! └── StoreError   - Storage lookups, version conflicts, invariants
//! ```

use thiserror::Error;

/// Result type alias for WARD operations.
pub type IamResult<T> = Result<T, IamError>;

// =============================================================================
// IamError - Root Error Type
// =============================================================================

/// The root error type for WARD.
///
/// All errors in the engine can be converted to this type, providing a
/// unified error handling interface across the entire system.
#[derive(Debug, Error)]
pub enum IamError {
    /// Resource name error.
    #[error("HRN error: {0}")]
    Hrn(#[from] HrnError),

    /// Policy parsing error.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Authentication or delegation ownership error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Token error.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IamError {
    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Store(StoreError::internal(message))
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            IamError::Hrn(_) => "hrn",
            IamError::Policy(_) => "policy",
            IamError::Auth(_) => "auth",
            IamError::Token(_) => "token",
            IamError::Store(_) => "store",
        }
    }

    /// Returns `true` if this error means identity could not be established.
    ///
    /// Callers must surface these as authentication failures, never treat
    /// the request as anonymous.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            IamError::Auth(AuthError::AuthenticationFailed { .. })
                | IamError::Auth(AuthError::AccountDisabled { .. })
                | IamError::Token(TokenError::Invalid { .. })
                | IamError::Token(TokenError::Expired)
                | IamError::Token(TokenError::InvalidCredential)
        )
    }

    /// Returns `true` if this error is a caller-input problem.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IamError::Store(StoreError::Internal { .. }) | IamError::Token(TokenError::Signing { .. })
        )
    }
}

// =============================================================================
// HrnError
// =============================================================================

/// Errors raised while parsing or validating hierarchical resource names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrnError {
    /// The input string is not a valid HRN.
    #[error("Malformed HRN '{input}': {reason}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl HrnError {
    /// Creates a malformed-HRN error.
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// PolicyError
// =============================================================================

/// Errors raised while parsing policy statements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A statement line does not match the required grammar.
    #[error("Malformed policy statement '{line}': {reason}")]
    MalformedStatement {
        /// The rejected statement line.
        line: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl PolicyError {
    /// Creates a malformed-statement error.
    pub fn malformed(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedStatement {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// AuthError
// =============================================================================

/// Authentication and delegation ownership errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The supplied credential could not establish an identity.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message. Must not reveal whether the identity exists.
        message: String,
    },

    /// The principal exists but is disabled.
    #[error("Account disabled: {hrn}")]
    AccountDisabled {
        /// The disabled principal.
        hrn: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message.
        message: String,
    },
}

impl AuthError {
    /// Creates an authentication failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Creates an account-disabled error.
    pub fn disabled(hrn: impl Into<String>) -> Self {
        Self::AccountDisabled { hrn: hrn.into() }
    }

    /// Creates a permission-denied error.
    pub fn denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }
}

// =============================================================================
// TokenError
// =============================================================================

/// Token and refresh-credential errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is structurally invalid or its signature does not verify.
    #[error("Invalid token: {message}")]
    Invalid {
        /// Error message. Must not reveal whether the subject exists.
        message: String,
    },

    /// The token has expired.
    #[error("Token has expired")]
    Expired,

    /// The refresh credential is unknown or revoked.
    #[error("Invalid credential")]
    InvalidCredential,

    /// The token references a signing key that no longer exists.
    #[error("Unknown signing key: {key_id}")]
    UnknownKey {
        /// The `kid` claim of the rejected token.
        key_id: String,
    },

    /// Signing a new token failed.
    #[error("Token signing failed: {message}")]
    Signing {
        /// Error message.
        message: String,
    },
}

impl TokenError {
    /// Creates an invalid-token error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Creates an unknown-key error.
    pub fn unknown_key(key_id: impl Into<String>) -> Self {
        Self::UnknownKey {
            key_id: key_id.into(),
        }
    }

    /// Creates a signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Storage-layer errors surfaced through the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A referenced entity does not exist.
    #[error("Entity not found: {entity}")]
    EntityNotFound {
        /// Description of the missing entity.
        entity: String,
    },

    /// An optimistic version check failed.
    ///
    /// The caller must re-read and retry with the current version.
    #[error("Concurrent modification of {resource}: expected version {expected}, found {found}")]
    ConcurrentModification {
        /// The contended resource.
        resource: String,
        /// The version the writer supplied.
        expected: u64,
        /// The version currently stored.
        found: u64,
    },

    /// A uniqueness constraint was violated.
    #[error("Already exists: {entity}")]
    AlreadyExists {
        /// Description of the conflicting entity.
        entity: String,
    },

    /// A storage invariant was violated.
    ///
    /// Fatal to the operation. Logged with detail, surfaced without it.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
        }
    }

    /// Creates a version-conflict error.
    pub fn conflict(resource: impl Into<String>, expected: u64, found: u64) -> Self {
        Self::ConcurrentModification {
            resource: resource.into(),
            expected,
            found,
        }
    }

    /// Creates an already-exists error.
    pub fn already_exists(entity: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
