// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use ward_core::error::{IamError, IamResult};

// =============================================================================
// EngineConfig
// =============================================================================

/// Configuration for the WARD engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Token service configuration.
    pub token: TokenConfig,
    /// Signing key configuration.
    pub keys: KeyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            keys: KeyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token configuration.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Sets the signing key configuration.
    pub fn with_keys(mut self, keys: KeyConfig) -> Self {
        self.keys = keys;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> IamResult<()> {
        if self.token.access_ttl_secs <= 0 {
            return Err(IamError::internal("access token TTL must be positive"));
        }
        if self.token.refresh_secret_bytes < 16 {
            return Err(IamError::internal(
                "refresh secrets shorter than 16 bytes are not accepted",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TokenConfig
// =============================================================================

/// Token service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Default access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Clock skew tolerance applied during verification, in seconds.
    pub leeway_secs: u64,
    /// Number of random bytes in a refresh credential secret.
    pub refresh_secret_bytes: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl_secs: 3600, // 1 hour
            leeway_secs: 60,
            refresh_secret_bytes: 32,
        }
    }
}

impl TokenConfig {
    /// Sets the default access token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl_secs = ttl.as_secs() as i64;
        self
    }

    /// Sets the verification leeway.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway_secs = leeway.as_secs();
        self
    }
}

// =============================================================================
// KeyConfig
// =============================================================================

/// Signing key lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// How long retired keys are kept before an explicit purge removes
    /// them, in seconds.
    pub retired_retention_secs: i64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            retired_retention_secs: 86400 * 30, // 30 days
        }
    }
}

impl KeyConfig {
    /// Sets the retired key retention period.
    pub fn with_retired_retention(mut self, retention: Duration) -> Self {
        self.retired_retention_secs = retention.as_secs() as i64;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token.access_ttl_secs, 3600);
    }

    #[test]
    fn test_nonpositive_ttl_rejected() {
        let config = EngineConfig::default()
            .with_token(TokenConfig::default().with_access_ttl(Duration::ZERO));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new()
            .with_token(TokenConfig::default().with_leeway(Duration::from_secs(5)))
            .with_keys(KeyConfig::default().with_retired_retention(Duration::from_secs(60)));
        assert_eq!(config.token.leeway_secs, 5);
        assert_eq!(config.keys.retired_retention_secs, 60);
    }
}
