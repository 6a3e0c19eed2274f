// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Salt policy for hashing
//
// The salt itself is never logged; reports only carry its length.

use serde::{Deserialize, Serialize};

/// Salt shipped in sample configs; using it in production is a critical finding
pub const DEFAULT_SALT_PLACEHOLDER: &str = "CHANGE_THIS_SALT_IN_PRODUCTION";

const DENY_LIST: [&str; 5] = [DEFAULT_SALT_PLACEHOLDER, "default_salt", "salt", "123456", ""];

/// Result of checking a salt against the policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltReport {
    pub secure: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SaltPolicy {
    min_length: usize,
}

impl Default for SaltPolicy {
    fn default() -> Self {
        Self { min_length: 16 }
    }
}

impl SaltPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn check(&self, salt: &str) -> SaltReport {
        let warning = if salt == DEFAULT_SALT_PLACEHOLDER {
            Some(
                "CRITICAL: the default placeholder salt is in use. \
                 Set a unique random salt before processing production data."
                    .to_string(),
            )
        } else if DENY_LIST.contains(&salt) {
            Some("salt is a well-known weak value".to_string())
        } else if salt.chars().count() < self.min_length {
            Some(format!(
                "salt too short ({} chars), minimum {}",
                salt.chars().count(),
                self.min_length
            ))
        } else {
            None
        };

        SaltReport {
            secure: warning.is_none(),
            warning,
        }
    }
}
