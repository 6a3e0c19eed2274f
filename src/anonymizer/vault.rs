// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Reversible token vault
//
// One vault per anonymizer, shared by every column it tokenizes. The counter
// only grows, so a token is never handed out twice.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct TokenVault {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    counter: u64,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `value`, minting `{prefix}{counter:08}` on first sight
    ///
    /// A value already in the vault keeps its token whatever the prefix.
    pub fn tokenize(&mut self, value: &str, prefix: &str) -> String {
        if let Some(token) = self.forward.get(value) {
            return token.clone();
        }

        self.counter += 1;
        let token = format!("{}{:08}", prefix, self.counter);
        self.forward.insert(value.to_string(), token.clone());
        self.reverse.insert(token.clone(), value.to_string());
        token
    }

    pub fn detokenize(&self, token: &str) -> Option<&str> {
        self.reverse.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Drop every mapping, keeping the counter
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Copy of the original → token mapping
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.forward.clone()
    }
}
