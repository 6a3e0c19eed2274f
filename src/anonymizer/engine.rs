// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Anonymizer: applies column transforms to datasets
//
// Datasets are never modified in place. Each call returns a new dataset
// sharing every untouched column with its input.

use rand::rngs::StdRng;
use rand::SeedableRng;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use super::config::{AnonymizationConfig, AnonymizerConfig, Transform};
use super::salt::{SaltPolicy, SaltReport};
use super::synthetic::{FakerProvider, SyntheticValueProvider};
use super::transforms;
use super::vault::TokenVault;
use crate::dataset::{Cell, Column, Dataset};
use crate::error::{AnonymizeError, AnonymizeResult};

/// Result of a batch anonymization
#[derive(Debug, Clone)]
pub struct AnonymizationOutcome {
    pub dataset: Dataset,
    /// Configured columns that were transformed, in config order
    pub applied_columns: Vec<String>,
    /// Configured columns absent from the dataset
    pub skipped_columns: Vec<String>,
}

pub struct Anonymizer {
    salt: SecretString,
    config: AnonymizerConfig,
    vault: TokenVault,
    provider: Box<dyn SyntheticValueProvider>,
    rng: StdRng,
}

impl fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anonymizer")
            .field("salt", &self.salt)
            .field("config", &self.config)
            .field("tokens", &self.vault.len())
            .finish_non_exhaustive()
    }
}

impl Anonymizer {
    /// Create an anonymizer hashing with `salt`
    ///
    /// Insecure salts are rejected in strict mode and logged as a warning
    /// otherwise.
    pub fn new(salt: impl Into<String>, config: AnonymizerConfig) -> AnonymizeResult<Self> {
        let provider = Box::new(FakerProvider::new(config.seed));
        Self::with_provider(salt, config, provider)
    }

    /// Same as [`Anonymizer::new`] with a custom synthetic value source
    pub fn with_provider(
        salt: impl Into<String>,
        config: AnonymizerConfig,
        provider: Box<dyn SyntheticValueProvider>,
    ) -> AnonymizeResult<Self> {
        let salt = salt.into();
        let report = SaltPolicy::new(config.min_salt_length).check(&salt);
        if let Some(warning) = report.warning {
            if config.strict_mode {
                return Err(AnonymizeError::InsecureSalt(warning));
            }
            warn!(%warning, "insecure anonymization salt");
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            strict_mode = config.strict_mode,
            seeded = config.seed.is_some(),
            "anonymizer initialized"
        );

        Ok(Self {
            salt: SecretString::new(salt),
            config,
            vault: TokenVault::new(),
            provider,
            rng,
        })
    }

    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    /// Check any salt against the default policy
    pub fn validate_salt(salt: &str) -> SaltReport {
        SaltPolicy::default().check(salt)
    }

    /// Check the salt this anonymizer was built with
    pub fn salt_report(&self) -> SaltReport {
        SaltPolicy::new(self.config.min_salt_length).check(self.salt.expose_secret())
    }

    /// Apply one transform to one column
    pub fn anonymize_column(
        &mut self,
        dataset: &Dataset,
        column: &str,
        transform: &Transform,
    ) -> AnonymizeResult<Dataset> {
        let source = dataset
            .column(column)
            .ok_or_else(|| AnonymizeError::ColumnNotFound(column.to_string()))?;
        transform.validate(column)?;
        transform.check_column(source)?;

        let cells = self.apply(source, transform)?;
        info!(
            column,
            method = %transform.method(),
            rows = cells.len(),
            "column anonymized"
        );
        dataset.replace_column(source.with_cells(cells))
    }

    /// Apply every configured transform, in config order
    ///
    /// The whole config is validated against the dataset first; nothing is
    /// transformed when any entry is invalid. Columns missing from the
    /// dataset are skipped with a warning.
    pub fn anonymize_dataset(
        &mut self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
    ) -> AnonymizeResult<AnonymizationOutcome> {
        config.validate_for(dataset)?;

        let mut current = dataset.clone();
        let mut applied_columns = Vec::new();
        let mut skipped_columns = Vec::new();

        for (column, transform) in config.iter() {
            if !current.contains(column) {
                warn!(column, "configured column not in dataset, skipping");
                skipped_columns.push(column.to_string());
                continue;
            }
            current = self.anonymize_column(&current, column, transform)?;
            applied_columns.push(column.to_string());
        }

        info!(
            applied = applied_columns.len(),
            skipped = skipped_columns.len(),
            "dataset anonymized"
        );

        Ok(AnonymizationOutcome {
            dataset: current,
            applied_columns,
            skipped_columns,
        })
    }

    fn apply(&mut self, column: &Column, transform: &Transform) -> AnonymizeResult<Vec<Cell>> {
        debug!(column = column.name(), method = %transform.method(), "applying transform");
        let cells = match transform {
            Transform::Mask(p) => transforms::mask(column, p),
            Transform::Hash(p) => transforms::hash(column, self.salt.expose_secret(), p),
            Transform::Pseudonymize(p) => {
                transforms::pseudonymize(column, self.provider.as_mut(), p.pii_type)
            }
            Transform::Generalize(p) => transforms::generalize(column, p),
            Transform::Suppress(p) => transforms::suppress(column, p),
            Transform::Tokenize(p) => transforms::tokenize(column, &mut self.vault, p),
            Transform::Noise(p) => transforms::noise(column, &mut self.rng, p)?,
        };
        Ok(cells)
    }

    /// Copy of the original → token mapping accumulated so far
    pub fn get_token_mapping(&self) -> HashMap<String, String> {
        self.vault.snapshot()
    }

    /// Original value behind a token issued by this anonymizer
    pub fn detokenize(&self, token: &str) -> Option<&str> {
        self.vault.detokenize(token)
    }

    /// Forget issued tokens; the counter keeps growing so tokens are not reused
    pub fn clear_token_mapping(&mut self) {
        self.vault.clear();
    }
}
