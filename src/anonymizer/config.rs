// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the anonymizer
//
// A column transform serializes as `{"method": "<name>", ...params}`, the
// same shape as the JSON config files of the command-line tool.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::dataset::{Cell, Column, ColumnKind, Dataset};
use crate::error::{AnonymizeError, AnonymizeResult, ConfigIssue};
use crate::scanner::{PIIType, RiskLevel, ScanResult};

/// Anonymization methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationMethod {
    Mask,
    Hash,
    Pseudonymize,
    Generalize,
    Suppress,
    Tokenize,
    Noise,
}

impl AnonymizationMethod {
    pub const ALL: [AnonymizationMethod; 7] = [
        AnonymizationMethod::Mask,
        AnonymizationMethod::Hash,
        AnonymizationMethod::Pseudonymize,
        AnonymizationMethod::Generalize,
        AnonymizationMethod::Suppress,
        AnonymizationMethod::Tokenize,
        AnonymizationMethod::Noise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnonymizationMethod::Mask => "mask",
            AnonymizationMethod::Hash => "hash",
            AnonymizationMethod::Pseudonymize => "pseudonymize",
            AnonymizationMethod::Generalize => "generalize",
            AnonymizationMethod::Suppress => "suppress",
            AnonymizationMethod::Tokenize => "tokenize",
            AnonymizationMethod::Noise => "noise",
        }
    }
}

impl fmt::Display for AnonymizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnonymizationMethod {
    type Err = AnonymizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| AnonymizeError::UnsupportedMethod(s.to_string()))
    }
}

/// Digest used by the hash method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Md5,
}

/// Generalization variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeneralizationKind {
    /// Equal-width numeric ranges
    #[default]
    Range,
    /// Dates reduced to their year
    Year,
    /// Fixed prefix plus a masking suffix
    Truncate,
    /// Keep the most frequent values, bucket the rest
    #[serde(alias = "category")]
    TopK,
}

/// Noise distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoiseDistribution {
    #[default]
    Gaussian,
    Uniform,
    Laplace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskParams {
    pub mask_char: char,
    pub visible_start: usize,
    pub visible_end: usize,
    /// Emit this literal instead of masking character by character
    pub pattern: Option<String>,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            mask_char: '*',
            visible_start: 0,
            visible_end: 0,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashParams {
    pub algorithm: HashAlgorithm,
    pub truncate: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PseudonymizeParams {
    /// Unrecognized kinds fall back to `other` (short random id)
    #[serde(deserialize_with = "lenient_pii_type")]
    pub pii_type: PIIType,
}

fn lenient_pii_type<'de, D>(deserializer: D) -> Result<PIIType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let kind = String::deserialize(deserializer)?.to_ascii_lowercase();
    if kind == "date" {
        return Ok(PIIType::BirthDate);
    }
    Ok(PIIType::ALL
        .iter()
        .copied()
        .find(|t| t.as_str() == kind)
        .unwrap_or(PIIType::Other))
}

impl Default for PseudonymizeParams {
    fn default() -> Self {
        Self {
            pii_type: PIIType::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralizeParams {
    #[serde(alias = "generalization_type")]
    pub kind: GeneralizationKind,
    /// Range count for `range`, kept values + 1 for `top_k`
    pub bins: usize,
    /// Custom range labels, one per bin
    pub labels: Option<Vec<String>>,
    /// Characters kept by `truncate`
    pub prefix_len: usize,
}

impl Default for GeneralizeParams {
    fn default() -> Self {
        Self {
            kind: GeneralizationKind::Range,
            bins: 5,
            labels: None,
            prefix_len: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuppressParams {
    pub replacement: Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizeParams {
    pub prefix: String,
}

impl Default for TokenizeParams {
    fn default() -> Self {
        Self {
            prefix: "TOK_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseParams {
    /// Fraction of the column standard deviation, in [0, 1]
    pub noise_level: f64,
    pub distribution: NoiseDistribution,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            noise_level: 0.1,
            distribution: NoiseDistribution::Gaussian,
        }
    }
}

/// One column transform: a method with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Transform {
    Mask(MaskParams),
    Hash(HashParams),
    Pseudonymize(PseudonymizeParams),
    Generalize(GeneralizeParams),
    Suppress(SuppressParams),
    Tokenize(TokenizeParams),
    Noise(NoiseParams),
}

impl Transform {
    /// Transform with default parameters
    pub fn from_method(method: AnonymizationMethod) -> Self {
        match method {
            AnonymizationMethod::Mask => Transform::Mask(MaskParams::default()),
            AnonymizationMethod::Hash => Transform::Hash(HashParams::default()),
            AnonymizationMethod::Pseudonymize => {
                Transform::Pseudonymize(PseudonymizeParams::default())
            }
            AnonymizationMethod::Generalize => Transform::Generalize(GeneralizeParams::default()),
            AnonymizationMethod::Suppress => Transform::Suppress(SuppressParams::default()),
            AnonymizationMethod::Tokenize => Transform::Tokenize(TokenizeParams::default()),
            AnonymizationMethod::Noise => Transform::Noise(NoiseParams::default()),
        }
    }

    pub fn method(&self) -> AnonymizationMethod {
        match self {
            Transform::Mask(_) => AnonymizationMethod::Mask,
            Transform::Hash(_) => AnonymizationMethod::Hash,
            Transform::Pseudonymize(_) => AnonymizationMethod::Pseudonymize,
            Transform::Generalize(_) => AnonymizationMethod::Generalize,
            Transform::Suppress(_) => AnonymizationMethod::Suppress,
            Transform::Tokenize(_) => AnonymizationMethod::Tokenize,
            Transform::Noise(_) => AnonymizationMethod::Noise,
        }
    }

    /// Parameter checks that do not depend on the data
    pub fn validate(&self, column: &str) -> AnonymizeResult<()> {
        let invalid = |message: String| AnonymizeError::InvalidParameter {
            column: column.to_string(),
            message,
        };

        match self {
            Transform::Hash(HashParams {
                truncate: Some(0), ..
            }) => Err(invalid("truncate must be >= 1".to_string())),
            Transform::Generalize(p) if p.bins < 1 => {
                Err(invalid("bins must be >= 1".to_string()))
            }
            Transform::Generalize(GeneralizeParams {
                kind: GeneralizationKind::Range,
                bins,
                labels: Some(labels),
                ..
            }) if labels.len() != *bins => Err(invalid(format!(
                "{} labels given for {} bins",
                labels.len(),
                bins
            ))),
            Transform::Noise(p) if !(0.0..=1.0).contains(&p.noise_level) => Err(invalid(format!(
                "noise_level must be within [0, 1], got {}",
                p.noise_level
            ))),
            _ => Ok(()),
        }
    }

    /// Column-type preconditions
    pub fn check_column_kind(&self, column: &str, kind: ColumnKind) -> AnonymizeResult<()> {
        let accepted = match self {
            Transform::Noise(_)
            | Transform::Generalize(GeneralizeParams {
                kind: GeneralizationKind::Range,
                ..
            }) => matches!(kind, ColumnKind::Numeric | ColumnKind::Empty),
            Transform::Generalize(GeneralizeParams {
                kind: GeneralizationKind::Year,
                ..
            }) => matches!(kind, ColumnKind::Temporal | ColumnKind::Empty),
            _ => true,
        };

        if accepted {
            Ok(())
        } else {
            Err(AnonymizeError::UnsupportedColumnType {
                column: column.to_string(),
                method: self.method().to_string(),
                kind,
            })
        }
    }

    /// Column-type preconditions plus the value checks of numeric methods
    ///
    /// Noise and range generalization need every number to be finite.
    pub fn check_column(&self, column: &Column) -> AnonymizeResult<()> {
        self.check_column_kind(column.name(), column.kind())?;

        let numeric = matches!(
            self,
            Transform::Noise(_)
                | Transform::Generalize(GeneralizeParams {
                    kind: GeneralizationKind::Range,
                    ..
                })
        );
        if !numeric {
            return Ok(());
        }
        match column
            .cells()
            .iter()
            .position(|cell| cell.as_number().is_some_and(|v| !v.is_finite()))
        {
            Some(row) => Err(AnonymizeError::NonFiniteValue {
                column: column.name().to_string(),
                row,
            }),
            None => Ok(()),
        }
    }

    /// Build a transform from a method and a JSON parameter object
    pub fn from_parts(method: AnonymizationMethod, params: Value) -> AnonymizeResult<Self> {
        let mut object = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(AnonymizeError::InvalidParameter {
                    column: String::new(),
                    message: format!("parameters must be an object, got {other}"),
                })
            }
        };
        object.insert("method".to_string(), Value::String(method.as_str().to_string()));
        serde_json::from_value(Value::Object(object)).map_err(|e| AnonymizeError::InvalidParameter {
            column: String::new(),
            message: e.to_string(),
        })
    }

    fn from_json_value(mut value: Value) -> AnonymizeResult<Self> {
        let object = value.as_object_mut().ok_or_else(|| AnonymizeError::InvalidParameter {
            column: String::new(),
            message: "column config must be an object".to_string(),
        })?;

        // Method defaults to mask; normalize case before serde sees it
        let method = match object.get("method") {
            None => AnonymizationMethod::Mask,
            Some(Value::String(name)) => name.parse()?,
            Some(other) => return Err(AnonymizeError::UnsupportedMethod(other.to_string())),
        };
        object.insert("method".to_string(), Value::String(method.as_str().to_string()));

        Ok(serde_json::from_value(value)?)
    }
}

/// Ordered column → transform mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnonymizationConfig {
    entries: Vec<(String, Transform)>,
}

impl AnonymizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, transform: Transform) -> Self {
        self.insert(column, transform);
        self
    }

    /// Insert or replace the transform of a column
    pub fn insert(&mut self, column: impl Into<String>, transform: Transform) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = transform,
            None => self.entries.push((column, transform)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Transform> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transform)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `{"column": {"method": ..., ...}, ...}`
    ///
    /// Every malformed entry is collected; the error lists all of them.
    pub fn from_json(json: &str) -> AnonymizeResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> AnonymizeResult<Self> {
        let Value::Object(map) = value else {
            return Err(AnonymizeError::InvalidConfig(vec![ConfigIssue::new(
                "<root>",
                AnonymizeError::InvalidParameter {
                    column: "<root>".to_string(),
                    message: "config must be a JSON object".to_string(),
                },
            )]));
        };

        let mut config = Self::new();
        let mut issues = Vec::new();
        for (column, entry) in map {
            match Transform::from_json_value(entry) {
                Ok(transform) => match transform.validate(&column) {
                    Ok(()) => config.insert(column, transform),
                    Err(e) => issues.push(ConfigIssue::new(column, e)),
                },
                Err(AnonymizeError::Json(e)) => issues.push(ConfigIssue::new(
                    column.clone(),
                    AnonymizeError::InvalidParameter {
                        column,
                        message: e.to_string(),
                    },
                )),
                Err(AnonymizeError::InvalidParameter { message, .. }) => issues.push(
                    ConfigIssue::new(
                        column.clone(),
                        AnonymizeError::InvalidParameter { column, message },
                    ),
                ),
                Err(e) => issues.push(ConfigIssue::new(column, e)),
            }
        }

        into_result(issues)?;
        Ok(config)
    }

    pub fn to_json(&self) -> AnonymizeResult<String> {
        let mut map = Map::new();
        for (column, transform) in &self.entries {
            map.insert(column.clone(), serde_json::to_value(transform)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    /// Parameter checks over every entry, aggregated
    pub fn validate(&self) -> AnonymizeResult<()> {
        let issues: Vec<ConfigIssue> = self
            .iter()
            .filter_map(|(column, t)| t.validate(column).err().map(|e| ConfigIssue::new(column, e)))
            .collect();
        into_result(issues)
    }

    /// Parameter and column-type checks against a dataset, aggregated
    ///
    /// Columns missing from the dataset are not checked here.
    pub fn validate_for(&self, dataset: &Dataset) -> AnonymizeResult<()> {
        let mut issues = Vec::new();
        for (column, transform) in self.iter() {
            if let Err(e) = transform.validate(column) {
                issues.push(ConfigIssue::new(column, e));
                continue;
            }
            if let Some(col) = dataset.column(column) {
                if let Err(e) = transform.check_column(col) {
                    issues.push(ConfigIssue::new(column, e));
                }
            }
        }
        into_result(issues)
    }

    /// Default config derived from a scan
    ///
    /// Per column, the most severe finding decides: critical and high are
    /// hashed (12 chars), medium is masked, low is generalized with the
    /// variant fitting the column type.
    pub fn suggest(scan: &ScanResult, dataset: &Dataset) -> Self {
        let mut config = Self::new();
        for column in scan.pii_columns() {
            let Some(level) = scan.matches_for(column).map(|m| m.risk_level).max() else {
                continue;
            };
            let transform = match level {
                RiskLevel::Critical | RiskLevel::High => Transform::Hash(HashParams {
                    truncate: Some(12),
                    ..Default::default()
                }),
                RiskLevel::Medium => Transform::Mask(MaskParams::default()),
                RiskLevel::Low => {
                    let kind = match dataset.column(column).map(|c| c.kind()) {
                        Some(ColumnKind::Numeric) => GeneralizationKind::Range,
                        Some(ColumnKind::Temporal) => GeneralizationKind::Year,
                        _ => GeneralizationKind::TopK,
                    };
                    Transform::Generalize(GeneralizeParams {
                        kind,
                        ..Default::default()
                    })
                }
            };
            config.insert(column, transform);
        }
        config
    }
}

fn into_result(issues: Vec<ConfigIssue>) -> AnonymizeResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(AnonymizeError::InvalidConfig(issues))
    }
}

/// Anonymizer construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    /// Refuse insecure salts instead of warning
    pub strict_mode: bool,
    pub min_salt_length: usize,
    /// Seed for noise and synthetic values; entropy when unset
    pub seed: Option<u64>,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            min_salt_length: 16,
            seed: None,
        }
    }
}
