// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Scan findings, scan result and rule-based recommendations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::config::{DetectionMethod, PIIType, RiskLevel};
use super::risk::RiskSummary;
use crate::error::AnonymizeResult;

/// A single PII finding on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIIMatch {
    pub column: String,
    pub pii_type: PIIType,
    pub detection_method: DetectionMethod,
    /// Up to `max_samples` values backing the finding
    pub sample_values: Vec<String>,
    /// Non-null rows (by name) or estimated matching rows (by pattern)
    pub count: usize,
    /// `count / total_rows * 100`, two decimals
    pub percentage: f64,
    pub risk_level: RiskLevel,
    /// Name of the dataset the column belongs to
    pub source: String,
}

/// Outcome of scanning one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub timestamp: DateTime<Utc>,
    pub source_name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns_scanned: usize,
    /// Column order, then column-name findings before pattern findings
    pub pii_found: Vec<PIIMatch>,
    pub risk_summary: RiskSummary,
    pub recommendations: Vec<String>,
    pub scan_duration_seconds: f64,
}

impl ScanResult {
    pub fn has_pii(&self) -> bool {
        !self.pii_found.is_empty()
    }

    /// Findings attached to one column, in detection order
    pub fn matches_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a PIIMatch> {
        self.pii_found.iter().filter(move |m| m.column == column)
    }

    /// Distinct columns carrying at least one finding, in scan order
    pub fn pii_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.pii_found
            .iter()
            .map(|m| m.column.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn to_json(&self) -> AnonymizeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the recommendation list for a set of findings
///
/// The rules only look at which types and levels are present, so the
/// output does not depend on finding order. Duplicates are dropped.
pub fn recommendations(matches: &[PIIMatch]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |text: String| {
        if !out.contains(&text) {
            out.push(text);
        }
    };

    let critical_columns: HashSet<&str> = matches
        .iter()
        .filter(|m| m.risk_level == RiskLevel::Critical)
        .map(|m| m.column.as_str())
        .collect();
    if !critical_columns.is_empty() {
        push(format!(
            "URGENT: {} column(s) with CRITICAL data detected. \
             Consider immediate anonymization or removal.",
            critical_columns.len()
        ));
    }

    let has = |t: PIIType| matches.iter().any(|m| m.pii_type == t);

    if has(PIIType::Cpf) || has(PIIType::Cnpj) {
        push(
            "CPF/CNPJ detected: apply salted-hash pseudonymization or tokenization \
             to protect these identifiers."
                .to_string(),
        );
    }

    if has(PIIType::HealthData) {
        push(
            "SENSITIVE DATA (health): requires a specific legal basis (LGPD Art. 11). \
             Verify explicit consent or another applicable legal basis."
                .to_string(),
        );
    }

    if has(PIIType::Email) {
        push(
            "Email addresses detected: consider partial masking \
             (e.g. j***@email.com) for logs and reports."
                .to_string(),
        );
    }

    if !matches.is_empty() {
        push(
            "Document the purpose of processing for every personal data field \
             identified and keep the record up to date (LGPD Art. 37)."
                .to_string(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(column: &str, pii_type: PIIType) -> PIIMatch {
        PIIMatch {
            column: column.to_string(),
            pii_type,
            detection_method: DetectionMethod::Pattern,
            sample_values: vec![],
            count: 1,
            percentage: 50.0,
            risk_level: pii_type.risk_level(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_no_findings_no_recommendations() {
        assert!(recommendations(&[]).is_empty());
    }

    #[test]
    fn test_critical_counts_distinct_columns() {
        let matches = vec![
            finding("cartao", PIIType::CreditCard),
            finding("cid", PIIType::HealthData),
            finding("cid", PIIType::CreditCard),
        ];
        let recs = recommendations(&matches);
        assert!(recs[0].starts_with("URGENT: 2 column(s)"));
        assert!(recs.iter().any(|r| r.contains("LGPD Art. 11")));
        assert!(recs.last().unwrap().contains("Art. 37"));
    }

    #[test]
    fn test_recommendations_are_order_independent() {
        let a = vec![finding("cpf", PIIType::Cpf), finding("email", PIIType::Email)];
        let b = vec![finding("email", PIIType::Email), finding("cpf", PIIType::Cpf)];
        assert_eq!(recommendations(&a), recommendations(&b));
    }

    #[test]
    fn test_cpf_and_cnpj_share_one_recommendation() {
        let matches = vec![finding("cpf", PIIType::Cpf), finding("cnpj", PIIType::Cnpj)];
        let recs = recommendations(&matches);
        assert_eq!(recs.iter().filter(|r| r.contains("CPF/CNPJ")).count(), 1);
        assert_eq!(recs.len(), 2);
    }
}
