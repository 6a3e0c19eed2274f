// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Column-level PII detection over a dataset
//
// Two signals per column: the declared identity (column name keywords) and
// the observed shape (sampled values against the registry patterns). A type
// found by name is not re-reported by pattern on the same column.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::config::{DetectionMethod, PIIType, ScannerConfig};
use super::patterns::PatternRegistry;
use super::report::{recommendations, PIIMatch, ScanResult};
use super::risk::RiskSummary;
use crate::dataset::{Column, Dataset};

/// Dataset scanner
///
/// # Example
/// ```
/// use pii_compliance::{Column, Dataset, PIIType, Scanner};
///
/// let dataset = Dataset::new(vec![Column::from_values(
///     "cpf",
///     ["123.456.789-00", "987.654.321-00"],
/// )])
/// .unwrap();
///
/// let result = Scanner::default().scan(&dataset, "clientes.csv", None);
/// assert_eq!(result.pii_found[0].pii_type, PIIType::Cpf);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    registry: Arc<PatternRegistry>,
    config: ScannerConfig,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(PatternRegistry::builtin(), ScannerConfig::default())
    }
}

impl Scanner {
    pub fn new(registry: Arc<PatternRegistry>, config: ScannerConfig) -> Self {
        info!(sample_size = config.sample_size, "PII scanner initialized");
        Self { registry, config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Scan `dataset`, optionally restricted to `columns`
    ///
    /// Requested columns missing from the dataset are ignored; scanning
    /// always follows dataset column order.
    pub fn scan(&self, dataset: &Dataset, source_name: &str, columns: Option<&[&str]>) -> ScanResult {
        let started = Instant::now();
        info!(
            source = source_name,
            rows = dataset.row_count(),
            "starting PII scan"
        );

        let selected: Vec<&Column> = dataset
            .columns()
            .filter(|c| columns.map_or(true, |wanted| wanted.contains(&c.name())))
            .collect();

        let mut pii_found = Vec::new();
        for column in &selected {
            pii_found.extend(self.scan_column(column, dataset.row_count(), source_name));
        }

        let risk_summary = RiskSummary::from_matches(&pii_found);
        let recommendations = recommendations(&pii_found);
        let elapsed = started.elapsed().as_secs_f64();

        info!(
            source = source_name,
            findings = pii_found.len(),
            duration_secs = elapsed,
            "PII scan finished"
        );

        ScanResult {
            timestamp: Utc::now(),
            source_name: source_name.to_string(),
            total_rows: dataset.row_count(),
            total_columns: dataset.column_count(),
            columns_scanned: selected.len(),
            pii_found,
            risk_summary,
            recommendations,
            scan_duration_seconds: elapsed,
        }
    }

    /// Findings for one column: at most one by name, then one per other type by pattern
    pub fn scan_column(&self, column: &Column, total_rows: usize, source: &str) -> Vec<PIIMatch> {
        let mut matches = Vec::new();
        let non_null_count = column.non_null_count();

        let by_name = self.registry.match_column_name(column.name());
        if let Some(pii_type) = by_name {
            if non_null_count > 0 || self.config.emit_zero_count_matches {
                let samples = column
                    .non_null()
                    .take(self.config.max_samples)
                    .filter_map(|c| c.render())
                    .collect();
                matches.push(self.finding(
                    column,
                    pii_type,
                    DetectionMethod::ColumnName,
                    samples,
                    non_null_count,
                    total_rows,
                    source,
                ));
            }
        }

        if column.kind().is_textual() {
            matches.extend(self.pattern_findings(column, by_name, total_rows, source));
        }

        for m in &matches {
            debug!(
                column = %m.column,
                pii_type = %m.pii_type,
                method = ?m.detection_method,
                count = m.count,
                "PII finding"
            );
        }
        matches
    }

    fn pattern_findings(
        &self,
        column: &Column,
        skip: Option<PIIType>,
        total_rows: usize,
        source: &str,
    ) -> Vec<PIIMatch> {
        let patterns = self.registry.patterns();
        let sample: Vec<String> = column
            .non_null()
            .take(self.config.sample_size)
            .filter_map(|c| c.render())
            .collect();
        if sample.is_empty() {
            return Vec::new();
        }

        let mut hits = vec![0usize; patterns.len()];
        let mut samples: Vec<Vec<String>> = vec![Vec::new(); patterns.len()];
        for value in &sample {
            for idx in self.registry.matching_indices(value) {
                hits[idx] += 1;
                if samples[idx].len() < self.config.max_samples {
                    samples[idx].push(value.clone());
                }
            }
        }

        let non_null_count = column.non_null_count();
        patterns
            .iter()
            .zip(hits)
            .zip(samples)
            .filter(|((pattern, hits), _)| *hits > 0 && Some(pattern.pii_type) != skip)
            .filter_map(|((pattern, hits), samples)| {
                let ratio = hits as f64 / sample.len() as f64;
                let estimated = (ratio * non_null_count as f64).round() as usize;
                (estimated > 0).then(|| {
                    self.finding(
                        column,
                        pattern.pii_type,
                        DetectionMethod::Pattern,
                        samples,
                        estimated,
                        total_rows,
                        source,
                    )
                })
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn finding(
        &self,
        column: &Column,
        pii_type: PIIType,
        detection_method: DetectionMethod,
        sample_values: Vec<String>,
        count: usize,
        total_rows: usize,
        source: &str,
    ) -> PIIMatch {
        PIIMatch {
            column: column.name().to_string(),
            pii_type,
            detection_method,
            sample_values,
            count,
            percentage: percentage(count, total_rows),
            risk_level: pii_type.risk_level(),
            source: source.to_string(),
        }
    }
}

fn percentage(count: usize, total_rows: usize) -> f64 {
    if total_rows == 0 {
        return 0.0;
    }
    (count as f64 / total_rows as f64 * 10_000.0).round() / 100.0
}
