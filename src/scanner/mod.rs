// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII Scanner
//
// Column-level detection of personal data in tabular datasets using:
// - Column-name keyword heuristics (declared identity)
// - RegexSet over a bounded value sample (observed shape)
// - A fixed risk model and rule-based recommendations

pub mod config;
pub mod detector;
pub mod patterns;
pub mod report;
pub mod risk;

pub use config::{DetectionMethod, PIIType, RiskLevel, ScannerConfig};
pub use detector::Scanner;
pub use patterns::{PatternRegistry, PatternRegistryBuilder};
pub use report::{PIIMatch, ScanResult};
pub use risk::RiskSummary;
