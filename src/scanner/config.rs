// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration and vocabulary types for the PII scanner

use serde::{Deserialize, Serialize};
use std::fmt;

/// PII types that can be detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PIIType {
    Cpf,
    Cnpj,
    Rg,
    Email,
    Phone,
    PostalCode,
    CreditCard,
    IpAddress,
    BirthDate,
    Name,
    Address,
    HealthData,
    FinancialData,
    Other,
}

impl PIIType {
    pub const ALL: [PIIType; 14] = [
        PIIType::Cpf,
        PIIType::Cnpj,
        PIIType::Rg,
        PIIType::Email,
        PIIType::Phone,
        PIIType::PostalCode,
        PIIType::CreditCard,
        PIIType::IpAddress,
        PIIType::BirthDate,
        PIIType::Name,
        PIIType::Address,
        PIIType::HealthData,
        PIIType::FinancialData,
        PIIType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PIIType::Cpf => "cpf",
            PIIType::Cnpj => "cnpj",
            PIIType::Rg => "rg",
            PIIType::Email => "email",
            PIIType::Phone => "phone",
            PIIType::PostalCode => "postal_code",
            PIIType::CreditCard => "credit_card",
            PIIType::IpAddress => "ip_address",
            PIIType::BirthDate => "birth_date",
            PIIType::Name => "name",
            PIIType::Address => "address",
            PIIType::HealthData => "health_data",
            PIIType::FinancialData => "financial_data",
            PIIType::Other => "other",
        }
    }
}

impl fmt::Display for PIIType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Declared identity: the column name contains a known keyword
    ColumnName,
    /// Observed shape: sampled values match the type's regex
    Pattern,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Non-null values sampled per column for the pattern check
    pub sample_size: usize,
    /// Sample values kept on each finding
    pub max_samples: usize,
    /// Keep column-name findings on columns without any non-null value
    pub emit_zero_count_matches: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            max_samples: 5,
            emit_zero_count_matches: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pii_type_as_str() {
        assert_eq!(PIIType::Cpf.as_str(), "cpf");
        assert_eq!(PIIType::CreditCard.as_str(), "credit_card");
        assert_eq!(PIIType::HealthData.to_string(), "health_data");
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.sample_size, 1000);
        assert_eq!(config.max_samples, 5);
        assert!(!config.emit_zero_count_matches);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ScannerConfig = serde_json::from_str(r#"{"sample_size": 50}"#).unwrap();
        assert_eq!(config.sample_size, 50);
        assert_eq!(config.max_samples, 5);
    }
}
