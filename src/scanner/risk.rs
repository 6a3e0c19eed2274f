// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Risk model: default severity per PII type and per-level finding counts

use serde::{Deserialize, Serialize};

use super::config::{PIIType, RiskLevel};
use super::report::PIIMatch;

impl PIIType {
    /// Default risk level of a finding of this type
    pub fn risk_level(self) -> RiskLevel {
        match self {
            PIIType::CreditCard | PIIType::HealthData => RiskLevel::Critical,
            PIIType::Cpf | PIIType::Rg | PIIType::FinancialData => RiskLevel::High,
            PIIType::Cnpj
            | PIIType::Email
            | PIIType::Phone
            | PIIType::BirthDate
            | PIIType::Name
            | PIIType::Address => RiskLevel::Medium,
            PIIType::PostalCode | PIIType::IpAddress | PIIType::Other => RiskLevel::Low,
        }
    }
}

/// Number of findings per risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl RiskSummary {
    pub fn from_matches(matches: &[PIIMatch]) -> Self {
        let mut summary = Self::default();
        for m in matches {
            *summary.slot(m.risk_level) += 1;
        }
        summary
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }

    /// Most severe level with at least one finding
    pub fn highest(&self) -> Option<RiskLevel> {
        RiskLevel::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| self.count(*level) > 0)
    }

    fn slot(&mut self, level: RiskLevel) -> &mut usize {
        match level {
            RiskLevel::Low => &mut self.low,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::High => &mut self.high,
            RiskLevel::Critical => &mut self.critical,
        }
    }
}
