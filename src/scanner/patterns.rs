// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Declarative catalogue of PII types: value patterns and column-name keywords
// Uses RegexSet so a sampled value is tested against every pattern in one pass

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use std::sync::Arc;

use super::config::PIIType;
use crate::error::AnonymizeResult;

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pii_type: PIIType,
    pub regex: Regex,
    pub description: String,
}

/// Column-name keywords implying a PII type
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub pii_type: PIIType,
    pub keywords: Vec<String>,
}

/// Pattern definitions (type, pattern, description)
type PatternDef = (PIIType, &'static str, &'static str);

static BUILTIN_PATTERNS: &[PatternDef] = &[
    (PIIType::Cpf, r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b", "Brazilian CPF"),
    (
        PIIType::Cnpj,
        r"\b\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}\b",
        "Brazilian CNPJ",
    ),
    (
        PIIType::Email,
        r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b",
        "Email address",
    ),
    (
        PIIType::Phone,
        r"\b\(?\d{2}\)?\s?\d{4,5}-?\d{4}\b",
        "Brazilian phone number",
    ),
    (PIIType::PostalCode, r"\b\d{5}-?\d{3}\b", "Brazilian CEP"),
    (
        PIIType::CreditCard,
        r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",
        "Credit card number",
    ),
    (
        PIIType::IpAddress,
        r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
        "IPv4 address",
    ),
    (PIIType::BirthDate, r"\b\d{2}/\d{2}/\d{4}\b", "Date in DD/MM/YYYY format"),
];

// Checked in this order; the first type with a matching keyword wins
static BUILTIN_KEYWORDS: &[(PIIType, &[&str])] = &[
    (
        PIIType::Cpf,
        &["cpf", "cpf_titular", "nr_cpf", "num_cpf", "documento"],
    ),
    (PIIType::Cnpj, &["cnpj", "cnpj_empresa", "nr_cnpj"]),
    (PIIType::Rg, &["rg", "rg_titular", "identidade"]),
    (
        PIIType::Email,
        &["email", "e_mail", "email_contato", "correio"],
    ),
    (
        PIIType::Phone,
        &["telefone", "tel", "celular", "fone", "phone", "mobile"],
    ),
    (PIIType::PostalCode, &["cep", "codigo_postal", "zip"]),
    (
        PIIType::Name,
        &[
            "nome",
            "nome_completo",
            "nome_titular",
            "name",
            "primeiro_nome",
            "sobrenome",
        ],
    ),
    (
        PIIType::Address,
        &["endereco", "logradouro", "rua", "avenida", "address", "bairro"],
    ),
    (
        PIIType::BirthDate,
        &["data_nascimento", "dt_nascimento", "nascimento", "birth"],
    ),
    (
        PIIType::HealthData,
        &["cid", "diagnostico", "doenca", "medicamento", "prontuario", "cns"],
    ),
    (
        PIIType::FinancialData,
        &["salario", "renda", "conta", "agencia", "pis", "pasep"],
    ),
];

static BUILTIN: Lazy<Arc<PatternRegistry>> = Lazy::new(|| {
    match PatternRegistry::builder().with_builtin_rules().build() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            tracing::error!(error = %e, "built-in PII patterns failed to compile");
            Arc::new(PatternRegistry::default())
        }
    }
});

/// Immutable catalogue shared by scanners
///
/// Patterns are compiled once in [`PatternRegistryBuilder::build`] and never
/// mutated afterwards; share it behind an `Arc`.
#[derive(Debug)]
pub struct PatternRegistry {
    keyword_rules: Vec<KeywordRule>,
    patterns: Vec<CompiledPattern>,
    regex_set: RegexSet,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self {
            keyword_rules: Vec::new(),
            patterns: Vec::new(),
            regex_set: RegexSet::empty(),
        }
    }
}

impl PatternRegistry {
    /// Process-wide built-in catalogue
    pub fn builtin() -> Arc<PatternRegistry> {
        Arc::clone(&BUILTIN)
    }

    pub fn builder() -> PatternRegistryBuilder {
        PatternRegistryBuilder::default()
    }

    /// First PII type whose keywords occur in the case-folded column name
    pub fn match_column_name(&self, column_name: &str) -> Option<PIIType> {
        let folded = column_name.to_lowercase();
        self.keyword_rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| folded.contains(kw.as_str())))
            .map(|rule| rule.pii_type)
    }

    /// Indices (into [`patterns`](Self::patterns)) of every pattern matching `value`
    pub fn matching_indices(&self, value: &str) -> impl Iterator<Item = usize> {
        self.regex_set.matches(value).into_iter()
    }

    pub fn is_match(&self, pii_type: PIIType, value: &str) -> bool {
        self.pattern_for(pii_type)
            .map(|p| p.regex.is_match(value))
            .unwrap_or(false)
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn pattern_for(&self, pii_type: PIIType) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.pii_type == pii_type)
    }

    pub fn keywords_for(&self, pii_type: PIIType) -> &[String] {
        self.keyword_rules
            .iter()
            .find(|rule| rule.pii_type == pii_type)
            .map(|rule| rule.keywords.as_slice())
            .unwrap_or(&[])
    }
}

/// Collects rules before compiling them into a [`PatternRegistry`]
#[derive(Debug, Default)]
pub struct PatternRegistryBuilder {
    keyword_rules: Vec<KeywordRule>,
    patterns: Vec<(PIIType, String, String)>,
}

impl PatternRegistryBuilder {
    pub fn with_builtin_rules(mut self) -> Self {
        for (pii_type, keywords) in BUILTIN_KEYWORDS {
            self = self.keywords(*pii_type, keywords.iter().copied());
        }
        for (pii_type, pattern, description) in BUILTIN_PATTERNS {
            self = self.pattern(*pii_type, *pattern, *description);
        }
        self
    }

    /// Append keywords for a type; types keep the order they were first declared in
    pub fn keywords<I, S>(mut self, pii_type: PIIType, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords.into_iter().map(|k| k.as_ref().to_lowercase());
        match self
            .keyword_rules
            .iter_mut()
            .find(|rule| rule.pii_type == pii_type)
        {
            Some(rule) => rule.keywords.extend(keywords),
            None => self.keyword_rules.push(KeywordRule {
                pii_type,
                keywords: keywords.collect(),
            }),
        }
        self
    }

    /// Set the detection pattern of a type, replacing any previous one
    pub fn pattern(
        mut self,
        pii_type: PIIType,
        pattern: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let entry = (pii_type, pattern.into(), description.into());
        match self.patterns.iter_mut().find(|(t, _, _)| *t == pii_type) {
            Some(existing) => *existing = entry,
            None => self.patterns.push(entry),
        }
        self
    }

    /// Compile every pattern (case-insensitive) into the registry
    pub fn build(self) -> AnonymizeResult<PatternRegistry> {
        let mut patterns = Vec::with_capacity(self.patterns.len());
        for (pii_type, pattern, description) in &self.patterns {
            let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            patterns.push(CompiledPattern {
                pii_type: *pii_type,
                regex,
                description: description.clone(),
            });
        }

        let regex_set = if patterns.is_empty() {
            RegexSet::empty()
        } else {
            RegexSetBuilder::new(self.patterns.iter().map(|(_, p, _)| p.as_str()))
                .case_insensitive(true)
                .build()?
        };

        Ok(PatternRegistry {
            keyword_rules: self.keyword_rules,
            patterns,
            regex_set,
        })
    }
}
