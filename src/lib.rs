// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII detection and anonymization for tabular datasets
// Optional PyO3 bindings behind the `python` feature

// Allow non-local definitions for PyO3 macros
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod anonymizer;
pub mod dataset;
pub mod documents;
pub mod error;
pub mod scanner;

#[cfg(feature = "python")]
mod python;

pub use anonymizer::{
    AnonymizationConfig, AnonymizationMethod, AnonymizationOutcome, Anonymizer, AnonymizerConfig,
    Transform,
};
pub use dataset::{Cell, Column, ColumnKind, Dataset};
pub use error::{AnonymizeError, AnonymizeResult, ConfigIssue};
pub use scanner::{
    DetectionMethod, PIIMatch, PIIType, PatternRegistry, RiskLevel, ScanResult, Scanner,
    ScannerConfig,
};

/// Python module: pii_compliance
///
/// # Examples
///
/// ```python
/// import json
/// from pii_compliance import PIIScanner, DataAnonymizer
///
/// data = {"nome": ["Ana Souza"], "cpf": ["123.456.789-00"]}
/// report = json.loads(PIIScanner().scan(data, "clientes.csv"))
///
/// anonymizer = DataAnonymizer("a-long-random-salt-value")
/// safe = anonymizer.anonymize(data, '{"cpf": {"method": "tokenize"}}')
/// print(safe["cpf"])  # ["TOK_00000001"]
/// ```
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn pii_compliance(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::types::PyModuleMethods;

    python::register(m)?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "PII detection and anonymization for tabular datasets",
    )?;

    Ok(())
}
