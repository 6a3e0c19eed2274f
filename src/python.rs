// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings for the scanner and the anonymizer
//
// Datasets cross the boundary as `dict[str, list]`, the column-oriented
// shape of `DataFrame.to_dict("list")`.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::collections::HashMap;

use crate::anonymizer::{
    mask_cpf, mask_email, mask_phone, AnonymizationConfig, Anonymizer, AnonymizerConfig,
};
use crate::dataset::{Cell, Column, Dataset};
use crate::error::AnonymizeError;
use crate::scanner::{PatternRegistry, Scanner, ScannerConfig};

fn to_py_err(e: AnonymizeError) -> PyErr {
    PyValueError::new_err(format!("[{}] {}", e.code(), e))
}

fn cell_from_py(item: &Bound<'_, PyAny>) -> PyResult<Cell> {
    if item.is_none() {
        return Ok(Cell::Null);
    }
    if let Ok(text) = item.extract::<String>() {
        return Ok(Cell::Text(text));
    }
    if let Ok(number) = item.extract::<f64>() {
        // pandas hands missing floats over as NaN
        return Ok(if number.is_nan() {
            Cell::Null
        } else {
            Cell::Number(number)
        });
    }
    if item.hasattr("isoformat")? {
        let iso: String = item.call_method0("isoformat")?.extract()?;
        return Ok(match NaiveDate::parse_from_str(&iso, "%Y-%m-%d") {
            Ok(date) => Cell::Date(date),
            Err(_) => Cell::Text(iso),
        });
    }
    Ok(Cell::Text(item.str()?.to_string()))
}

fn dataset_from_py(data: &Bound<'_, PyDict>) -> PyResult<Dataset> {
    let mut columns = Vec::with_capacity(data.len());
    for (key, values) in data.iter() {
        let name: String = key.extract()?;
        let cells = values
            .try_iter()?
            .map(|item| cell_from_py(&item?))
            .collect::<PyResult<Vec<Cell>>>()?;
        columns.push(Column::new(name, cells));
    }
    Dataset::new(columns).map_err(to_py_err)
}

fn cell_to_py(py: Python<'_>, cell: &Cell) -> PyResult<Py<PyAny>> {
    Ok(match cell {
        Cell::Null => py.None(),
        Cell::Number(n) => n.into_pyobject(py)?.into_any().unbind(),
        Cell::Text(s) => s.into_pyobject(py)?.into_any().unbind(),
        Cell::Date(d) => d
            .format("%Y-%m-%d")
            .to_string()
            .into_pyobject(py)?
            .into_any()
            .unbind(),
    })
}

fn dataset_to_py(py: Python<'_>, dataset: &Dataset) -> PyResult<Py<PyAny>> {
    let out = PyDict::new(py);
    for column in dataset.columns() {
        let values = column
            .cells()
            .iter()
            .map(|cell| cell_to_py(py, cell))
            .collect::<PyResult<Vec<_>>>()?;
        out.set_item(column.name(), PyList::new(py, values)?)?;
    }
    Ok(out.into_any().unbind())
}

/// PII scanner exposed to Python
///
/// # Example (Python)
/// ```python
/// from pii_compliance import PIIScanner
///
/// scanner = PIIScanner({"sample_size": 500})
/// report = json.loads(scanner.scan({"cpf": ["123.456.789-00"]}, "clientes.csv"))
/// ```
#[pyclass(name = "PIIScanner")]
pub struct PyScanner {
    inner: Scanner,
}

#[pymethods]
impl PyScanner {
    /// Keys: `sample_size`, `max_samples`, `emit_zero_count_matches`
    #[new]
    #[pyo3(signature = (config=None))]
    pub fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let mut scanner_config = ScannerConfig::default();
        if let Some(dict) = config {
            if let Some(v) = dict.get_item("sample_size")? {
                scanner_config.sample_size = v.extract()?;
            }
            if let Some(v) = dict.get_item("max_samples")? {
                scanner_config.max_samples = v.extract()?;
            }
            if let Some(v) = dict.get_item("emit_zero_count_matches")? {
                scanner_config.emit_zero_count_matches = v.extract()?;
            }
        }
        Ok(Self {
            inner: Scanner::new(PatternRegistry::builtin(), scanner_config),
        })
    }

    /// Scan a column dict and return the report as JSON
    #[pyo3(signature = (data, source_name="dataframe"))]
    pub fn scan(&self, data: &Bound<'_, PyDict>, source_name: &str) -> PyResult<String> {
        let dataset = dataset_from_py(data)?;
        self.inner
            .scan(&dataset, source_name, None)
            .to_json()
            .map_err(to_py_err)
    }
}

/// Data anonymizer exposed to Python
#[pyclass(name = "DataAnonymizer")]
pub struct PyAnonymizer {
    inner: Anonymizer,
}

#[pymethods]
impl PyAnonymizer {
    #[new]
    #[pyo3(signature = (salt, strict_mode=false, seed=None))]
    pub fn new(salt: String, strict_mode: bool, seed: Option<u64>) -> PyResult<Self> {
        let config = AnonymizerConfig {
            strict_mode,
            seed,
            ..Default::default()
        };
        let inner = Anonymizer::new(salt, config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Anonymize a column dict with a JSON column config
    pub fn anonymize(
        &mut self,
        py: Python<'_>,
        data: &Bound<'_, PyDict>,
        config_json: &str,
    ) -> PyResult<Py<PyAny>> {
        let dataset = dataset_from_py(data)?;
        let config = AnonymizationConfig::from_json(config_json).map_err(to_py_err)?;
        let outcome = self
            .inner
            .anonymize_dataset(&dataset, &config)
            .map_err(to_py_err)?;
        dataset_to_py(py, &outcome.dataset)
    }

    pub fn get_token_mapping(&self) -> HashMap<String, String> {
        self.inner.get_token_mapping()
    }

    pub fn detokenize(&self, token: &str) -> Option<String> {
        self.inner.detokenize(token).map(str::to_string)
    }

    pub fn clear_token_mapping(&mut self) {
        self.inner.clear_token_mapping();
    }

    /// `(is_secure, warning)` for the configured salt
    pub fn validate_salt(&self) -> (bool, Option<String>) {
        let report = self.inner.salt_report();
        (report.secure, report.warning)
    }
}

#[pyfunction(name = "mask_cpf")]
fn py_mask_cpf(cpf: &str) -> String {
    mask_cpf(cpf)
}

#[pyfunction(name = "mask_email")]
fn py_mask_email(email: &str) -> String {
    mask_email(email)
}

#[pyfunction(name = "mask_phone")]
fn py_mask_phone(phone: &str) -> String {
    mask_phone(phone)
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyScanner>()?;
    m.add_class::<PyAnonymizer>()?;
    m.add_function(wrap_pyfunction!(py_mask_cpf, m)?)?;
    m.add_function(wrap_pyfunction!(py_mask_email, m)?)?;
    m.add_function(wrap_pyfunction!(py_mask_phone, m)?)?;
    Ok(())
}
