// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// End-to-end tests: scan a dataset, derive a config, anonymize it

use pii_compliance::anonymizer::{
    mask_cpf, GeneralizeParams, HashParams, SyntheticValueProvider, TokenizeParams,
};
use pii_compliance::{
    AnonymizationConfig, AnonymizationMethod, Anonymizer, AnonymizerConfig, AnonymizeError, Cell,
    Column, Dataset, DetectionMethod, PIIType, RiskLevel, Scanner, Transform,
};
use std::collections::HashSet;

const SALT: &str = "unit-test-salt-0001";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn anonymizer() -> Anonymizer {
    init_tracing();
    Anonymizer::new(
        SALT,
        AnonymizerConfig {
            seed: Some(2024),
            ..Default::default()
        },
    )
    .unwrap()
}

fn cpf_dataset() -> Dataset {
    Dataset::new(vec![Column::from_values(
        "cpf",
        ["123.456.789-00", "987.654.321-00", "111.222.333-44"],
    )])
    .unwrap()
}

fn customers() -> Dataset {
    Dataset::new(vec![
        Column::from_values("nome", ["Ana Souza", "Bruno Lima", "Carla Dias", "Ana Souza"]),
        Column::from_values(
            "cpf",
            ["123.456.789-00", "987.654.321-00", "111.222.333-44", "123.456.789-00"],
        ),
        Column::from_values(
            "email",
            ["ana@mail.com", "bruno@mail.com", "carla@mail.com", "ana@mail.com"],
        ),
        Column::from_values("cep", ["01310-100", "20040-002", "30130-110", "01310-100"]),
        Column::from_values(
            "observacao",
            [Some("ligar para 11 98765-4321"), None, Some("cliente antigo"), None],
        ),
        Column::from_values("idade", [25.0, 35.0, 45.0, 55.0]),
    ])
    .unwrap()
}

#[test]
fn test_scan_cpf_column() {
    let result = Scanner::default().scan(&cpf_dataset(), "clientes.csv", None);

    assert_eq!(result.pii_found.len(), 1);
    let m = &result.pii_found[0];
    assert_eq!(m.column, "cpf");
    assert_eq!(m.pii_type, PIIType::Cpf);
    assert_eq!(m.risk_level, RiskLevel::High);
    assert_eq!(m.count, 3);
    assert_eq!(m.percentage, 100.0);
    assert_eq!(m.source, "clientes.csv");
    assert_eq!(result.risk_summary.high, 1);
}

#[test]
fn test_hash_cpf_is_reproducible() {
    let transform = Transform::Hash(HashParams {
        truncate: Some(12),
        ..Default::default()
    });
    let ds = cpf_dataset();

    let first = anonymizer().anonymize_column(&ds, "cpf", &transform).unwrap();
    let second = anonymizer().anonymize_column(&ds, "cpf", &transform).unwrap();

    let hashes: Vec<String> = first
        .column("cpf")
        .unwrap()
        .cells()
        .iter()
        .map(|c| c.render().unwrap())
        .collect();
    assert_eq!(hashes.iter().collect::<HashSet<_>>().len(), 3);
    for h in &hashes {
        assert_eq!(h.len(), 12);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
    assert_eq!(first, second);
}

#[test]
fn test_generalize_age_into_ordered_ranges() {
    let ds = Dataset::new(vec![Column::from_values(
        "idade",
        [25.0, 35.0, 45.0, 55.0, 65.0],
    )])
    .unwrap();
    let transform = Transform::Generalize(GeneralizeParams {
        bins: 3,
        ..Default::default()
    });

    let out = anonymizer().anonymize_column(&ds, "idade", &transform).unwrap();
    let labels: Vec<String> = out
        .column("idade")
        .unwrap()
        .cells()
        .iter()
        .map(|c| c.render().unwrap())
        .collect();

    let mut distinct: Vec<&String> = Vec::new();
    for label in &labels {
        if !distinct.contains(&label) {
            distinct.push(label);
        }
    }
    assert_eq!(distinct.len(), 3);
    assert!(distinct[0].starts_with("25-"));
    assert!(distinct[2].ends_with("-65"));

    let lower_bounds: Vec<f64> = distinct
        .iter()
        .map(|l| l.split('-').next().unwrap().parse().unwrap())
        .collect();
    assert!(lower_bounds.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_unknown_column_is_skipped() {
    let ds = cpf_dataset();
    let config =
        AnonymizationConfig::new().with("ghost", Transform::from_method(AnonymizationMethod::Mask));

    let outcome = anonymizer().anonymize_dataset(&ds, &config).unwrap();

    assert!(outcome.applied_columns.is_empty());
    assert_eq!(outcome.skipped_columns, vec!["ghost"]);
    assert_eq!(outcome.dataset, ds);
    assert!(outcome.dataset.shares_column(&ds, "cpf"));
}

#[test]
fn test_scan_customer_table() {
    let result = Scanner::default().scan(&customers(), "clientes.csv", None);

    let found: Vec<(&str, PIIType, DetectionMethod)> = result
        .pii_found
        .iter()
        .map(|m| (m.column.as_str(), m.pii_type, m.detection_method))
        .collect();

    assert!(found.contains(&("nome", PIIType::Name, DetectionMethod::ColumnName)));
    assert!(found.contains(&("cpf", PIIType::Cpf, DetectionMethod::ColumnName)));
    assert!(found.contains(&("email", PIIType::Email, DetectionMethod::ColumnName)));
    assert!(found.contains(&("cep", PIIType::PostalCode, DetectionMethod::ColumnName)));
    assert!(found.contains(&("observacao", PIIType::Phone, DetectionMethod::Pattern)));
    assert!(!found.iter().any(|(c, _, _)| *c == "idade"));

    // A type found by name is not reported again by pattern
    assert!(!found.contains(&("cpf", PIIType::Cpf, DetectionMethod::Pattern)));

    assert_eq!(result.risk_summary.total(), result.pii_found.len());
    assert!(result.recommendations.iter().any(|r| r.contains("CPF/CNPJ")));
    assert!(result.to_json().unwrap().contains("\"pii_type\": \"cpf\""));
}

#[test]
fn test_scan_then_suggested_config() {
    let ds = customers();
    let scan = Scanner::default().scan(&ds, "clientes.csv", None);
    let config = AnonymizationConfig::suggest(&scan, &ds);

    assert_eq!(config.get("cpf").map(Transform::method), Some(AnonymizationMethod::Hash));
    assert_eq!(config.get("nome").map(Transform::method), Some(AnonymizationMethod::Mask));
    assert_eq!(
        config.get("cep").map(Transform::method),
        Some(AnonymizationMethod::Generalize)
    );

    let outcome = anonymizer().anonymize_dataset(&ds, &config).unwrap();
    let out = &outcome.dataset;

    assert_eq!(outcome.applied_columns.len(), config.len());
    assert!(out.shares_column(&ds, "idade"));
    assert_ne!(out.column("cpf"), ds.column("cpf"));

    // The anonymized table carries no raw CPF or email any more
    let rescan = Scanner::default().scan(out, "clientes_anon.csv", None);
    assert!(!rescan
        .pii_found
        .iter()
        .any(|m| m.detection_method == DetectionMethod::Pattern
            && matches!(m.pii_type, PIIType::Cpf | PIIType::Email)));
}

#[test]
fn test_original_dataset_is_never_modified() {
    let ds = customers();
    let before = ds.clone();
    let config = AnonymizationConfig::from_json(
        r#"{
            "nome": {"method": "pseudonymize", "pii_type": "name"},
            "cpf": {"method": "tokenize"},
            "email": {"method": "mask", "visible_start": 1},
            "observacao": {"method": "suppress"},
            "idade": {"method": "noise", "noise_level": 0.2}
        }"#,
    )
    .unwrap();

    let outcome = anonymizer().anonymize_dataset(&ds, &config).unwrap();

    assert_eq!(ds, before);
    assert_eq!(outcome.applied_columns.len(), 5);
    assert!(outcome.dataset.shares_column(&ds, "cep"));
    assert_eq!(
        outcome.dataset.column("observacao").unwrap().cells(),
        &[Cell::Null, Cell::Null, Cell::Null, Cell::Null]
    );
}

#[test]
fn test_invalid_config_reports_every_column() {
    let err = AnonymizationConfig::from_json(
        r#"{
            "col1": {"method": "invalid1"},
            "col2": {"method": "invalid2"},
            "col3": {"method": "noise", "noise_level": 3.0}
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.code(), "ANON_INVALID_CONFIG");
    let message = err.to_string();
    for column in ["col1", "col2", "col3"] {
        assert!(message.contains(column), "{message}");
    }
}

#[test]
fn test_type_errors_aggregated_before_any_transform() {
    let ds = customers();
    let config = AnonymizationConfig::new()
        .with("cpf", Transform::Tokenize(TokenizeParams::default()))
        .with("nome", Transform::from_method(AnonymizationMethod::Noise))
        .with("email", Transform::from_method(AnonymizationMethod::Noise));

    let mut anon = anonymizer();
    let err = anon.anonymize_dataset(&ds, &config).unwrap_err();

    let columns: Vec<&str> = err.issues().iter().map(|i| i.column.as_str()).collect();
    assert_eq!(columns, vec!["nome", "email"]);
    assert!(err
        .issues()
        .iter()
        .all(|i| matches!(i.error, AnonymizeError::UnsupportedColumnType { .. })));
    assert!(anon.get_token_mapping().is_empty());
}

#[test]
fn test_noise_on_non_finite_salary_fails_instead_of_passing_through() {
    let ds = Dataset::new(vec![
        Column::from_values("cpf", ["123.456.789-00", "987.654.321-00", "111.222.333-44", "555.666.777-88"]),
        Column::from_values("salario", [1000.0, 2000.0, 3000.0, f64::INFINITY]),
    ])
    .unwrap();
    let config = AnonymizationConfig::from_json(
        r#"{
            "cpf": {"method": "tokenize"},
            "salario": {"method": "noise", "noise_level": 0.5}
        }"#,
    )
    .unwrap();

    let mut anon = anonymizer();
    let err = anon.anonymize_dataset(&ds, &config).unwrap_err();

    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].column, "salario");
    assert_eq!(err.issues()[0].error.code(), "ANON_NON_FINITE_VALUE");
    assert!(anon.get_token_mapping().is_empty());

    let single = anon.anonymize_column(
        &ds,
        "salario",
        &Transform::from_method(AnonymizationMethod::Noise),
    );
    assert!(matches!(
        single,
        Err(AnonymizeError::NonFiniteValue { row: 3, .. })
    ));
}

#[test]
fn test_strict_mode_refuses_placeholder_salt() {
    let result = Anonymizer::new(
        "CHANGE_THIS_SALT_IN_PRODUCTION",
        AnonymizerConfig {
            strict_mode: true,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(AnonymizeError::InsecureSalt(_))));
}

#[test]
fn test_separate_anonymizers_have_separate_vaults() {
    let ds = cpf_dataset();
    let tokenize = Transform::from_method(AnonymizationMethod::Tokenize);

    let mut a = anonymizer();
    let mut b = anonymizer();
    a.anonymize_column(&ds, "cpf", &tokenize).unwrap();
    let out = b.anonymize_column(&ds, "cpf", &tokenize).unwrap();

    assert_eq!(out.column("cpf").unwrap().cells()[0], Cell::from("TOK_00000001"));
    assert_eq!(a.get_token_mapping(), b.get_token_mapping());
    assert_eq!(b.detokenize("TOK_00000002"), Some("987.654.321-00"));
}

struct Sequential(usize);

impl SyntheticValueProvider for Sequential {
    fn generate(&mut self, pii_type: PIIType) -> String {
        self.0 += 1;
        format!("{}-{}", pii_type, self.0)
    }
}

#[test]
fn test_injected_synthetic_provider() {
    let ds = Dataset::new(vec![Column::from_values("nome", ["Ana", "Bia", "Ana"])]).unwrap();
    let mut anon =
        Anonymizer::with_provider(SALT, AnonymizerConfig::default(), Box::new(Sequential(0)))
            .unwrap();

    let out = anon
        .anonymize_column(&ds, "nome", &Transform::from_method(AnonymizationMethod::Pseudonymize))
        .unwrap();

    assert_eq!(
        out.column("nome").unwrap().cells(),
        &[Cell::from("name-1"), Cell::from("name-2"), Cell::from("name-1")]
    );
}

#[test]
fn test_partial_mask_helpers() {
    assert_eq!(mask_cpf("529.982.247-25"), "529.***.***-25");
}
