// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Data Anonymizer
//
// Column-level anonymization of tabular datasets:
// - Masking, salted hashing and reversible tokenization
// - Pseudonymization with consistent synthetic values
// - Generalization and statistical noise for quasi-identifiers

pub mod config;
pub mod engine;
pub mod masking;
pub mod salt;
pub mod synthetic;
pub mod transforms;
pub mod vault;

pub use config::{
    AnonymizationConfig, AnonymizationMethod, AnonymizerConfig, GeneralizationKind,
    GeneralizeParams, HashAlgorithm, HashParams, MaskParams, NoiseDistribution, NoiseParams,
    PseudonymizeParams, SuppressParams, TokenizeParams, Transform,
};
pub use engine::{AnonymizationOutcome, Anonymizer};
pub use masking::{mask_cpf, mask_email, mask_phone};
pub use salt::{SaltPolicy, SaltReport};
pub use synthetic::{FakerProvider, SyntheticValueProvider};
pub use vault::TokenVault;
