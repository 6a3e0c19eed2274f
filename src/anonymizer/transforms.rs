// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Column transforms, one per anonymization method
//
// Every transform maps a column to a new cell vector of the same length.
// Nulls stay null except under suppression.

use chrono::Datelike;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::config::{
    GeneralizationKind, GeneralizeParams, HashParams, MaskParams, NoiseDistribution, NoiseParams,
    SuppressParams, TokenizeParams,
};
use super::masking::{hash_value, mask_value};
use super::synthetic::SyntheticValueProvider;
use super::vault::TokenVault;
use crate::dataset::{Cell, Column};
use crate::error::{AnonymizeError, AnonymizeResult};
use crate::scanner::PIIType;

/// Bucket for values outside the kept set of a top-k generalization
pub const OTHER_LABEL: &str = "Outros";

const PSEUDONYM_ATTEMPTS: usize = 8;

fn map_rendered(column: &Column, mut f: impl FnMut(&str) -> Cell) -> Vec<Cell> {
    column
        .cells()
        .iter()
        .map(|cell| cell.render().map_or(Cell::Null, |v| f(&v)))
        .collect()
}

pub fn mask(column: &Column, params: &MaskParams) -> Vec<Cell> {
    map_rendered(column, |v| Cell::Text(mask_value(v, params)))
}

pub fn hash(column: &Column, salt: &str, params: &HashParams) -> Vec<Cell> {
    map_rendered(column, |v| {
        Cell::Text(hash_value(salt, v, params.algorithm, params.truncate))
    })
}

/// Replace each distinct value with one synthetic value
///
/// Distinct inputs get distinct replacements; after a few collisions the
/// replacement is suffixed to keep the mapping injective.
pub fn pseudonymize(
    column: &Column,
    provider: &mut dyn SyntheticValueProvider,
    pii_type: PIIType,
) -> Vec<Cell> {
    let mut mapping: HashMap<String, String> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();

    map_rendered(column, |v| {
        if let Some(fake) = mapping.get(v) {
            return Cell::Text(fake.clone());
        }

        let mut fake = provider.generate(pii_type);
        let mut attempts = 1;
        while used.contains(&fake) && attempts < PSEUDONYM_ATTEMPTS {
            fake = provider.generate(pii_type);
            attempts += 1;
        }
        if used.contains(&fake) {
            fake = format!("{}-{}", fake, used.len());
        }

        used.insert(fake.clone());
        mapping.insert(v.to_string(), fake.clone());
        Cell::Text(fake)
    })
}

pub fn generalize(column: &Column, params: &GeneralizeParams) -> Vec<Cell> {
    match params.kind {
        GeneralizationKind::Range => generalize_range(column, params.bins, params.labels.as_deref()),
        GeneralizationKind::Year => column
            .cells()
            .iter()
            .map(|cell| match cell {
                Cell::Date(d) => Cell::Number(f64::from(d.year())),
                _ => Cell::Null,
            })
            .collect(),
        GeneralizationKind::Truncate => map_rendered(column, |v| {
            let prefix: String = v.chars().take(params.prefix_len).collect();
            Cell::Text(format!("{prefix}***"))
        }),
        GeneralizationKind::TopK => generalize_top_k(column, params.bins),
    }
}

/// Equal-width ranges between the column minimum and maximum
fn generalize_range(column: &Column, bins: usize, labels: Option<&[String]>) -> Vec<Cell> {
    let values: Vec<f64> = column
        .cells()
        .iter()
        .filter_map(Cell::as_number)
        .filter(|v| v.is_finite())
        .collect();
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return vec![Cell::Null; column.len()];
    };
    let max = values.iter().copied().fold(min, f64::max);
    let bins = bins.max(1);
    let width = (max - min) / bins as f64;

    let label = |idx: usize| -> String {
        if let Some(custom) = labels.and_then(|l| l.get(idx)) {
            return custom.clone();
        }
        if width == 0.0 {
            return format!("{}-{}", format_bound(min), format_bound(max));
        }
        let lo = min + width * idx as f64;
        let hi = if idx + 1 == bins {
            max
        } else {
            min + width * (idx + 1) as f64
        };
        format!("{}-{}", format_bound(lo), format_bound(hi))
    };

    column
        .cells()
        .iter()
        .map(|cell| match cell.as_number() {
            Some(v) if v.is_finite() => {
                // Bins are closed on the right; the first one also holds the minimum
                let idx = if width == 0.0 {
                    0
                } else {
                    (((v - min) / width).ceil() as usize)
                        .saturating_sub(1)
                        .min(bins - 1)
                };
                Cell::Text(label(idx))
            }
            _ => Cell::Null,
        })
        .collect()
}

fn format_bound(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Keep the `bins - 1` most frequent values, ties broken by first appearance
fn generalize_top_k(column: &Column, bins: usize) -> Vec<Cell> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, cell) in column.cells().iter().enumerate() {
        if let Some(v) = cell.render() {
            counts.entry(v).or_insert((0, position)).0 += 1;
        }
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    let kept: HashSet<String> = ranked
        .into_iter()
        .take(bins.saturating_sub(1))
        .map(|(v, _)| v)
        .collect();

    column
        .cells()
        .iter()
        .map(|cell| match cell.render() {
            None => Cell::Null,
            Some(v) if kept.contains(&v) => cell.clone(),
            Some(_) => Cell::Text(OTHER_LABEL.to_string()),
        })
        .collect()
}

pub fn suppress(column: &Column, params: &SuppressParams) -> Vec<Cell> {
    vec![params.replacement.clone(); column.len()]
}

pub fn tokenize(column: &Column, vault: &mut TokenVault, params: &TokenizeParams) -> Vec<Cell> {
    map_rendered(column, |v| Cell::Text(vault.tokenize(v, &params.prefix)))
}

enum NoiseSampler {
    Gaussian(Normal<f64>),
    Uniform(f64),
    /// Difference of two exponentials with mean `scale`
    Laplace(Exp<f64>),
}

impl NoiseSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            NoiseSampler::Gaussian(normal) => normal.sample(rng),
            NoiseSampler::Uniform(scale) => rng.gen_range(-scale..*scale),
            NoiseSampler::Laplace(exp) => exp.sample(rng) - exp.sample(rng),
        }
    }
}

/// Add zero-mean noise scaled by the sample standard deviation
pub fn noise<R: Rng + ?Sized>(
    column: &Column,
    rng: &mut R,
    params: &NoiseParams,
) -> AnonymizeResult<Vec<Cell>> {
    if let Some(row) = column
        .cells()
        .iter()
        .position(|cell| cell.as_number().is_some_and(|v| !v.is_finite()))
    {
        return Err(AnonymizeError::NonFiniteValue {
            column: column.name().to_string(),
            row,
        });
    }

    let invalid = |message: String| AnonymizeError::InvalidParameter {
        column: column.name().to_string(),
        message,
    };

    let values: Vec<f64> = column.cells().iter().filter_map(Cell::as_number).collect();
    let scale = sample_std(&values) * params.noise_level;

    if !scale.is_finite() {
        warn!(column = column.name(), "standard deviation overflows");
        return Err(invalid("standard deviation is not finite".to_string()));
    }
    if scale <= 0.0 {
        return Ok(column.cells().to_vec());
    }
    let sampler = match params.distribution {
        NoiseDistribution::Gaussian => {
            NoiseSampler::Gaussian(Normal::new(0.0, scale).map_err(|e| invalid(e.to_string()))?)
        }
        NoiseDistribution::Uniform => NoiseSampler::Uniform(scale),
        NoiseDistribution::Laplace => {
            NoiseSampler::Laplace(Exp::new(1.0 / scale).map_err(|e| invalid(e.to_string()))?)
        }
    };

    Ok(column
        .cells()
        .iter()
        .map(|cell| match cell.as_number() {
            Some(v) => Cell::Number(v + sampler.sample(rng)),
            None => Cell::Null,
        })
        .collect())
}

/// Standard deviation with Bessel's correction, zero below two values
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
