// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Synthetic replacement values for pseudonymization

use chrono::{Duration, NaiveDate};
use fake::faker::address::pt_br::{BuildingNumber, PostCode, StateAbbr, StreetName};
use fake::faker::creditcard::pt_br::CreditCardNumber;
use fake::faker::internet::pt_br::{FreeEmail, IPv4};
use fake::faker::name::pt_br::Name;
use fake::faker::phone_number::pt_br::CellNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::documents::{cnpj_check_digits, cpf_check_digits};
use crate::scanner::PIIType;

/// Source of realistic fake values, one per requested PII type
pub trait SyntheticValueProvider: Send + Sync {
    fn generate(&mut self, pii_type: PIIType) -> String;
}

/// Default provider backed by the `fake` pt_BR locale
///
/// Brazilian documents are generated with valid check digits so that
/// downstream validators accept them.
pub struct FakerProvider {
    rng: StdRng,
}

impl FakerProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn digits<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0u32; N];
        for d in out.iter_mut() {
            *d = self.rng.gen_range(0..10);
        }
        out
    }

    fn cpf(&mut self) -> String {
        let base: [u32; 9] = self.digits();
        let (d1, d2) = cpf_check_digits(&base);
        let s: String = base.iter().map(|d| char::from(b'0' + *d as u8)).collect();
        format!("{}.{}.{}-{}{}", &s[0..3], &s[3..6], &s[6..9], d1, d2)
    }

    fn cnpj(&mut self) -> String {
        let mut base = [0u32; 12];
        base[..8].copy_from_slice(&self.digits::<8>());
        base[8..].copy_from_slice(&[0, 0, 0, 1]);
        let (d1, d2) = cnpj_check_digits(&base);
        let s: String = base.iter().map(|d| char::from(b'0' + *d as u8)).collect();
        format!(
            "{}.{}.{}/{}-{}{}",
            &s[0..2],
            &s[2..5],
            &s[5..8],
            &s[8..12],
            d1,
            d2
        )
    }

    fn birth_date(&mut self) -> String {
        let offset = self.rng.gen_range(0..365 * 65);
        NaiveDate::from_ymd_opt(1940, 1, 1)
            .map(|start| (start + Duration::days(offset)).format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    fn short_id(&mut self) -> String {
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        id.simple().to_string()[..8].to_string()
    }
}

impl SyntheticValueProvider for FakerProvider {
    fn generate(&mut self, pii_type: PIIType) -> String {
        let rng = &mut self.rng;
        match pii_type {
            PIIType::Name => Name().fake_with_rng(rng),
            PIIType::Email => FreeEmail().fake_with_rng(rng),
            PIIType::CreditCard => CreditCardNumber().fake_with_rng(rng),
            PIIType::IpAddress => IPv4().fake_with_rng(rng),
            PIIType::Address => {
                let street: String = StreetName().fake_with_rng(rng);
                let number: String = BuildingNumber().fake_with_rng(rng);
                let uf: String = StateAbbr().fake_with_rng(rng);
                format!("{street}, {number} - {uf}")
            }
            PIIType::Phone => CellNumber().fake_with_rng(rng),
            PIIType::PostalCode => PostCode().fake_with_rng(rng),
            PIIType::Rg => format!(
                "{:02}.{:03}.{:03}-{}",
                rng.gen_range(10..100),
                rng.gen_range(0..1_000),
                rng.gen_range(0..1_000),
                rng.gen_range(0..10)
            ),
            PIIType::HealthData => format!(
                "CID {}{:02}.{}",
                char::from(b'A' + rng.gen_range(0..26u8)),
                rng.gen_range(0..100),
                rng.gen_range(0..10)
            ),
            PIIType::FinancialData => format!("{:.2}", rng.gen_range(100.0..100_000.0)),
            PIIType::Cpf => self.cpf(),
            PIIType::Cnpj => self.cnpj(),
            PIIType::BirthDate => self.birth_date(),
            PIIType::Other => self.short_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{is_valid_cnpj, is_valid_cpf};

    #[test]
    fn test_documents_have_valid_check_digits() {
        let mut provider = FakerProvider::new(Some(7));
        for _ in 0..50 {
            let cpf = provider.generate(PIIType::Cpf);
            assert!(is_valid_cpf(&cpf), "{cpf}");
            assert_eq!(cpf.len(), 14);

            let cnpj = provider.generate(PIIType::Cnpj);
            assert!(is_valid_cnpj(&cnpj), "{cnpj}");
            assert_eq!(cnpj.len(), 18);
        }
    }

    #[test]
    fn test_seeded_provider_is_reproducible() {
        let mut a = FakerProvider::new(Some(42));
        let mut b = FakerProvider::new(Some(42));
        for pii_type in PIIType::ALL {
            assert_eq!(a.generate(pii_type), b.generate(pii_type));
        }
    }

    #[test]
    fn test_brazilian_locale() {
        let mut provider = FakerProvider::new(Some(11));
        for _ in 0..20 {
            let email = provider.generate(PIIType::Email);
            assert!(email.ends_with(".br"), "{email}");

            let address = provider.generate(PIIType::Address);
            let street_type = address.split(' ').next().unwrap_or_default();
            assert!(
                ["Av.", "Avenida", "R.", "Rua", "Travessa", "Largo"].contains(&street_type),
                "{address}"
            );

            let phone = provider.generate(PIIType::Phone);
            assert_eq!(phone.len(), 15, "{phone}");
            assert_eq!(&phone[5..6], "9");
        }
    }

    #[test]
    fn test_shapes() {
        let mut provider = FakerProvider::new(Some(1));
        assert!(provider.generate(PIIType::Email).contains('@'));
        assert_eq!(provider.generate(PIIType::Other).len(), 8);
        assert_eq!(provider.generate(PIIType::PostalCode).len(), 9);
        let date = provider.generate(PIIType::BirthDate);
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
