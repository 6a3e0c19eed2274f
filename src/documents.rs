// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Check digits for Brazilian taxpayer documents (CPF and CNPJ)

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

fn digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn mod11_digit(sum: u32) -> u32 {
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        11 - rest
    }
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Both CPF check digits for the first nine digits
pub fn cpf_check_digits(base: &[u32; 9]) -> (u32, u32) {
    let first = mod11_digit(
        base.iter()
            .enumerate()
            .map(|(i, d)| d * (10 - i as u32))
            .sum(),
    );
    let second = mod11_digit(
        base.iter()
            .chain(std::iter::once(&first))
            .enumerate()
            .map(|(i, d)| d * (11 - i as u32))
            .sum(),
    );
    (first, second)
}

/// Both CNPJ check digits for the first twelve digits
pub fn cnpj_check_digits(base: &[u32; 12]) -> (u32, u32) {
    let first = mod11_digit(base.iter().zip(CNPJ_WEIGHTS_FIRST).map(|(d, w)| d * w).sum());
    let second = mod11_digit(
        base.iter()
            .chain(std::iter::once(&first))
            .zip(CNPJ_WEIGHTS_SECOND)
            .map(|(d, w)| d * w)
            .sum(),
    );
    (first, second)
}

/// Validate a CPF, formatted or not
pub fn is_valid_cpf(value: &str) -> bool {
    let digits = digits(value);
    if digits.len() != 11 || all_same(&digits) {
        return false;
    }
    let mut base = [0u32; 9];
    base.copy_from_slice(&digits[..9]);
    cpf_check_digits(&base) == (digits[9], digits[10])
}

/// Validate a CNPJ, formatted or not
pub fn is_valid_cnpj(value: &str) -> bool {
    let digits = digits(value);
    if digits.len() != 14 || all_same(&digits) {
        return false;
    }
    let mut base = [0u32; 12];
    base.copy_from_slice(&digits[..12]);
    cnpj_check_digits(&base) == (digits[12], digits[13])
}
