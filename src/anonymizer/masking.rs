// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Value-level masking and hashing

use sha2::{Digest, Sha256, Sha512};

use super::config::{HashAlgorithm, MaskParams};

/// Mask a single value
///
/// Visible characters never overlap: when `visible_start + visible_end`
/// exceeds the value length the end window shrinks first.
pub fn mask_value(value: &str, params: &MaskParams) -> String {
    if let Some(pattern) = &params.pattern {
        return pattern.clone();
    }

    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let start = params.visible_start.min(len);
    let end = params.visible_end.min(len - start);
    let hidden = len - start - end;

    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..start]);
    out.extend(std::iter::repeat(params.mask_char).take(hidden));
    out.extend(&chars[len - end..]);
    out
}

/// Salted hex digest of `value`, optionally truncated
pub fn hash_value(salt: &str, value: &str, algorithm: HashAlgorithm, truncate: Option<usize>) -> String {
    let salted = format!("{salt}{value}");
    let mut digest = match algorithm {
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(salted.as_bytes())),
        HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(salted.as_bytes())),
        HashAlgorithm::Md5 => format!("{:x}", md5::compute(salted.as_bytes())),
    };
    if let Some(n) = truncate {
        digest.truncate(n);
    }
    digest
}

/// `123.456.789-09` → `123.***.***-09`
pub fn mask_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 11 {
        return "***.***.***-**".to_string();
    }
    format!("{}.***.***-{}", &digits[..3], &digits[9..])
}

/// `joao@empresa.com` → `j***@empresa.com`
pub fn mask_email(email: &str) -> String {
    let Some((user, domain)) = email.split_once('@') else {
        return "***@***.***".to_string();
    };
    let mut chars = user.chars();
    let masked_user = match chars.next() {
        Some(first) if user.chars().count() > 1 => {
            format!("{}{}", first, "*".repeat(chars.count()))
        }
        _ => "*".to_string(),
    };
    format!("{masked_user}@{domain}")
}

/// Keep only the area code: `(11) 98765-4321` → `(11) *****-****`
pub fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return "(**) *****-****".to_string();
    }
    format!("({}) *****-****", &digits[..2])
}
