//! CPF / CNPJ check-digit validation.
//!
//! Formatting characters are ignored: only the digits of the input are
//! considered. Up to 11 digits is treated as a CPF, anything longer as a CNPJ.

const CPF_LENGTH: usize = 11;
const CNPJ_LENGTH: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which taxpayer document a value is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cpf,
    Cnpj,
}

fn digits_of(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Classify a value by its digit count
pub fn document_kind(value: &str) -> DocumentKind {
    if digits_of(value).len() <= CPF_LENGTH {
        DocumentKind::Cpf
    } else {
        DocumentKind::Cnpj
    }
}

/// Validates a CPF or CNPJ, masked or not
pub fn validate_cpf_or_cnpj(value: &str) -> bool {
    let digits = digits_of(value);
    match document_kind(value) {
        DocumentKind::Cpf => is_valid_cpf(&digits),
        DocumentKind::Cnpj => is_valid_cnpj(&digits),
    }
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn is_valid_cpf(digits: &[u32]) -> bool {
    if digits.len() != CPF_LENGTH || all_same(digits) {
        return false;
    }

    cpf_check_digit(&digits[..9]) == digits[9] && cpf_check_digit(&digits[..10]) == digits[10]
}

/// Weights run from `len + 1` down to 2
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits.iter().enumerate().map(|(i, d)| d * (top - i as u32)).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn is_valid_cnpj(digits: &[u32]) -> bool {
    if digits.len() != CNPJ_LENGTH || all_same(digits) {
        return false;
    }

    cnpj_check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS) == digits[12]
        && cnpj_check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS) == digits[13]
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}
