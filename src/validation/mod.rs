//! Client-side form validators.
//!
//! Every validator is a pure function: no side effects, no hidden state, and
//! invalid input yields `false` rather than an error.

pub mod document;
pub mod email;
pub mod name;
pub mod password;

pub use document::{document_kind, validate_cpf_or_cnpj, DocumentKind};
pub use email::is_valid_email;
pub use name::validate_name;
pub use password::{is_password_format_valid, password_format_details, PasswordFormatDetails};

/// True when any of the given form values is empty.
pub fn any_empty(values: &[&str]) -> bool {
    values.iter().any(|v| v.is_empty())
}
