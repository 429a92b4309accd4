//! Field validation rules.
//!
//! A rule maps a raw input string to an error message; the empty string
//! means the value is acceptable.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::schema::Schema;

pub const EMAIL_REQUIRED: &str = "El correo electrónico es obligatorio.";
pub const EMAIL_INVALID: &str = "El correo no tiene un formato válido.";
pub const PASSWORD_REQUIRED: &str = "La contraseña es obligatoria.";
pub const PASSWORD_TOO_SHORT: &str = "La contraseña debe tener al menos 8 caracteres.";
pub const PHONE_INVALID: &str = "El teléfono debe tener exactamente 10 dígitos.";

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PHONE_DIGITS: usize = 10;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$").expect("email pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty after trimming.
    Text { missing: &'static str },
    /// Numeric, finite and strictly positive. `integer` also rejects fractions
    /// and anything past `u32::MAX`, the width of whole-number columns.
    Positive { integer: bool, message: &'static str },
    /// One of a fixed set of labels, compared exactly.
    Choice { options: &'static [&'static str], message: &'static str },
    /// A reference picked from a list (any non-empty value).
    Selection { missing: &'static str },
    /// A `YYYY-MM-DD` calendar date.
    Date { missing: &'static str, invalid: &'static str },
    Email,
    Password,
    Phone,
}

impl Rule {
    pub fn check(&self, raw: &str) -> String {
        let error = match *self {
            Rule::Text { missing } | Rule::Selection { missing } => {
                if raw.trim().is_empty() { missing } else { "" }
            }
            Rule::Positive { integer, message } => {
                if positive(raw, integer) { "" } else { message }
            }
            Rule::Choice { options, message } => {
                if options.contains(&raw) { "" } else { message }
            }
            Rule::Date { missing, invalid } => {
                let raw = raw.trim();
                if raw.is_empty() {
                    missing
                } else if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
                    invalid
                } else {
                    ""
                }
            }
            Rule::Email => {
                let raw = raw.trim();
                if raw.is_empty() {
                    EMAIL_REQUIRED
                } else if !EMAIL.is_match(raw) {
                    EMAIL_INVALID
                } else {
                    ""
                }
            }
            Rule::Password => {
                if raw.trim().is_empty() {
                    PASSWORD_REQUIRED
                } else if raw.chars().count() < PASSWORD_MIN_CHARS {
                    PASSWORD_TOO_SHORT
                } else {
                    ""
                }
            }
            Rule::Phone => {
                if raw.len() == PHONE_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()) {
                    ""
                } else {
                    PHONE_INVALID
                }
            }
        };
        error.to_string()
    }
}

fn positive(raw: &str, integer: bool) -> bool {
    match raw.trim().parse::<f64>() {
        Ok(n) => {
            n.is_finite()
                && n > 0.0
                && (!integer || (n.fract() == 0.0 && n <= u32::MAX as f64))
        }
        Err(_) => false,
    }
}

/// Validate one field of `schema`. Fields the schema does not know pass.
pub fn validate(schema: &Schema, field: &str, raw: &str) -> String {
    schema
        .field(field)
        .map(|spec| spec.rule.check(raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BREED, DOG, LOGIN, REGISTER};

    #[test]
    fn weight_must_be_a_positive_number() {
        assert!(!validate(&DOG, "peso", "-1").is_empty());
        assert!(!validate(&DOG, "peso", "abc").is_empty());
        assert!(!validate(&DOG, "peso", "").is_empty());
        assert!(!validate(&DOG, "peso", "0").is_empty());
        assert!(!validate(&DOG, "peso", "NaN").is_empty());
        assert!(!validate(&DOG, "peso", "inf").is_empty());
        assert_eq!(validate(&DOG, "peso", "12.5"), "");
        assert_eq!(validate(&DOG, "peso", "-1"), "El peso debe ser un número positivo.");
    }

    #[test]
    fn age_must_be_a_whole_number() {
        assert_eq!(validate(&DOG, "edad", "3"), "");
        assert_eq!(
            validate(&DOG, "edad", "2.5"),
            "La edad debe ser un número entero positivo."
        );
        assert!(!validate(&DOG, "edad", "-2").is_empty());
        assert_eq!(validate(&DOG, "edad", "4294967295"), "");
        assert!(!validate(&DOG, "edad", "4294967296").is_empty());
        assert!(!validate(&DOG, "edad", "1e12").is_empty());
    }

    #[test]
    fn phone_needs_exactly_ten_digits() {
        assert_eq!(validate(&REGISTER, "telefono", "12345"), PHONE_INVALID);
        assert_eq!(validate(&REGISTER, "telefono", "55123456789"), PHONE_INVALID);
        assert_eq!(validate(&REGISTER, "telefono", "55-1234567"), PHONE_INVALID);
        assert_eq!(validate(&REGISTER, "telefono", "5512345678"), "");
    }

    #[test]
    fn email_rules() {
        assert_eq!(validate(&LOGIN, "email", "  "), EMAIL_REQUIRED);
        assert_eq!(validate(&LOGIN, "email", "foo@bar"), EMAIL_INVALID);
        assert!(validate(&LOGIN, "email", "foo@bar").contains("no tiene un formato válido"));
        assert_eq!(validate(&LOGIN, "email", "ana.ruiz@dpav.mx"), "");
        assert_eq!(validate(&REGISTER, "email", " ana@dpav.com "), "");
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate(&LOGIN, "password", ""), PASSWORD_REQUIRED);
        assert_eq!(validate(&LOGIN, "password", "corta"), PASSWORD_TOO_SHORT);
        assert_eq!(validate(&LOGIN, "password", "contraseña"), "");
    }

    #[test]
    fn choices_are_exact() {
        assert_eq!(validate(&DOG, "sexo", "Macho"), "");
        assert_eq!(validate(&DOG, "sexo", "macho"), "El sexo es obligatorio.");
        assert_eq!(validate(&DOG, "tamaño", "Pequeño"), "");
        assert_eq!(validate(&DOG, "tamaño", "Enorme"), "El tamaño es obligatorio.");
        assert_eq!(validate(&DOG, "esterilizado", "Si"), "");
        assert_eq!(
            validate(&DOG, "esterilizado", ""),
            "El estado de esterilización es obligatorio."
        );
    }

    #[test]
    fn text_selection_and_date() {
        assert_eq!(validate(&DOG, "nombre", "   "), "El nombre es obligatorio.");
        assert_eq!(validate(&DOG, "color", ""), "El color es obligatorio.");
        assert_eq!(validate(&DOG, "id_raza", ""), "La raza es obligatoria.");
        assert_eq!(validate(&DOG, "id_raza", "3"), "");
        assert_eq!(
            validate(&DOG, "fecha_nacimiento", ""),
            "La fecha de nacimiento es obligatoria."
        );
        assert_eq!(
            validate(&DOG, "fecha_nacimiento", "2023-02-30"),
            "La fecha de nacimiento no es válida."
        );
        assert_eq!(validate(&DOG, "fecha_nacimiento", "2023-02-28"), "");
        assert_eq!(validate(&BREED, "nombre", "Labrador"), "");
        assert_eq!(
            validate(&REGISTER, "apellido_paterno", ""),
            "El apellido paterno es obligatorio."
        );
    }

    #[test]
    fn unknown_fields_pass() {
        assert_eq!(validate(&BREED, "color", ""), "");
        assert_eq!(validate(&LOGIN, "telefono", "x"), "");
    }
}
