//! CPF / CNPJ validation.
//!
//! Both identifiers end in two modulus-11 check digits computed over the
//! preceding digits. Input may carry the usual punctuation
//! (`529.982.247-25`, `11.222.333/0001-81`); anything that is not an ASCII
//! digit is ignored before the length and checksum are examined.

use std::fmt;

use thiserror::Error;

const NATURAL_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const NATURAL_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const LEGAL_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const LEGAL_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum IdentifierKind {
    /// CPF, 11 digits.
    Natural,
    /// CNPJ, 14 digits.
    Legal,
}

impl IdentifierKind {
    pub(crate) const fn digit_count(self) -> usize {
        match self {
            Self::Natural => 11,
            Self::Legal => 14,
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Natural => "CPF",
            Self::Legal => "CNPJ",
        }
    }

    fn weights(self) -> (&'static [u32], &'static [u32]) {
        match self {
            Self::Natural => (&NATURAL_FIRST_WEIGHTS, &NATURAL_SECOND_WEIGHTS),
            Self::Legal => (&LEGAL_FIRST_WEIGHTS, &LEGAL_SECOND_WEIGHTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum IdentifierError {
    #[error("Invalid {}: expected {} digits, found {found}", .kind.label(), .kind.digit_count())]
    InvalidFormat { kind: IdentifierKind, found: usize },
    #[error("Invalid {}: check digits do not match", .kind.label())]
    InvalidChecksum { kind: IdentifierKind },
}

impl IdentifierError {
    pub(crate) fn reason(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "format",
            Self::InvalidChecksum { .. } => "checksum",
        }
    }
}

/// A checksum-valid identifier, normalized to its bare digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identifier {
    kind: IdentifierKind,
    digits: String,
}

impl Identifier {
    pub(crate) fn digits(&self) -> &str {
        &self.digits
    }

    pub(crate) fn into_digits(self) -> String {
        self.digits
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.digits;
        match self.kind {
            IdentifierKind::Natural => {
                write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
            }
            IdentifierKind::Legal => {
                write!(f, "{}.{}.{}/{}-{}", &d[0..2], &d[2..5], &d[5..8], &d[8..12], &d[12..14])
            }
        }
    }
}

pub(crate) fn validate_identifier(
    kind: IdentifierKind,
    raw: &str,
) -> Result<Identifier, IdentifierError> {
    let digits = digit_values(raw);
    if digits.len() != kind.digit_count() {
        return Err(IdentifierError::InvalidFormat { kind, found: digits.len() });
    }

    if all_equal(&digits) {
        return Err(IdentifierError::InvalidChecksum { kind });
    }

    let (first_weights, second_weights) = kind.weights();
    let base = first_weights.len();
    let first = check_digit(&digits[..base], first_weights);
    let second = check_digit(&digits[..base + 1], second_weights);

    if digits[base] != first || digits[base + 1] != second {
        return Err(IdentifierError::InvalidChecksum { kind });
    }

    Ok(Identifier { kind, digits: digits.iter().map(|digit| char::from(b'0' + digit)).collect() })
}

pub(crate) fn is_natural_identifier_valid(raw: &str) -> bool {
    validate_identifier(IdentifierKind::Natural, raw).is_ok()
}

pub(crate) fn is_legal_identifier_valid(raw: &str) -> bool {
    validate_identifier(IdentifierKind::Legal, raw).is_ok()
}

fn digit_values(raw: &str) -> Vec<u8> {
    raw.chars().filter_map(|c| c.to_digit(10)).map(|digit| digit as u8).collect()
}

fn all_equal(digits: &[u8]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

fn check_digit(digits: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 = digits.iter().zip(weights).map(|(digit, weight)| u32::from(*digit) * weight).sum();
    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => (11 - remainder) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CPFS: [&str; 3] = ["52998224725", "11144477735", "529.982.247-25"];
    const VALID_CNPJS: [&str; 3] = ["11222333000181", "11.222.333/0001-81", "11444777000161"];

    #[test]
    fn textbook_cpfs_are_valid() {
        for cpf in VALID_CPFS {
            assert!(is_natural_identifier_valid(cpf), "{cpf} should be valid");
        }
    }

    #[test]
    fn wrong_check_digits_are_invalid() {
        assert!(!is_natural_identifier_valid("12345678900"));
        assert_eq!(
            validate_identifier(IdentifierKind::Natural, "12345678900"),
            Err(IdentifierError::InvalidChecksum { kind: IdentifierKind::Natural })
        );
    }

    #[test]
    fn mutating_either_check_digit_invalidates() {
        let cases = [("52998224725", IdentifierKind::Natural), ("11222333000181", IdentifierKind::Legal)];
        for (valid, kind) in cases {
            let len = valid.len();
            for position in [len - 2, len - 1] {
                for replacement in b'0'..=b'9' {
                    let mut bytes = valid.as_bytes().to_vec();
                    if bytes[position] == replacement {
                        continue;
                    }
                    bytes[position] = replacement;
                    let mutated = String::from_utf8(bytes).unwrap();
                    assert!(
                        validate_identifier(kind, &mutated).is_err(),
                        "{mutated} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn exactly_one_check_suffix_fits_each_base() {
        for base in ["123456789", "987654321", "000000001", "529982247", "111444777"] {
            let valid: Vec<String> = (0..100)
                .map(|suffix| format!("{base}{suffix:02}"))
                .filter(|candidate| is_natural_identifier_valid(candidate))
                .collect();
            assert_eq!(valid.len(), 1, "base {base} accepted {valid:?}");
        }
    }

    #[test]
    fn repeated_digit_sequences_are_rejected() {
        for digit in 0..=9 {
            let cpf = digit.to_string().repeat(11);
            let cnpj = digit.to_string().repeat(14);
            assert!(!is_natural_identifier_valid(&cpf), "{cpf}");
            assert!(!is_legal_identifier_valid(&cnpj), "{cnpj}");
        }
    }

    #[test]
    fn length_mismatch_is_a_format_error() {
        assert_eq!(
            validate_identifier(IdentifierKind::Natural, "5299822472"),
            Err(IdentifierError::InvalidFormat { kind: IdentifierKind::Natural, found: 10 })
        );
        assert_eq!(
            validate_identifier(IdentifierKind::Legal, "52998224725"),
            Err(IdentifierError::InvalidFormat { kind: IdentifierKind::Legal, found: 11 })
        );
        assert!(!is_natural_identifier_valid(""));
        assert!(!is_natural_identifier_valid("abc.def.ghi-jk"));
    }

    #[test]
    fn non_ascii_digits_do_not_count() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert!(!is_natural_identifier_valid("٥٢٩٩٨٢٢٤٧٢٥"));
        assert!(is_natural_identifier_valid(" 529 982 247 25 "));
    }

    #[test]
    fn valid_cnpjs_with_and_without_punctuation() {
        for cnpj in VALID_CNPJS {
            assert!(is_legal_identifier_valid(cnpj), "{cnpj} should be valid");
        }
        assert!(!is_legal_identifier_valid("11.222.333/0001-82"));
        assert!(!is_legal_identifier_valid("52998224725"));
    }

    #[test]
    fn validation_is_repeatable() {
        for raw in ["52998224725", "12345678900", "11.222.333/0001-81", "garbage"] {
            let first = (is_natural_identifier_valid(raw), is_legal_identifier_valid(raw));
            for _ in 0..3 {
                assert_eq!((is_natural_identifier_valid(raw), is_legal_identifier_valid(raw)), first);
            }
        }
    }

    #[test]
    fn identifier_is_normalized_and_formattable() {
        let cpf = validate_identifier(IdentifierKind::Natural, "529.982.247-25").expect("cpf");
        assert_eq!(cpf.digits(), "52998224725");
        assert_eq!(cpf.to_string(), "529.982.247-25");

        let cnpj = validate_identifier(IdentifierKind::Legal, "11222333000181").expect("cnpj");
        assert_eq!(cnpj.to_string(), "11.222.333/0001-81");
        assert_eq!(cnpj.into_digits(), "11222333000181");
    }

    #[test]
    fn error_messages_name_the_identifier_and_reason() {
        let format = validate_identifier(IdentifierKind::Legal, "123").unwrap_err();
        assert_eq!(format.to_string(), "Invalid CNPJ: expected 14 digits, found 3");
        assert_eq!(format.reason(), "format");

        let checksum = validate_identifier(IdentifierKind::Natural, "52998224724").unwrap_err();
        assert_eq!(checksum.to_string(), "Invalid CPF: check digits do not match");
        assert_eq!(checksum.reason(), "checksum");
    }
}
