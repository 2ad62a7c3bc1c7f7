//! Field-level predicates shared by the step gates.

pub const TAX_ID_LEN: usize = 10;

pub const TAX_ID_FORMAT_MESSAGE: &str = "Tax ID must have exactly 10 digits.";

/// Result of checking a tax id. `Empty` fails the gate like `InvalidFormat`
/// but carries no message, so a pristine field is not flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdCheck {
    Valid,
    Empty,
    InvalidFormat,
}

impl TaxIdCheck {
    pub fn is_valid(self) -> bool {
        self == TaxIdCheck::Valid
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            TaxIdCheck::InvalidFormat => Some(TAX_ID_FORMAT_MESSAGE),
            TaxIdCheck::Valid | TaxIdCheck::Empty => None,
        }
    }
}

pub fn check_tax_id(value: &str) -> TaxIdCheck {
    if value.is_empty() {
        TaxIdCheck::Empty
    } else if value.len() == TAX_ID_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
        TaxIdCheck::Valid
    } else {
        TaxIdCheck::InvalidFormat
    }
}

/// Required-field check: something other than whitespace.
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn has_at_least<T>(items: &[T], min: usize) -> bool {
    items.len() >= min
}
