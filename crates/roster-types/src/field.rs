use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::MAX_HUMAN_AGE;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[a-zA-Z0-9]+$";
const PHONE_PATTERN: &str = r"^\+\d{7,15}$";

/// A field that is prompted for and validated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Username,
    Name,
    Email,
    Phone,
    Age,
}

pub type Validator = fn(&str) -> bool;

// Indexed by `FieldKind as usize`.
const VALIDATORS: [Validator; 5] = [valid_name, valid_name, valid_email, valid_phone, valid_age];

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Username,
        FieldKind::Name,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Age,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Username => "Username",
            FieldKind::Name => "Name",
            FieldKind::Email => "Email",
            FieldKind::Phone => "Phone",
            FieldKind::Age => "Age",
        }
    }

    pub fn validator(self) -> Validator {
        VALIDATORS[self as usize]
    }

    pub fn is_valid(self, input: &str) -> bool {
        (self.validator())(input)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"))
}

/// `local@domain.tld`, no `@` or whitespace on either side of the split.
pub fn valid_email(s: &str) -> bool {
    email_regex().is_match(s)
}

/// `+` followed by 7 to 15 digits.
pub fn valid_phone(s: &str) -> bool {
    phone_regex().is_match(s)
}

pub fn valid_name(s: &str) -> bool {
    !s.trim().is_empty()
}

pub fn valid_age(s: &str) -> bool {
    parse_age(s).is_some()
}

/// Parses an all-digit age in `1..=MAX_HUMAN_AGE`.
pub fn parse_age(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Overflowing digit strings are out of range anyway.
    let age: u32 = s.parse().ok()?;
    (age > 0 && age <= MAX_HUMAN_AGE).then_some(age)
}
