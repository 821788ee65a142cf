//! Per-attribute validators.
//!
//! Every validator answers a plain yes/no; the schema turns a "no" into an
//! [`Error::InvalidValue`](crate::Error::InvalidValue) carrying the message.

use std::ops::RangeInclusive;
use std::sync::OnceLock;
use regex_lite::Regex;
use crate::model::Value;

/// Accepted ages, inclusive on both ends.
pub const AGE_RANGE: RangeInclusive<i64> = 6..=123;

/// Weights applied to the first 17 digits of an id card number.
pub const ID_CARD_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];

/// Check characters indexed by the weighted sum modulo 11.
pub const ID_CARD_CHECK_CODES: &[u8; 11] = b"10X98765432";

pub const COURSE_TITLE_MAX_CHARS: usize = 64;

static CJK_NAME: OnceLock<Regex> = OnceLock::new();
static LATIN_NAME: OnceLock<Regex> = OnceLock::new();
static ID_CARD: OnceLock<Regex> = OnceLock::new();
static PHONE_NUMBER: OnceLock<Regex> = OnceLock::new();
static STUDENT_NUMBER: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, src: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(src).expect("built-in pattern must compile"))
}

/// 2 to 4 CJK ideographs, or capitalized Latin words joined by a space or hyphen.
pub fn is_name_valid(name: &str) -> bool {
    pattern(&CJK_NAME, r"^[\x{4e00}-\x{9fa5}]{2,4}$").is_match(name)
        || pattern(&LATIN_NAME, r"^[A-Z][a-z]+(?:[-\s][A-Z][a-z]+)*$").is_match(name)
}

/// 18 characters: 17 digits followed by a digit or `X`, matching the weighted checksum.
pub fn is_id_card_valid(id_card: &str) -> bool {
    if !pattern(&ID_CARD, r"^[0-9]{17}[0-9Xx]$").is_match(id_card) {
        return false;
    }
    let bytes = id_card.as_bytes();
    let sum: u32 = bytes[..17]
        .iter()
        .zip(ID_CARD_WEIGHTS.iter())
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();
    ID_CARD_CHECK_CODES[(sum % 11) as usize] == bytes[17].to_ascii_uppercase()
}

/// Exactly 11 digits, the first one being `1`.
pub fn is_phone_number_valid(phone_number: &str) -> bool {
    pattern(&PHONE_NUMBER, r"^1[0-9]{10}$").is_match(phone_number)
}

/// Exactly 10 digits, e.g. `2024010001`.
pub fn is_student_number_valid(student_number: &str) -> bool {
    pattern(&STUDENT_NUMBER, r"^[0-9]{10}$").is_match(student_number)
}

pub fn name(value: &Value) -> bool {
    value.as_text().is_some_and(is_name_valid)
}

pub fn gender(value: &Value) -> bool {
    value.as_gender().is_some()
}

pub fn age(value: &Value) -> bool {
    value.as_integer().is_some_and(|n| AGE_RANGE.contains(&n))
}

pub fn student_number(value: &Value) -> bool {
    value.as_text().is_some_and(is_student_number_valid)
}

pub fn id_card(value: &Value) -> bool {
    value.as_text().is_some_and(is_id_card_valid)
}

pub fn phone_number(value: &Value) -> bool {
    value.as_text().is_some_and(is_phone_number_valid)
}

// Free text.
pub fn address(_value: &Value) -> bool {
    true
}

pub fn course_title(value: &Value) -> bool {
    value
        .as_text()
        .is_some_and(|s| !s.trim().is_empty() && s.chars().count() <= COURSE_TITLE_MAX_CHARS)
}
