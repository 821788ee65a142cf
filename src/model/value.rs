use std::fmt;

/// The two-valued gender enumeration, stored as 0 (female) or 1 (male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Gender::Female),
            1 => Some(Gender::Male),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    /// Accepts `0`/`1`, `female`/`male` and `f`/`m`, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "f" | "female" => Some(Gender::Female),
            "1" | "m" | "male" => Some(Gender::Male),
            _ => None,
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Gender(Gender),
}

impl Value {
    /// True for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_gender(&self) -> Option<Gender> {
        match self {
            Value::Gender(g) => Some(*g),
            Value::Integer(n) => Gender::from_code(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Gender(g) => write!(f, "{}", g.code()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

/// Identifiers above `i64::MAX` keep their digits as text rather than wrapping.
impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(n.to_string()))
    }
}

impl From<Gender> for Value {
    fn from(g: Gender) -> Self {
        Value::Gender(g)
    }
}
