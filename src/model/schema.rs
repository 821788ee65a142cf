use std::fmt;
use crate::model::{Gender, Value};
use crate::{Error, Result};

/// How raw input for an attribute is coerced before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Integer,
    Gender,
}

pub type Validator = fn(&Value) -> bool;

/// A declared attribute: its name, display label, value kind and validator.
#[derive(Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: AttrKind,
    pub validator: Validator,
}

impl Attribute {
    pub const fn new(name: &'static str, label: &'static str, kind: AttrKind, validator: Validator) -> Self {
        Self { name, label, kind, validator }
    }

    pub const fn text(name: &'static str, label: &'static str, validator: Validator) -> Self {
        Self::new(name, label, AttrKind::Text, validator)
    }

    pub const fn integer(name: &'static str, label: &'static str, validator: Validator) -> Self {
        Self::new(name, label, AttrKind::Integer, validator)
    }

    pub const fn gender(name: &'static str, label: &'static str, validator: Validator) -> Self {
        Self::new(name, label, AttrKind::Gender, validator)
    }

    /// Coerces `value` into the shape this attribute stores.
    ///
    /// Values that cannot be coerced are returned unchanged so the validator
    /// rejects them with the operator's original input in the message.
    pub fn normalize(&self, value: Value) -> Value {
        match (self.kind, value) {
            (AttrKind::Text, Value::Integer(n)) => Value::Text(n.to_string()),
            (AttrKind::Integer, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::Text(s),
            },
            (AttrKind::Gender, Value::Text(s)) => match Gender::parse(&s) {
                Some(g) => Value::Gender(g),
                None => Value::Text(s),
            },
            (AttrKind::Gender, Value::Integer(n)) => match Gender::from_code(n) {
                Some(g) => Value::Gender(g),
                None => Value::Integer(n),
            },
            (_, value) => value,
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Declares the required and optional attributes of one entity kind.
///
/// Kinds that build on another kind start from [`Schema::extend`], which
/// copies the base's ordered attribute lists before new ones are appended.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: &'static str,
    counter: &'static str,
    required: Vec<Attribute>,
    optional: Vec<Attribute>,
}

impl Schema {
    /// Creates an empty schema. `counter` names the allocator counter used for new ids.
    pub fn new(kind: &'static str, counter: &'static str) -> Self {
        Self {
            kind,
            counter,
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    pub fn extend(base: &Schema, kind: &'static str, counter: &'static str) -> Self {
        Self {
            kind,
            counter,
            required: base.required.clone(),
            optional: base.optional.clone(),
        }
    }

    pub fn required(mut self, attr: Attribute) -> Self {
        self.required.push(attr);
        self
    }

    pub fn optional(mut self, attr: Attribute) -> Self {
        self.optional.push(attr);
        self
    }

    /// Display name of the kind, e.g. `Student`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn counter(&self) -> &'static str {
        self.counter
    }

    pub fn required_attrs(&self) -> Vec<&'static str> {
        self.required.iter().map(|a| a.name).collect()
    }

    pub fn optional_attrs(&self) -> Vec<&'static str> {
        self.optional.iter().map(|a| a.name).collect()
    }

    /// Required attributes followed by optional ones, in declaration order.
    pub fn all_attrs(&self) -> Vec<&'static str> {
        self.attributes().map(|a| a.name).collect()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.required.iter().chain(self.optional.iter())
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        let name = name.to_lowercase();
        self.attributes().find(|a| a.name == name)
    }

    pub fn is_attr_valid(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn is_attr_required(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.required.iter().any(|a| a.name == name)
    }

    pub fn is_attr_optional(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.optional.iter().any(|a| a.name == name)
    }

    /// Coerces `value` for the attribute `name`; unknown names pass through.
    pub fn normalize(&self, name: &str, value: Value) -> Value {
        match self.attribute(name) {
            Some(attr) => attr.normalize(value),
            None => value,
        }
    }

    /// Turns raw operator input into a value for the attribute `name`.
    pub fn parse(&self, name: &str, raw: &str) -> Value {
        self.normalize(name, Value::Text(raw.to_string()))
    }

    /// Validates a single attribute value.
    ///
    /// When `enforce_known_name` is set an undeclared name is rejected.
    /// Optional attributes given a blank value are accepted without running
    /// their validator.
    pub fn check(&self, name: &str, value: &Value, enforce_known_name: bool) -> Result<()> {
        let name = name.to_lowercase();
        let attr = self.attribute(&name);
        if enforce_known_name && attr.is_none() {
            return Err(Error::InvalidAttribute(name));
        }
        if !self.is_attr_required(&name) && value.is_blank() {
            return Ok(());
        }
        if let Some(attr) = attr {
            if !(attr.validator)(&attr.normalize(value.clone())) {
                return Err(Error::InvalidValue {
                    attr: name,
                    label: attr.label.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::validators;

    fn base() -> Schema {
        Schema::new("Person", "person")
            .required(Attribute::text("name", "Name", validators::name))
            .required(Attribute::integer("age", "Age", validators::age))
            .optional(Attribute::text("address", "Address", validators::address))
            .optional(Attribute::text("phone_number", "Phone Number", validators::phone_number))
    }

    #[test]
    fn test_extend_keeps_base_order() {
        let derived = Schema::extend(&base(), "Student", "student")
            .required(Attribute::text("student_number", "Student Number", validators::student_number));

        assert_eq!(derived.kind(), "Student");
        assert_eq!(derived.counter(), "student");
        assert_eq!(derived.required_attrs(), vec!["name", "age", "student_number"]);
        assert_eq!(derived.optional_attrs(), vec!["address", "phone_number"]);
        assert_eq!(
            derived.all_attrs(),
            vec!["name", "age", "student_number", "address", "phone_number"]
        );
    }

    #[test]
    fn test_membership() {
        let schema = base();
        assert!(schema.is_attr_valid("name"));
        assert!(schema.is_attr_valid("Address"));
        assert!(!schema.is_attr_valid("id"));
        assert!(schema.is_attr_required("age"));
        assert!(!schema.is_attr_required("address"));
        assert!(schema.is_attr_optional("address"));
        assert!(!schema.is_attr_optional("name"));
    }

    #[test]
    fn test_check_unknown_name() {
        let schema = base();
        let err = schema.check("nickname", &Value::from("Jo"), true).unwrap_err();
        assert_eq!(err.to_string(), "nickname is not a valid attribute.");
        assert!(schema.check("nickname", &Value::from("Jo"), false).is_ok());
    }

    #[test]
    fn test_check_skips_blank_optional() {
        let schema = base();
        assert!(schema.check("address", &Value::from(""), true).is_ok());
        assert!(schema.check("phone_number", &Value::from(""), true).is_ok());
        assert!(schema.check("phone_number", &Value::from("12"), true).is_err());
    }

    #[test]
    fn test_check_required_blank_fails() {
        let schema = base();
        let err = schema.check("name", &Value::from(""), true).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref attr, .. } if attr == "name"));
    }

    #[test]
    fn test_check_message() {
        let err = base().check("age", &Value::Integer(200), true).unwrap_err();
        assert_eq!(err.to_string(), "200 is an invalid Age.");
    }

    #[test]
    fn test_parse_coerces_by_kind() {
        let schema = base();
        assert_eq!(schema.parse("age", " 21 "), Value::Integer(21));
        assert_eq!(schema.parse("age", "old"), Value::from("old"));
        assert_eq!(schema.parse("name", "John Smith"), Value::from("John Smith"));
        assert_eq!(schema.parse("unknown", "x"), Value::from("x"));
        assert!(schema.check("age", &schema.parse("age", "21"), true).is_ok());
        assert!(schema.check("age", &Value::from("21"), true).is_ok());
    }

    #[test]
    fn test_gender_normalization() {
        let attr = Attribute::gender("gender", "Gender", validators::gender);
        assert_eq!(attr.normalize(Value::Integer(1)), Value::Gender(Gender::Male));
        assert_eq!(attr.normalize(Value::from("female")), Value::Gender(Gender::Female));
        assert_eq!(attr.normalize(Value::Integer(7)), Value::Integer(7));
    }
}
