use std::fmt;
use std::sync::OnceLock;
use crate::model::{person, validators, Attribute, Gender, Record, Schema, Value};
use crate::{Entity, IdAllocator, Result};

/// A person enrolled under an institutional student number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    record: Record,
}

impl Student {
    pub fn new<I, K, V>(attrs: I, ids: &dyn IdAllocator) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Ok(Self {
            record: Record::create(Self::schema(), attrs, ids)?,
        })
    }

    pub fn student_number(&self) -> &str {
        self.record.text("student_number")
    }

    pub fn name(&self) -> &str {
        self.record.text("name")
    }

    pub fn gender(&self) -> Option<Gender> {
        self.record.gender("gender")
    }

    pub fn age(&self) -> Option<i64> {
        self.record.integer("age")
    }
}

impl Entity for Student {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::extend(person::schema(), "Student", "student").required(Attribute::text(
                "student_number",
                "Student Number",
                validators::student_number,
            ))
        })
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", self.student_number(), person::summary(&self.record))
    }
}
