use std::fmt;
use std::sync::OnceLock;
use crate::model::{validators, Attribute, Gender, Record, Schema, Value};
use crate::{Entity, IdAllocator, Result};

/// Attributes shared by every people-like kind.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("Person", "person")
            .required(Attribute::text("name", "Name", validators::name))
            .required(Attribute::gender("gender", "Gender", validators::gender))
            .required(Attribute::integer("age", "Age", validators::age))
            .optional(Attribute::text("id_card", "Id Card", validators::id_card))
            .optional(Attribute::text("phone_number", "Phone Number", validators::phone_number))
            .optional(Attribute::text("address", "Address", validators::address))
    })
}

/// `"<Name> -- <Gender>"` for any record carrying the person attributes.
pub(crate) fn summary(record: &Record) -> String {
    let gender = record.gender("gender").map(Gender::label).unwrap_or("");
    format!("{} -- {}", record.text("name"), gender)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    record: Record,
}

impl Person {
    pub fn new<I, K, V>(attrs: I, ids: &dyn IdAllocator) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Ok(Self {
            record: Record::create(schema(), attrs, ids)?,
        })
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

impl Entity for Person {
    fn schema() -> &'static Schema {
        schema()
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summary(&self.record))
    }
}
