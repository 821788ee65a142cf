use std::fmt;
use std::sync::OnceLock;
use crate::model::{validators, Attribute, Record, Schema, Value};
use crate::{Entity, IdAllocator, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    record: Record,
}

impl Course {
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

    pub fn name(&self) -> &str {
        self.record.text("name")
    }

    pub fn teacher(&self) -> &str {
        self.record.text("teacher")
    }
}

impl Entity for Course {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new("Course", "course")
                .required(Attribute::text("name", "Course Name", validators::course_title))
                .required(Attribute::text("teacher", "Teacher", validators::name))
        })
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {} -- {}", self.id(), self.name(), self.teacher())
    }
}
