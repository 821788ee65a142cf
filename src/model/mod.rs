//! Attribute values, validation and the entity kinds built on them.

pub mod course;
pub mod person;
pub mod record;
pub mod schema;
pub mod student;
pub mod validators;
pub mod value;

pub use course::Course;
pub use person::Person;
pub use record::{Record, ID_KEY};
pub use schema::{AttrKind, Attribute, Schema, Validator};
pub use student::Student;
pub use value::{Gender, Value};
