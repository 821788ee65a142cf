//! The text front end: report lines, tables and the interactive menu.

pub mod menu;

pub use menu::Menu;

use chrono::Local;
use crate::model::{Course, Gender, Student};
use crate::Entity;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats `<timestamp> [<ACTION>] <message>`.
pub fn tagged(action: &str, message: &str) -> String {
    format!(
        "{} [{}] {}",
        Local::now().format(TIMESTAMP_FORMAT),
        action.to_uppercase(),
        message
    )
}

pub fn student_header() -> String {
    format!(
        "{:<6}{:<15}{:<20}{:<10}{:<5}{:<20}{:<20}{:<20}",
        "Id", "Student Number", "Name", "Gender", "Age", "ID Card", "Phone Number", "Address"
    )
}

pub fn student_row(student: &Student) -> String {
    let record = student.record();
    let age = student.age().map(|a| a.to_string()).unwrap_or_default();
    let row = format!(
        "{:<6}{:<15}{:<20}{:<10}{:<5}{:<20}{:<20}{:<20}",
        student.id(),
        student.student_number(),
        student.name(),
        student.gender().map(Gender::label).unwrap_or(""),
        age,
        record.text("id_card"),
        record.text("phone_number"),
        record.text("address"),
    );
    row.trim_end().to_string()
}

pub fn course_header() -> String {
    format!("{:<6}{:<30}{:<20}", "Id", "Course Name", "Teacher")
}

pub fn course_row(course: &Course) -> String {
    format!("{:<6}{:<30}{:<20}", course.id(), course.name(), course.teacher())
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Allocator;

    #[test]
    fn test_tagged_line_shape() {
        let line = tagged("delete success", "Student deleted.");
        let (stamp, rest) = line.split_at(19);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(rest, " [DELETE SUCCESS] Student deleted.");
    }

    #[test]
    fn test_student_row() {
        let ids = Allocator::in_memory();
        let s = Student::new(
            [
                ("student_number", "2024010001"),
                ("name", "John Smith"),
                ("gender", "1"),
                ("age", "20"),
                ("phone_number", "13800138000"),
            ],
            &ids,
        )
        .unwrap();
        let row = student_row(&s);
        assert!(row.starts_with("1     2024010001     John Smith"));
        assert!(row.contains("Male"));
        assert!(row.ends_with("13800138000"));
    }
}
