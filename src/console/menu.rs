use std::io::{self, BufRead, Write};
use log::debug;
use crate::console::{course_header, course_row, student_header, student_row, tagged};
use crate::model::{Value, ID_KEY};
use crate::roster::Roster;
use crate::Result;

const OPTIONS: [(&str, &str); 8] = [
    ("1", "Show all students"),
    ("2", "Add student"),
    ("3", "Delete student"),
    ("4", "Find student"),
    ("5", "Update student"),
    ("6", "Show all courses"),
    ("7", "Add course"),
    ("q", "Quit"),
];

const BOUNDARY_CHAR: char = '-';
const BOUNDARY_LENGTH: usize = 50;

const UPDATE_OPTIONS: [(&str, &str); 6] = [
    ("1", "name"),
    ("2", "age"),
    ("3", "gender"),
    ("4", "else"),
    ("5", "all"),
    ("6", "cancel"),
];

enum Flow {
    Continue,
    Quit,
}

/// An interactive session over any line-oriented input and output.
///
/// End of input is treated as quitting, so the menu can be driven from a
/// pipe or a test buffer as well as a terminal.
pub struct Menu<'a, R, W> {
    roster: &'a mut Roster,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(roster: &'a mut Roster, input: R, output: W) -> Self {
        Self { roster, input, output }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.display_menu()?;
            let option = match self.prompt("Please choose an option: ")? {
                Some(o) => o.to_lowercase(),
                None => "q".to_string(),
            };
            debug!("Menu option {:?}", option);
            if let Flow::Quit = self.dispatch(&option)? {
                writeln!(self.output, "Quitting...")?;
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, option: &str) -> io::Result<Flow> {
        match option {
            "1" => self.show_all_students()?,
            "2" => self.add_student()?,
            "3" => self.delete_student()?,
            "4" => self.get_student()?,
            "5" => self.update_student()?,
            "6" => self.show_all_courses()?,
            "7" => self.add_course()?,
            "q" => return Ok(Flow::Quit),
            _ => writeln!(self.output, "Invalid option, please try again.")?,
        }
        Ok(Flow::Continue)
    }

    fn display_menu(&mut self) -> io::Result<()> {
        for (key, label) in OPTIONS {
            let text = format!("{}. {}", key, label);
            let pad = (BOUNDARY_LENGTH.saturating_sub(text.len()) / 2).saturating_sub(2);
            let placeholder = BOUNDARY_CHAR.to_string().repeat(pad);
            writeln!(self.output, "{} {} {}", placeholder, text, placeholder)?;
        }
        writeln!(self.output, "{}", BOUNDARY_CHAR.to_string().repeat(BOUNDARY_LENGTH))
    }

    /// Writes `text` and reads one trimmed line; `None` at end of input.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so a garbled line is
    /// rejected like any other bad answer instead of ending the session.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Asks until one of `allowed` is entered; `None` at end of input.
    fn choose(&mut self, text: &str, allowed: &[&str]) -> io::Result<Option<String>> {
        let mut answer = self.prompt(text)?;
        loop {
            match answer {
                None => return Ok(None),
                Some(a) if allowed.contains(&a.as_str()) => return Ok(Some(a)),
                Some(_) => answer = self.prompt("Invalid option. Please enter again: ")?,
            }
        }
    }

    fn report(&mut self, action: &str, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", tagged(action, message))
    }

    fn outcome(&mut self, action: &str, result: Result<String>) -> io::Result<()> {
        match result {
            Ok(msg) => self.report(&format!("{} SUCCESS", action), &msg),
            Err(e) => self.report(&format!("{} FAILED", action), &e.to_string()),
        }
    }

    /// Asks for the lookup key (id or name); `None` when cancelled.
    fn choose_key(&mut self, verb: &str) -> io::Result<Option<&'static str>> {
        let text = format!("Which way do you want to {}? (1) by id; (2) by name; (3) cancel: ", verb);
        Ok(match self.choose(&text, &["1", "2", "3"])?.as_deref() {
            Some("1") => Some(ID_KEY),
            Some("2") => Some("name"),
            _ => None,
        })
    }

    /// Resolves a student index by id or name, letting the operator pick
    /// among several students sharing a name.
    fn locate_student(&mut self, action: &str, verb: &str) -> io::Result<Option<usize>> {
        let key = match self.choose_key(verb)? {
            Some(k) => k,
            None => {
                self.report(action, &format!("{} canceled.", capitalize(verb)))?;
                return Ok(None);
            }
        };
        let raw = match self.prompt(&format!("Enter student {}: ", key))? {
            Some(r) => r,
            None => return Ok(None),
        };
        let value = Value::from(raw);

        let found = match self.roster.students.find_all(key, value) {
            Ok(found) => found,
            Err(e) => {
                self.report(&format!("{} FAILED", action), &e.to_string())?;
                return Ok(None);
            }
        };
        if found.len() == 1 {
            return Ok(Some(found[0]));
        }

        writeln!(self.output, "{} students match:", found.len())?;
        writeln!(self.output, "    {}", student_header())?;
        for (n, i) in found.iter().enumerate() {
            if let Ok(student) = self.roster.students.get_by_index(*i) {
                let row = student_row(student);
                writeln!(self.output, "({}) {}", n + 1, row)?;
            }
        }
        let choices: Vec<String> = (1..=found.len()).map(|n| n.to_string()).collect();
        let allowed: Vec<&str> = choices.iter().map(String::as_str).collect();
        match self.choose("Which one? ", &allowed)? {
            Some(n) => Ok(n.parse::<usize>().ok().map(|n| found[n - 1])),
            None => Ok(None),
        }
    }

    fn show_all_students(&mut self) -> io::Result<()> {
        if self.roster.students.is_empty() {
            return self.report("Show Students", "There is no student.");
        }
        writeln!(self.output, "{}", student_header())?;
        for student in &self.roster.students {
            writeln!(self.output, "{}", student_row(student))?;
        }
        Ok(())
    }

    fn add_student(&mut self) -> io::Result<()> {
        writeln!(self.output, "Please enter student information:")?;
        let schema = self.roster.students.schema();
        let mut attrs = Vec::new();
        for attr in schema.attributes() {
            let optional = if schema.is_attr_optional(attr.name) { "(Optional)" } else { "" };
            let raw = match self.prompt(&format!("{}{}: ", attr.label, optional))? {
                Some(r) => r,
                None => return Ok(()),
            };
            let value = schema.parse(attr.name, &raw);
            if let Err(e) = schema.check(attr.name, &value, false) {
                return self.report("ADD STUDENT FAILED", &e.to_string());
            }
            attrs.push((attr.name, value));
        }
        let result = self.roster.add_student(attrs);
        self.outcome("ADD STUDENT", result)
    }

    fn delete_student(&mut self) -> io::Result<()> {
        if let Some(i) = self.locate_student("DELETE", "delete")? {
            let result = self.roster.students.delete_by_index(i, true);
            self.outcome("DELETE", result)?;
        }
        Ok(())
    }

    fn get_student(&mut self) -> io::Result<()> {
        if let Some(i) = self.locate_student("GET", "get")? {
            if let Ok(student) = self.roster.students.get_by_index(i) {
                let row = student_row(student);
                self.report("GET", "Here are the student info:")?;
                writeln!(self.output, "{}", student_header())?;
                writeln!(self.output, "{}", row)?;
            }
        }
        Ok(())
    }

    fn update_student(&mut self) -> io::Result<()> {
        let i = match self.locate_student("UPDATE", "update")? {
            Some(i) => i,
            None => return Ok(()),
        };
        let allowed: Vec<&str> = UPDATE_OPTIONS.iter().map(|(k, _)| *k).collect();
        let option = self.choose(
            "Please enter the property you want to change: (1) name (2) age (3) gender (4) else (5) all (6) cancel: ",
            &allowed,
        )?;
        let choice = UPDATE_OPTIONS
            .iter()
            .find(|(k, _)| Some(*k) == option.as_deref())
            .map(|(_, v)| *v);

        match choice {
            Some("name") | Some("age") | Some("gender") => {
                let attr = choice.unwrap_or_default();
                self.update_one(i, attr, true)?;
            }
            Some("else") => {
                let attr = match self.prompt("Please enter the property you want to change: ")? {
                    Some(a) => a.to_lowercase(),
                    None => return Ok(()),
                };
                self.update_one(i, &attr, true)?;
            }
            Some("all") => {
                let schema = self.roster.students.schema();
                for attr in schema.all_attrs() {
                    self.update_one(i, attr, false)?;
                }
            }
            _ => self.report("UPDATE", "Update canceled.")?,
        }
        Ok(())
    }

    /// Prompts for a new value of `attr` and applies it to the student at `i`.
    ///
    /// In "all" mode (`allow_clear == false`) an empty answer keeps the
    /// current value instead of clearing it.
    fn update_one(&mut self, i: usize, attr: &str, allow_clear: bool) -> io::Result<()> {
        let raw = match self.prompt(&format!("Please enter the new {}: ", attr))? {
            Some(r) => r,
            None => return Ok(()),
        };
        if raw.is_empty() && !allow_clear {
            return Ok(());
        }
        let value = self.roster.students.schema().parse(attr, &raw);
        let result = self.roster.students.update_attr_by_index(i, attr, value, true, true);
        self.outcome("UPDATE", result)
    }

    fn show_all_courses(&mut self) -> io::Result<()> {
        if self.roster.courses.is_empty() {
            return self.report("Show Courses", "There is no course.");
        }
        writeln!(self.output, "{}", course_header())?;
        for course in &self.roster.courses {
            writeln!(self.output, "{}", course_row(course))?;
        }
        Ok(())
    }

    fn add_course(&mut self) -> io::Result<()> {
        writeln!(self.output, "Please enter course information:")?;
        let schema = self.roster.courses.schema();
        let mut attrs = Vec::new();
        for attr in schema.attributes() {
            let raw = match self.prompt(&format!("{}: ", attr.label))? {
                Some(r) => r,
                None => return Ok(()),
            };
            attrs.push((attr.name, schema.parse(attr.name, &raw)));
        }
        let result = self.roster.add_course(attrs);
        self.outcome("ADD COURSE", result)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
