use std::env;
use std::path::Path;
use std::sync::Arc;
use log::{info, warn};
use crate::engine::{Allocator, SqList};
use crate::model::{Course, Student, Value};
use crate::Result;

/// Environment variable naming the counter file.
pub const DATA_FILE_ENV: &str = "ROSTER_DATA_FILE";

/// Default counter file location, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/counters.json";

/// Picks the counter file: `explicit`, then `ROSTER_DATA_FILE`, then
/// `default_path`. Blank values count as unset.
pub fn resolve_data_file(explicit: Option<String>, default_path: &str) -> String {
    choose_data_file(explicit, env::var(DATA_FILE_ENV).ok(), default_path)
}

fn choose_data_file(explicit: Option<String>, from_env: Option<String>, default_path: &str) -> String {
    match explicit {
        Some(p) if !p.trim().is_empty() => return p,
        Some(_) => warn!("Empty counter file path given, ignoring it"),
        None => {}
    }
    match from_env {
        Some(p) if !p.trim().is_empty() => p,
        Some(_) => {
            warn!("{} is set but empty, using {}", DATA_FILE_ENV, default_path);
            default_path.to_string()
        }
        None => default_path.to_string(),
    }
}

/// One store per entity kind, sharing a single identifier allocator.
pub struct Roster {
    allocator: Arc<Allocator>,
    pub students: SqList<Student>,
    pub courses: SqList<Course>,
}

impl Roster {
    pub fn new(allocator: Arc<Allocator>) -> Self {
        Self {
            allocator,
            students: SqList::new(),
            courses: SqList::new(),
        }
    }

    /// Opens a roster whose identifiers persist in the counter file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let allocator = Allocator::open(path.as_ref())?;
        info!("Using counter file {:?}", path.as_ref());
        Ok(Self::new(Arc::new(allocator)))
    }

    /// A roster whose identifiers restart at 1 on every run.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Allocator::in_memory()))
    }

    /// Opens a roster using the counter file named by `ROSTER_DATA_FILE`,
    /// falling back to `default_path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use roster_store::roster::{Roster, DEFAULT_DATA_FILE};
    ///
    /// let roster = Roster::from_env(DEFAULT_DATA_FILE).unwrap();
    /// assert!(roster.students.is_empty());
    /// ```
    pub fn from_env(default_path: &str) -> Result<Self> {
        Self::open(resolve_data_file(None, default_path))
    }

    pub fn allocator(&self) -> &Arc<Allocator> {
        &self.allocator
    }

    /// Validates `attrs`, allocates a student id and appends the new student.
    pub fn add_student<I, K, V>(&mut self, attrs: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let student = Student::new(attrs, self.allocator.as_ref())?;
        self.students.add(student)
    }

    pub fn add_course<I, K, V>(&mut self, attrs: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let course = Course::new(attrs, self.allocator.as_ref())?;
        self.courses.add(course)
    }
}
