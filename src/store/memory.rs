use std::sync::Mutex;

use anyhow::Result;

use crate::models::{NewReport, NewStudent, Report, Student};

use super::{locked, materialize_report, materialize_student, Store};

/// Plain in-process tables. Serves the test suites and any deployment that
/// does not need rows to outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    students: Mutex<Vec<Student>>,
    reports: Mutex<Vec<Report>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn append_student(&self, new: NewStudent) -> Result<Student> {
        let student = materialize_student(new);
        locked(&self.students)?.push(student.clone());
        Ok(student)
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        Ok(locked(&self.students)?.clone())
    }

    fn find_student(&self, id: &str) -> Result<Option<Student>> {
        Ok(locked(&self.students)?
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    fn append_report(&self, new: NewReport) -> Result<Report> {
        let report = materialize_report(new);
        locked(&self.reports)?.push(report.clone());
        Ok(report)
    }

    fn list_reports(&self) -> Result<Vec<Report>> {
        Ok(locked(&self.reports)?.clone())
    }

    fn find_report(&self, id: &str) -> Result<Option<Report>> {
        Ok(locked(&self.reports)?.iter().find(|r| r.id == id).cloned())
    }
}
