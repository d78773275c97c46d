use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::models::{NewReport, NewStudent, Report, Student};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Ordered collection backing students and reports. Implementations assign
/// ids themselves and must return rows from `list_*` in insertion order.
pub trait Store: Send + Sync {
    fn kind(&self) -> &'static str;

    fn append_student(&self, new: NewStudent) -> Result<Student>;
    fn list_students(&self) -> Result<Vec<Student>>;
    fn find_student(&self, id: &str) -> Result<Option<Student>>;

    fn append_report(&self, new: NewReport) -> Result<Report>;
    fn list_reports(&self) -> Result<Vec<Report>>;
    fn find_report(&self, id: &str) -> Result<Option<Report>>;
}

// Identity and timestamp defaults live here so both backends agree on them.
// Callers never supply ids; enrollment falls back to "now".
pub(crate) fn materialize_student(new: NewStudent) -> Student {
    Student {
        id: Uuid::new_v4().to_string(),
        first_name: new.first_name,
        last_name: new.last_name,
        email: new.email,
        student_id: new.student_id,
        date_of_birth: new.date_of_birth,
        enrollment_date: new.enrollment_date.unwrap_or_else(Utc::now),
        class: new.class,
        avatar: new.avatar,
    }
}

pub(crate) fn materialize_report(new: NewReport) -> Report {
    let now = Utc::now();
    Report {
        id: Uuid::new_v4().to_string(),
        student_id: new.student_id,
        subject: new.subject,
        grade: new.grade,
        semester: new.semester,
        academic_year: new.academic_year,
        teacher: new.teacher,
        comments: new.comments,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn locked<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("store lock poisoned"))
}
