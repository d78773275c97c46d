use crate::models::{Report, Student};

/// Case-insensitive substring match over the fields a roster search box
/// covers: names, email, and the school-assigned student number. A blank
/// query matches everything.
pub fn student_matches(student: &Student, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    contains(&student.first_name, &query)
        || contains(&student.last_name, &query)
        || contains(&student.email, &query)
        || contains(&student.student_id, &query)
}

/// Same contract for reports: subject and teacher are searchable.
pub fn report_matches(report: &Report, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    contains(&report.subject, &query)
        || report
            .teacher
            .as_deref()
            .map_or(false, |teacher| contains(teacher, &query))
}

fn contains(haystack: &str, lowered_query: &str) -> bool {
    haystack.to_lowercase().contains(lowered_query)
}
