use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::models::{is_recognized_grade, NewReport, NewStudent};

/// One rejected field. `message` reads as a clause so the route layer can
/// join several into a single sentence ("firstName is required; ...").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "is required".into(),
        }
    }

    fn not_a_string(field: &'static str) -> Self {
        Self {
            field,
            message: "must be a string".into(),
        }
    }
}

#[derive(Debug)]
pub enum Validated<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

/// Checks a raw JSON body against the student schema. All violations are
/// collected before returning; the first bad field never masks the rest.
pub fn validate_student(body: &Value) -> Validated<NewStudent> {
    let mut errors = Vec::new();

    let first_name = required_string(body, "firstName", &mut errors);
    let last_name = required_string(body, "lastName", &mut errors);
    let email = required_string(body, "email", &mut errors);
    let student_id = required_string(body, "studentId", &mut errors);
    let date_of_birth = optional_date(body, "dateOfBirth", &mut errors);
    let enrollment_date = optional_timestamp(body, "enrollmentDate", &mut errors);
    let class = optional_string(body, "class", &mut errors);
    let avatar = optional_string(body, "avatar", &mut errors);

    match (first_name, last_name, email, student_id) {
        (Some(first_name), Some(last_name), Some(email), Some(student_id))
            if errors.is_empty() =>
        {
            Validated::Valid(NewStudent {
                first_name,
                last_name,
                email,
                student_id,
                date_of_birth,
                enrollment_date,
                class,
                avatar,
            })
        }
        _ => Validated::Invalid(errors),
    }
}

/// Checks a raw JSON body against the report schema. Whether `studentId`
/// names a real student is the route layer's concern, not this function's.
pub fn validate_report(body: &Value) -> Validated<NewReport> {
    let mut errors = Vec::new();

    let student_id = required_string(body, "studentId", &mut errors);
    let subject = required_string(body, "subject", &mut errors);
    let grade = required_string(body, "grade", &mut errors);
    let semester = optional_string(body, "semester", &mut errors);
    let academic_year = optional_string(body, "academicYear", &mut errors);
    let teacher = optional_string(body, "teacher", &mut errors);
    let comments = optional_string(body, "comments", &mut errors);

    if let Some(grade) = grade.as_deref() {
        if !is_recognized_grade(grade) {
            errors.push(FieldError {
                field: "grade",
                message: "must be a letter grade or a non-negative number".into(),
            });
        }
    }

    match (student_id, subject, grade) {
        (Some(student_id), Some(subject), Some(grade)) if errors.is_empty() => {
            Validated::Valid(NewReport {
                student_id,
                subject,
                grade,
                semester,
                academic_year,
                teacher,
                comments,
            })
        }
        _ => Validated::Invalid(errors),
    }
}

// A required field must be present, a string, and non-blank.
fn required_string(
    body: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            errors.push(FieldError::required(field));
            None
        }
        Some(_) => {
            errors.push(FieldError::not_a_string(field));
            None
        }
    }
}

// Optional fields may be absent, null, or blank; all read as "not provided".
fn optional_string(
    body: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::not_a_string(field));
            None
        }
    }
}

fn optional_date(
    body: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let raw = optional_string(body, field, errors)?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError {
                field,
                message: "must be a date in YYYY-MM-DD form".into(),
            });
            None
        }
    }
}

// Accepts a full RFC 3339 timestamp or a bare date, which reads as midnight UTC.
fn optional_timestamp(
    body: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    let raw = optional_string(body, field, errors)?;
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Some(midnight.and_utc());
        }
    }
    errors.push(FieldError {
        field,
        message: "must be an ISO-8601 timestamp or YYYY-MM-DD date".into(),
    });
    None
}
