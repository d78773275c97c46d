use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Letter grades offered in report entry forms. Stored values are not limited
/// to this list; legacy rosters also carry minus grades and raw percentages.
pub const GRADES: [&str; 9] = ["A+", "A", "B+", "B", "C+", "C", "D+", "D", "F"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// School-assigned number, e.g. "STU001". Distinct from `id`.
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated student payload. Ids and enrollment defaults are assigned by the
/// store on append, never by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub class: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub student_id: String,
    pub subject: String,
    pub grade: String,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub teacher: Option<String>,
    pub comments: Option<String>,
}

/// Account row for the seed admin. Authentication itself lives outside this
/// service; the table only anchors created_by references.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: String,
}

pub fn is_recognized_grade(value: &str) -> bool {
    let value = value.trim();
    if GRADES.contains(&value) {
        return true;
    }
    if is_letter_grade(value) {
        return true;
    }
    value
        .parse::<f64>()
        .map(|n| n.is_finite() && n >= 0.0)
        .unwrap_or(false)
}

// Accepts A..D with an optional +/- suffix, covering minus grades that
// predate the published GRADES list, plus bare F. F never carries a modifier.
fn is_letter_grade(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(letter) = chars.next() else {
        return false;
    };
    match (letter, chars.next(), chars.next()) {
        ('A'..='D' | 'F', None, _) => true,
        ('A'..='D', Some('+') | Some('-'), None) => true,
        _ => false,
    }
}
