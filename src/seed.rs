use anyhow::{Context, Result};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::models::{NewReport, NewStudent, NewUser};
use crate::store::SqliteStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub admin_created: bool,
    pub students: usize,
    pub reports: usize,
}

/// Loads the admin account plus a small roster with reports. Runs at most
/// once per database: an existing admin user means a previous run finished,
/// so the whole load is skipped.
pub fn run(store: &SqliteStore) -> Result<SeedSummary> {
    if store.find_user_by_email(ADMIN_EMAIL)?.is_some() {
        return Ok(SeedSummary {
            admin_created: false,
            students: 0,
            reports: 0,
        });
    }

    let admin = store.insert_user(NewUser {
        email: ADMIN_EMAIL.into(),
        name: Some("Admin User".into()),
        password_hash: hash_password(ADMIN_PASSWORD),
        role: "ADMIN".into(),
    })?;

    let students = [
        (
            "John",
            "Doe",
            "john.doe@school.com",
            "STU001",
            NaiveDate::from_ymd_opt(2008, 5, 15).context("invalid date")?,
            "Grade 10A",
        ),
        (
            "Jane",
            "Smith",
            "jane.smith@school.com",
            "STU002",
            NaiveDate::from_ymd_opt(2007, 8, 22).context("invalid date")?,
            "Grade 11B",
        ),
        (
            "Bob",
            "Johnson",
            "bob.johnson@school.com",
            "STU003",
            NaiveDate::from_ymd_opt(2009, 3, 10).context("invalid date")?,
            "Grade 9A",
        ),
    ];

    let mut roster = Vec::new();
    for (first_name, last_name, email, student_id, date_of_birth, class) in students {
        let created = store.append_student_created_by(
            NewStudent {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                student_id: student_id.into(),
                date_of_birth: Some(date_of_birth),
                enrollment_date: None,
                class: Some(class.into()),
                avatar: None,
            },
            Some(&admin.id),
        )?;
        roster.push(created);
    }

    // The A- below predates the published GRADES list and is kept on purpose;
    // stored grades are not limited to that list.
    let reports = [
        (
            0usize,
            "Mathematics",
            "A",
            "Mr. Johnson",
            "Excellent performance in algebra and geometry. Shows strong problem-solving skills. Keep up the good work!",
        ),
        (
            0,
            "English",
            "B+",
            "Ms. Williams",
            "Good writing skills and creative thinking. Needs improvement in grammar. Practice more grammar exercises.",
        ),
        (
            1,
            "Science",
            "A-",
            "Dr. Smith",
            "Excellent laboratory work and understanding of scientific concepts. Outstanding student!",
        ),
    ];

    for (student_index, subject, grade, teacher, comments) in reports {
        store.append_report_created_by(
            NewReport {
                student_id: roster[student_index].id.clone(),
                subject: subject.into(),
                grade: grade.into(),
                semester: Some("Fall".into()),
                academic_year: Some("2024-2025".into()),
                teacher: Some(teacher.into()),
                comments: Some(comments.into()),
            },
            Some(&admin.id),
        )?;
    }

    info!(students = roster.len(), reports = reports.len(), "seed data inserted");

    Ok(SeedSummary {
        admin_created: true,
        students: roster.len(),
        reports: reports.len(),
    })
}

pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
