use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::{NewReport, NewStudent, NewUser, Report, Student, User};

use super::{locked, materialize_report, materialize_student, Store};

pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("reportbook.sqlite3")
}

/// SQLite-backed store. A single connection behind a mutex is plenty for the
/// request volumes this service sees.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database under `data_dir` and brings
    /// the schema up to date.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;
        let conn = Connection::open(database_path(data_dir))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users(
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS students(
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                student_id TEXT NOT NULL,
                date_of_birth TEXT,
                enrollment_date TEXT NOT NULL,
                class TEXT,
                avatar TEXT,
                created_by_id TEXT,
                FOREIGN KEY(created_by_id) REFERENCES users(id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_students_student_id ON students(student_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reports(
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                grade TEXT NOT NULL,
                semester TEXT,
                academic_year TEXT,
                teacher TEXT,
                comments TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                created_by_id TEXT,
                FOREIGN KEY(student_id) REFERENCES students(id),
                FOREIGN KEY(created_by_id) REFERENCES users(id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_reports_student ON reports(student_id)",
            [],
        )?;

        // Databases created before avatars and account tracking existed are
        // missing these columns. Add them in place.
        ensure_students_avatar(&conn)?;
        ensure_created_by_columns(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Like [`Store::append_student`] but records which account created the
    /// row. The seed path uses this; the HTTP path passes no account.
    pub fn append_student_created_by(
        &self,
        new: NewStudent,
        created_by: Option<&str>,
    ) -> Result<Student> {
        let student = materialize_student(new);
        let dob = student.date_of_birth.map(|d| d.to_string());
        let enrolled = student.enrollment_date.to_rfc3339();
        let conn = locked(&self.conn)?;
        conn.execute(
            "INSERT INTO students(id, first_name, last_name, email, student_id,
                date_of_birth, enrollment_date, class, avatar, created_by_id)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &student.id,
                &student.first_name,
                &student.last_name,
                &student.email,
                &student.student_id,
                &dob,
                &enrolled,
                &student.class,
                &student.avatar,
                &created_by,
            ),
        )?;
        Ok(student)
    }

    pub fn append_report_created_by(
        &self,
        new: NewReport,
        created_by: Option<&str>,
    ) -> Result<Report> {
        let report = materialize_report(new);
        let created = report.created_at.to_rfc3339();
        let updated = report.updated_at.to_rfc3339();
        let conn = locked(&self.conn)?;
        conn.execute(
            "INSERT INTO reports(id, student_id, subject, grade, semester,
                academic_year, teacher, comments, created_at, updated_at, created_by_id)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &report.id,
                &report.student_id,
                &report.subject,
                &report.grade,
                &report.semester,
                &report.academic_year,
                &report.teacher,
                &report.comments,
                &created,
                &updated,
                &created_by,
            ),
        )?;
        Ok(report)
    }

    pub fn insert_user(&self, new: NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        let created = user.created_at.to_rfc3339();
        let conn = locked(&self.conn)?;
        conn.execute(
            "INSERT INTO users(id, email, name, password_hash, role, created_at)
             VALUES(?, ?, ?, ?, ?, ?)",
            (
                &user.id,
                &user.email,
                &user.name,
                &user.password_hash,
                &user.role,
                &created,
            ),
        )?;
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = locked(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT id, email, name, password_hash, role, created_at
                 FROM users WHERE email = ?",
                [email],
                UserRow::read,
            )
            .optional()?;
        row.map(UserRow::into_user).transpose()
    }
}

impl Store for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn append_student(&self, new: NewStudent) -> Result<Student> {
        self.append_student_created_by(new, None)
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        let conn = locked(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, student_id, date_of_birth,
                    enrollment_date, class, avatar
             FROM students ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], StudentRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(StudentRow::into_student).collect()
    }

    fn find_student(&self, id: &str) -> Result<Option<Student>> {
        let conn = locked(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT id, first_name, last_name, email, student_id, date_of_birth,
                        enrollment_date, class, avatar
                 FROM students WHERE id = ?",
                [id],
                StudentRow::read,
            )
            .optional()?;
        row.map(StudentRow::into_student).transpose()
    }

    fn append_report(&self, new: NewReport) -> Result<Report> {
        self.append_report_created_by(new, None)
    }

    fn list_reports(&self) -> Result<Vec<Report>> {
        let conn = locked(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, student_id, subject, grade, semester, academic_year,
                    teacher, comments, created_at, updated_at
             FROM reports ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], ReportRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReportRow::into_report).collect()
    }

    fn find_report(&self, id: &str) -> Result<Option<Report>> {
        let conn = locked(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT id, student_id, subject, grade, semester, academic_year,
                        teacher, comments, created_at, updated_at
                 FROM reports WHERE id = ?",
                [id],
                ReportRow::read,
            )
            .optional()?;
        row.map(ReportRow::into_report).transpose()
    }
}

// Raw column values before date parsing. Keeping the rusqlite closure free of
// chrono lets parse failures surface as normal errors instead of panics.
struct StudentRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    student_id: String,
    date_of_birth: Option<String>,
    enrollment_date: String,
    class: Option<String>,
    avatar: Option<String>,
}

impl StudentRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            student_id: row.get(4)?,
            date_of_birth: row.get(5)?,
            enrollment_date: row.get(6)?,
            class: row.get(7)?,
            avatar: row.get(8)?,
        })
    }

    fn into_student(self) -> Result<Student> {
        Ok(Student {
            date_of_birth: self.date_of_birth.as_deref().map(parse_date).transpose()?,
            enrollment_date: parse_timestamp(&self.enrollment_date)?,
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            student_id: self.student_id,
            class: self.class,
            avatar: self.avatar,
        })
    }
}

struct ReportRow {
    id: String,
    student_id: String,
    subject: String,
    grade: String,
    semester: Option<String>,
    academic_year: Option<String>,
    teacher: Option<String>,
    comments: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ReportRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            student_id: row.get(1)?,
            subject: row.get(2)?,
            grade: row.get(3)?,
            semester: row.get(4)?,
            academic_year: row.get(5)?,
            teacher: row.get(6)?,
            comments: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_report(self) -> Result<Report> {
        Ok(Report {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            student_id: self.student_id,
            subject: self.subject,
            grade: self.grade,
            semester: self.semester,
            academic_year: self.academic_year,
            teacher: self.teacher,
            comments: self.comments,
        })
    }
}

struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    role: String,
    created_at: String,
}

impl UserRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            password_hash: row.get(3)?,
            role: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: self.role,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("invalid stored timestamp {raw:?}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid stored date {raw:?}"))
}

fn ensure_students_avatar(conn: &Connection) -> Result<()> {
    if table_has_column(conn, "students", "avatar")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE students ADD COLUMN avatar TEXT", [])?;
    Ok(())
}

fn ensure_created_by_columns(conn: &Connection) -> Result<()> {
    for table in ["students", "reports"] {
        if table_has_column(conn, table, "created_by_id")? {
            continue;
        }
        let sql = format!("ALTER TABLE {table} ADD COLUMN created_by_id TEXT REFERENCES users(id)");
        conn.execute(&sql, [])?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
