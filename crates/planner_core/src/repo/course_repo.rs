//! Course and academic-term repository.
//!
//! # Invariants
//! - Deleting a course nulls `tasks.course_id`; deleting a term nulls
//!   `courses.term_id` (foreign keys with `ON DELETE SET NULL`).
//! - Courses list by `name COLLATE NOCASE, uuid`; terms by `start_date, uuid`.

use super::{bool_to_int, int_to_bool, parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use crate::model::course::{Course, CourseId, WeekdayMask};
use crate::model::profile::StudentLevel;
use crate::model::term::{AcademicTerm, TermId};
use rusqlite::{params, Connection, Row};

const COURSE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    code,
    color_hex,
    student_level,
    meeting_days,
    start_minute,
    end_minute,
    location,
    term_id
FROM courses";

const TERM_SELECT_SQL: &str = "SELECT uuid, name, start_date, end_date, is_active FROM academic_terms";

pub trait CourseRepository {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId>;
    fn update_course(&self, course: &Course) -> RepoResult<()>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    fn delete_course(&self, id: CourseId) -> RepoResult<bool>;

    fn create_term(&self, term: &AcademicTerm) -> RepoResult<TermId>;
    fn update_term(&self, term: &AcademicTerm) -> RepoResult<()>;
    fn list_terms(&self) -> RepoResult<Vec<AcademicTerm>>;
    /// First active term by start date.
    fn active_term(&self) -> RepoResult<Option<AcademicTerm>>;
    fn delete_term(&self, id: TermId) -> RepoResult<bool>;

    /// Removes every course and term.
    fn delete_all_courses_and_terms(&self) -> RepoResult<()>;
}

pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId> {
        course.validate()?;
        self.conn.execute(
            "INSERT INTO courses (
                uuid,
                name,
                code,
                color_hex,
                student_level,
                meeting_days,
                start_minute,
                end_minute,
                location,
                term_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                course.uuid.to_string(),
                course.name.as_str(),
                course.code.as_str(),
                course.color_hex.as_str(),
                course.student_level.as_str(),
                course.meeting_days.bits(),
                course.start_minute,
                course.end_minute,
                course.location.as_str(),
                course.term_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(course.uuid)
    }

    fn update_course(&self, course: &Course) -> RepoResult<()> {
        course.validate()?;
        let changed = self.conn.execute(
            "UPDATE courses
             SET
                name = ?1,
                code = ?2,
                color_hex = ?3,
                student_level = ?4,
                meeting_days = ?5,
                start_minute = ?6,
                end_minute = ?7,
                location = ?8,
                term_id = ?9
             WHERE uuid = ?10;",
            params![
                course.name.as_str(),
                course.code.as_str(),
                course.color_hex.as_str(),
                course.student_level.as_str(),
                course.meeting_days.bits(),
                course.start_minute,
                course.end_minute,
                course.location.as_str(),
                course.term_id.map(|id| id.to_string()),
                course.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(course.uuid));
        }
        Ok(())
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }
        Ok(None)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn create_term(&self, term: &AcademicTerm) -> RepoResult<TermId> {
        term.validate()?;
        self.conn.execute(
            "INSERT INTO academic_terms (uuid, name, start_date, end_date, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                term.uuid.to_string(),
                term.name.as_str(),
                term.start_date,
                term.end_date,
                bool_to_int(term.is_active),
            ],
        )?;
        Ok(term.uuid)
    }

    fn update_term(&self, term: &AcademicTerm) -> RepoResult<()> {
        term.validate()?;
        let changed = self.conn.execute(
            "UPDATE academic_terms
             SET name = ?1, start_date = ?2, end_date = ?3, is_active = ?4
             WHERE uuid = ?5;",
            params![
                term.name.as_str(),
                term.start_date,
                term.end_date,
                bool_to_int(term.is_active),
                term.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(term.uuid));
        }
        Ok(())
    }

    fn list_terms(&self) -> RepoResult<Vec<AcademicTerm>> {
        self.query_terms(&format!(
            "{TERM_SELECT_SQL} ORDER BY start_date ASC, uuid ASC;"
        ))
    }

    fn active_term(&self) -> RepoResult<Option<AcademicTerm>> {
        let terms = self.query_terms(&format!(
            "{TERM_SELECT_SQL} WHERE is_active = 1 ORDER BY start_date ASC, uuid ASC LIMIT 1;"
        ))?;
        Ok(terms.into_iter().next())
    }

    fn delete_term(&self, id: TermId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM academic_terms WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete_all_courses_and_terms(&self) -> RepoResult<()> {
        self.conn
            .execute_batch("DELETE FROM courses; DELETE FROM academic_terms;")?;
        Ok(())
    }
}

impl SqliteCourseRepository<'_> {
    fn query_terms(&self, sql: &str) -> RepoResult<Vec<AcademicTerm>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let uuid_text: String = row.get("uuid")?;
    let level_text: String = row.get("student_level")?;
    let student_level = StudentLevel::parse(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid student level `{level_text}` in courses.student_level"
        ))
    })?;

    let course = Course {
        uuid: parse_uuid(&uuid_text, "courses.uuid")?,
        name: row.get("name")?,
        code: row.get("code")?,
        color_hex: row.get("color_hex")?,
        student_level,
        meeting_days: WeekdayMask::from_bits(row.get("meeting_days")?),
        start_minute: row.get("start_minute")?,
        end_minute: row.get("end_minute")?,
        location: row.get("location")?,
        term_id: parse_optional_uuid(row.get("term_id")?, "courses.term_id")?,
    };
    course.validate().map_err(|err| {
        RepoError::InvalidData(format!("courses row {}: {err}", course.uuid))
    })?;
    Ok(course)
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<AcademicTerm> {
    let uuid_text: String = row.get("uuid")?;
    let term = AcademicTerm {
        uuid: parse_uuid(&uuid_text, "academic_terms.uuid")?,
        name: row.get("name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_active: int_to_bool(row.get("is_active")?, "academic_terms.is_active")?,
    };
    term.validate().map_err(|err| {
        RepoError::InvalidData(format!("academic_terms row {}: {err}", term.uuid))
    })?;
    Ok(term)
}
