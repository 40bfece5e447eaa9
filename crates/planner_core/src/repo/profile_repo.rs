//! Student profile repository.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::profile::{StudentLevel, StudentProfile};
use rusqlite::{params, Connection, Row};

pub trait ProfileRepository {
    /// Inserts or replaces the profile keyed by its UUID.
    fn save_profile(&self, profile: &StudentProfile) -> RepoResult<()>;
    /// Oldest profile; the app treats it as the single active profile.
    fn primary_profile(&self) -> RepoResult<Option<StudentProfile>>;
    fn delete_all_profiles(&self) -> RepoResult<usize>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn save_profile(&self, profile: &StudentProfile) -> RepoResult<()> {
        profile.validate()?;
        self.conn.execute(
            "INSERT INTO student_profiles (
                uuid,
                display_name,
                student_level,
                default_reminder_lead_hours,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(uuid) DO UPDATE SET
                display_name = excluded.display_name,
                student_level = excluded.student_level,
                default_reminder_lead_hours = excluded.default_reminder_lead_hours;",
            params![
                profile.uuid.to_string(),
                profile.display_name.as_str(),
                profile.student_level.as_str(),
                profile.default_reminder_lead_hours,
                profile.created_at,
            ],
        )?;
        Ok(())
    }

    fn primary_profile(&self) -> RepoResult<Option<StudentProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, display_name, student_level, default_reminder_lead_hours, created_at
             FROM student_profiles
             ORDER BY created_at ASC, uuid ASC
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }
        Ok(None)
    }

    fn delete_all_profiles(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM student_profiles;", [])?)
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<StudentProfile> {
    let uuid_text: String = row.get("uuid")?;
    let level_text: String = row.get("student_level")?;
    let student_level = StudentLevel::parse(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid student level `{level_text}` in student_profiles.student_level"
        ))
    })?;

    let profile = StudentProfile {
        uuid: parse_uuid(&uuid_text, "student_profiles.uuid")?,
        display_name: row.get("display_name")?,
        student_level,
        default_reminder_lead_hours: row.get("default_reminder_lead_hours")?,
        created_at: row.get("created_at")?,
    };
    profile.validate().map_err(|err| {
        RepoError::InvalidData(format!("student_profiles row {}: {err}", profile.uuid))
    })?;
    Ok(profile)
}
