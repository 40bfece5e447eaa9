//! Key/value app preferences.
//!
//! # Invariants
//! - Booleans are stored as `"true"`/`"false"`; other values read as unset.

use super::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub const FALLBACK_DISPLAY_NAME_KEY: &str = "planner.fallbackDisplayName";
pub const COMPACT_CARDS_ENABLED_KEY: &str = "planner.compactCardsEnabled";
pub const SHOW_COURSE_CODES_KEY: &str = "planner.showCourseCodes";
pub const TASKS_STATUS_FILTER_KEY: &str = "planner.tasks.statusFilter";
pub const TASKS_SELECTED_COURSE_ID_KEY: &str = "planner.tasks.selectedCourseID";
pub const TASKS_SORT_OPTION_KEY: &str = "planner.tasks.sortOption";
pub const TASKS_FOCUS_MODE_ENABLED_KEY: &str = "planner.tasks.focusModeEnabled";

pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_string(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;

    fn get_bool(&self, key: &str) -> RepoResult<Option<bool>> {
        Ok(match self.get_string(key)?.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        })
    }

    fn set_bool(&self, key: &str, value: bool) -> RepoResult<()> {
        self.set_string(key, if value { "true" } else { "false" })
    }
}

/// Typed accessors for display preferences with their defaults.
pub struct AppPreferences<S: PreferenceStore> {
    store: S,
}

impl<S: PreferenceStore> AppPreferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Name remembered when no profile exists; trimmed on write.
    pub fn fallback_display_name(&self) -> RepoResult<String> {
        Ok(self
            .store
            .get_string(FALLBACK_DISPLAY_NAME_KEY)?
            .unwrap_or_default())
    }

    pub fn set_fallback_display_name(&self, name: &str) -> RepoResult<()> {
        self.store.set_string(FALLBACK_DISPLAY_NAME_KEY, name.trim())
    }

    pub fn compact_cards_enabled(&self) -> RepoResult<bool> {
        Ok(self
            .store
            .get_bool(COMPACT_CARDS_ENABLED_KEY)?
            .unwrap_or(false))
    }

    pub fn set_compact_cards_enabled(&self, enabled: bool) -> RepoResult<()> {
        self.store.set_bool(COMPACT_CARDS_ENABLED_KEY, enabled)
    }

    /// Defaults to `true` when never set.
    pub fn show_course_codes(&self) -> RepoResult<bool> {
        Ok(self.store.get_bool(SHOW_COURSE_CODES_KEY)?.unwrap_or(true))
    }

    pub fn set_show_course_codes(&self, show: bool) -> RepoResult<()> {
        self.store.set_bool(SHOW_COURSE_CODES_KEY, show)
    }
}

pub struct SqlitePreferenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceStore for SqlitePreferenceStore<'_> {
    fn get_string(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_string(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppPreferences, PreferenceStore, SqlitePreferenceStore, SHOW_COURSE_CODES_KEY};
    use crate::db::open_db_in_memory;

    #[test]
    fn show_course_codes_defaults_to_true() {
        let conn = open_db_in_memory().unwrap();
        let prefs = AppPreferences::new(SqlitePreferenceStore::new(&conn));

        assert!(prefs.show_course_codes().unwrap());
        assert!(!prefs.compact_cards_enabled().unwrap());

        prefs.set_show_course_codes(false).unwrap();
        assert!(!prefs.show_course_codes().unwrap());
    }

    #[test]
    fn fallback_name_is_trimmed_and_overwritten() {
        let conn = open_db_in_memory().unwrap();
        let prefs = AppPreferences::new(SqlitePreferenceStore::new(&conn));

        assert_eq!(prefs.fallback_display_name().unwrap(), "");
        prefs.set_fallback_display_name("  Ada ").unwrap();
        prefs.set_fallback_display_name(" Grace").unwrap();
        assert_eq!(prefs.fallback_display_name().unwrap(), "Grace");
    }

    #[test]
    fn malformed_bool_reads_as_unset() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePreferenceStore::new(&conn);
        store.set_string(SHOW_COURSE_CODES_KEY, "yes").unwrap();
        assert_eq!(store.get_bool(SHOW_COURSE_CODES_KEY).unwrap(), None);

        store.remove(SHOW_COURSE_CODES_KEY).unwrap();
        assert_eq!(store.get_string(SHOW_COURSE_CODES_KEY).unwrap(), None);
    }
}
