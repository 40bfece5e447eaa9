//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks` table.
//! - Materialize task collections for triage and list views.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Lists are ordered by `due_at ASC, uuid ASC`.
//! - Deletes are hard deletes and idempotent.

use super::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use crate::model::course::CourseId;
use crate::model::task::{Priority, Task, TaskId, TaskStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    notes,
    due_at,
    estimated_minutes,
    priority,
    status,
    course_id,
    created_at,
    completed_at
FROM tasks";

/// Status filter applied at query level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatusScope {
    #[default]
    All,
    Active,
    Completed,
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub scope: TaskStatusScope,
    pub course_id: Option<CourseId>,
    /// Exclusive upper bound on `due_at`.
    pub due_before: Option<i64>,
    pub limit: Option<u32>,
}

impl TaskListQuery {
    pub fn active() -> Self {
        Self {
            scope: TaskStatusScope::Active,
            ..Self::default()
        }
    }
}

pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn count_tasks(&self) -> RepoResult<u64>;
    /// Returns `false` when no row matched.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    /// Deletes every completed task and returns the removed IDs.
    fn delete_completed(&self) -> RepoResult<Vec<TaskId>>;
    fn delete_all_tasks(&self) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                notes,
                due_at,
                estimated_minutes,
                priority,
                status,
                course_id,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                task.uuid.to_string(),
                task.title.as_str(),
                task.notes.as_str(),
                task.due_at,
                task.estimated_minutes,
                task.priority.rank(),
                task.status.as_str(),
                task.course_id.map(|id| id.to_string()),
                task.created_at,
                task.completed_at,
            ],
        )?;

        Ok(task.uuid)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                notes = ?2,
                due_at = ?3,
                estimated_minutes = ?4,
                priority = ?5,
                status = ?6,
                course_id = ?7,
                completed_at = ?8
             WHERE uuid = ?9;",
            params![
                task.title.as_str(),
                task.notes.as_str(),
                task.due_at,
                task.estimated_minutes,
                task.priority.rank(),
                task.status.as_str(),
                task.course_id.map(|id| id.to_string()),
                task.completed_at,
                task.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.scope {
            TaskStatusScope::All => {}
            TaskStatusScope::Active => sql.push_str(" AND status != 'completed'"),
            TaskStatusScope::Completed => sql.push_str(" AND status = 'completed'"),
        }

        if let Some(course_id) = query.course_id {
            sql.push_str(" AND course_id = ?");
            bind_values.push(Value::Text(course_id.to_string()));
        }

        if let Some(due_before) = query.due_before {
            sql.push_str(" AND due_at < ?");
            bind_values.push(Value::Integer(due_before));
        }

        sql.push_str(" ORDER BY due_at ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn count_tasks(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn delete_completed(&self) -> RepoResult<Vec<TaskId>> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM tasks WHERE status = 'completed' RETURNING uuid;")?;
        let mut rows = stmt.query([])?;
        let mut removed = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            removed.push(parse_uuid(&raw, "tasks.uuid")?);
        }
        Ok(removed)
    }

    fn delete_all_tasks(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM tasks;", [])?)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "tasks.uuid")?;

    let priority_rank: i64 = row.get("priority")?;
    let priority = Priority::from_rank(priority_rank).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_rank}` in tasks.priority"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let task = Task {
        uuid,
        title: row.get("title")?,
        notes: row.get("notes")?,
        due_at: row.get("due_at")?,
        estimated_minutes: row.get("estimated_minutes")?,
        priority,
        status,
        course_id: parse_optional_uuid(row.get("course_id")?, "tasks.course_id")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    };
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("tasks row {uuid}: {err}"))
    })?;
    Ok(task)
}
