//! Task-list filtering and sorting.
//!
//! # Responsibility
//! - Apply status/course/focus/search filters to a task collection.
//! - Sort by the user's chosen option with deterministic tie-breaks.
//! - Persist filter choices between launches through `PreferenceStore`.
//!
//! # Invariants
//! - Search is case-insensitive over title, notes, course name and code.
//! - Focus mode keeps only active tasks due within 48 hours of `now`.
//! - Search text is never persisted.

use crate::model::course::{Course, CourseId};
use crate::model::task::Task;
use crate::repo::preference_store::{
    PreferenceStore, TASKS_FOCUS_MODE_ENABLED_KEY, TASKS_SELECTED_COURSE_ID_KEY,
    TASKS_SORT_OPTION_KEY, TASKS_STATUS_FILTER_KEY,
};
use crate::repo::RepoResult;
use crate::time::MS_PER_HOUR;
use std::cmp::Ordering;
use uuid::Uuid;

pub const FOCUS_WINDOW_MS: i64 = 48 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    DueSoonest,
    DueLatest,
    PriorityHigh,
    RecentlyCreated,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueSoonest => "dueSoonest",
            Self::DueLatest => "dueLatest",
            Self::PriorityHigh => "priorityHigh",
            Self::RecentlyCreated => "recentlyCreated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dueSoonest" => Some(Self::DueSoonest),
            "dueLatest" => Some(Self::DueLatest),
            "priorityHigh" => Some(Self::PriorityHigh),
            "recentlyCreated" => Some(Self::RecentlyCreated),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::DueSoonest => "Due Soonest",
            Self::DueLatest => "Due Latest",
            Self::PriorityHigh => "Priority",
            Self::RecentlyCreated => "Recently Added",
        }
    }

    fn compare(self, lhs: &Task, rhs: &Task) -> Ordering {
        match self {
            Self::DueSoonest => lhs
                .due_at
                .cmp(&rhs.due_at)
                .then_with(|| rhs.priority.cmp(&lhs.priority)),
            Self::DueLatest => rhs
                .due_at
                .cmp(&lhs.due_at)
                .then_with(|| rhs.priority.cmp(&lhs.priority)),
            Self::PriorityHigh => rhs
                .priority
                .cmp(&lhs.priority)
                .then_with(|| lhs.due_at.cmp(&rhs.due_at)),
            Self::RecentlyCreated => rhs
                .created_at
                .cmp(&lhs.created_at)
                .then_with(|| lhs.due_at.cmp(&rhs.due_at)),
        }
    }
}

/// User-selected task-list view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListFilter {
    pub status: StatusFilter,
    pub course_id: Option<CourseId>,
    pub sort: SortOption,
    pub search_text: String,
    pub focus_mode: bool,
}

impl TaskListFilter {
    /// Restores persisted choices; unknown or missing values fall back to defaults.
    pub fn load(store: &impl PreferenceStore) -> RepoResult<Self> {
        let mut filter = Self::default();
        if let Some(status) = store
            .get_string(TASKS_STATUS_FILTER_KEY)?
            .as_deref()
            .and_then(StatusFilter::parse)
        {
            filter.status = status;
        }
        if let Some(sort) = store
            .get_string(TASKS_SORT_OPTION_KEY)?
            .as_deref()
            .and_then(SortOption::parse)
        {
            filter.sort = sort;
        }
        if let Some(focus) = store.get_bool(TASKS_FOCUS_MODE_ENABLED_KEY)? {
            filter.focus_mode = focus;
        }
        filter.course_id = store
            .get_string(TASKS_SELECTED_COURSE_ID_KEY)?
            .and_then(|raw| Uuid::parse_str(&raw).ok());
        Ok(filter)
    }

    pub fn save(&self, store: &impl PreferenceStore) -> RepoResult<()> {
        store.set_string(TASKS_STATUS_FILTER_KEY, self.status.as_str())?;
        store.set_string(TASKS_SORT_OPTION_KEY, self.sort.as_str())?;
        store.set_bool(TASKS_FOCUS_MODE_ENABLED_KEY, self.focus_mode)?;
        match self.course_id {
            Some(course_id) => {
                store.set_string(TASKS_SELECTED_COURSE_ID_KEY, &course_id.to_string())?
            }
            None => store.remove(TASKS_SELECTED_COURSE_ID_KEY)?,
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clears the course filter when its course no longer exists.
    ///
    /// Returns `true` when the filter changed.
    pub fn sync_selected_course(&mut self, courses: &[Course]) -> bool {
        match self.course_id {
            Some(selected) if !courses.iter().any(|course| course.uuid == selected) => {
                self.course_id = None;
                true
            }
            _ => false,
        }
    }

    /// Filters and sorts `tasks`.
    ///
    /// With `include_advanced_filters == false` only search and sort apply.
    pub fn apply(
        &self,
        tasks: Vec<Task>,
        courses: &[Course],
        now_ms: i64,
        include_advanced_filters: bool,
    ) -> Vec<Task> {
        let query = self.search_text.trim().to_lowercase();
        let focus_cutoff = now_ms.saturating_add(FOCUS_WINDOW_MS);

        let mut filtered: Vec<Task> = tasks
            .into_iter()
            .filter(|task| {
                if include_advanced_filters && !self.matches_advanced(task, focus_cutoff) {
                    return false;
                }
                query.is_empty() || search_haystack(task, courses).contains(&query)
            })
            .collect();
        filtered.sort_by(|lhs, rhs| self.sort.compare(lhs, rhs));
        filtered
    }

    fn matches_advanced(&self, task: &Task, focus_cutoff: i64) -> bool {
        if let Some(selected) = self.course_id {
            if task.course_id != Some(selected) {
                return false;
            }
        }
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.is_completed(),
            StatusFilter::Completed => task.is_completed(),
        };
        if !status_ok {
            return false;
        }
        !self.focus_mode || (!task.is_completed() && task.due_at <= focus_cutoff)
    }
}

fn search_haystack(task: &Task, courses: &[Course]) -> String {
    let course = task
        .course_id
        .and_then(|id| courses.iter().find(|course| course.uuid == id));
    [
        task.title.as_str(),
        task.notes.as_str(),
        course.map_or("", |course| course.name.as_str()),
        course.map_or("", |course| course.code.as_str()),
    ]
    .join(" ")
    .to_lowercase()
}
