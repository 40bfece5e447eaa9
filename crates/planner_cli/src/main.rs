//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `planner_core` linkage with deterministic output.
//! - Print a triage summary for a planner database when given its path.

use planner_core::db::open_db;
use planner_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use planner_core::time::LocalCalendar;
use planner_core::{Clock, DefaultTriageScorer, SystemClock, TriageScorer};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("planner_core ping={}", planner_core::ping());
    println!("planner_core version={}", planner_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_triage(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("triage failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_triage(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let tasks = SqliteTaskRepository::new(&conn).list_tasks(&TaskListQuery::active())?;
    let bucket =
        DefaultTriageScorer.bucketize(tasks, SystemClock.now_ms(), &LocalCalendar::local_zone());
    println!(
        "triage overdue={} today={} upcoming={}",
        bucket.overdue.len(),
        bucket.today.len(),
        bucket.upcoming.len()
    );
    Ok(())
}
