//! Flutter bridge surface for the planner core.

pub mod api;
