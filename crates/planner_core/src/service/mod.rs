//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and notification details.

pub mod dashboard;
pub mod onboarding;
pub mod settings;
pub mod task_list;
pub mod task_service;
