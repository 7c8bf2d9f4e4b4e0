//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/web layers decoupled from storage details.

pub mod recipe_service;
pub mod report;
