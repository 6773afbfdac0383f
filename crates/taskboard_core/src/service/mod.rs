//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure scheduling into use-case APIs.
//! - Keep the request-contract layer decoupled from storage details.

pub mod category_service;
pub mod note_service;
pub mod task_service;
