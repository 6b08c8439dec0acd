//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate roster/attendance use-cases on top of the model.
//! - Keep front ends decoupled from storage details.

pub mod clock;
pub mod desk;
pub mod reconcile;
pub mod scan;
