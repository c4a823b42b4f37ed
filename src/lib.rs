//! Coffee Match - pairs channel members for periodic coffee meetings
//!
//! This library provides the scheduling algorithm that spreads one-on-one
//! pairings evenly over a rotating period, and the daily run that
//! announces them through a chat service.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;

// Re-export commonly used types
pub use crate::core::{create_matches, is_non_working_day, is_period_reset, working_days_remaining};
pub use error::CoffeeError;
pub use models::{Allocation, Couple, MatchRecord, Member, RunOutcome};
pub use orchestrator::{Orchestrator, RunError, Schedule};
