// Model exports
pub mod domain;

pub use domain::{Allocation, Couple, MatchRecord, Member, RunOutcome};
