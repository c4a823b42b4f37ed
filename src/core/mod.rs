// Core algorithm exports
pub mod allocator;
pub mod calendar;
pub mod queue;
pub mod resolver;

pub use allocator::{create_matches, players_today};
pub use calendar::{is_non_working_day, is_period_reset, working_days_remaining};
pub use queue::{build_queue, unmatched_members};
pub use resolver::resolve_leftover;
