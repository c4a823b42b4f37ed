use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{MatchRecord, Member};

/// Roster members who have not had a coffee yet this period
///
/// Keeps roster order and drops repeated roster entries, so every member
/// shows up at most once.
pub fn unmatched_members(roster: &[Member], record: &MatchRecord) -> Vec<Member> {
    let mut seen = HashSet::with_capacity(roster.len());
    let mut queue = Vec::with_capacity(roster.len());

    for member in roster {
        if record.contains(member) {
            tracing::debug!("{} already had a coffee", member);
        } else if seen.insert(member.as_str()) {
            tracing::debug!("{} may have a coffee", member);
            queue.push(member.clone());
        }
    }
    queue
}

/// Today's queue: unmatched members in a uniformly random order
pub fn build_queue<R: Rng + ?Sized>(
    roster: &[Member],
    record: &MatchRecord,
    rng: &mut R,
) -> Vec<Member> {
    let mut queue = unmatched_members(roster, record);
    queue.shuffle(rng);

    tracing::info!("number in queue {}", queue.len());
    queue
}
