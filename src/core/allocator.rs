use crate::models::{Allocation, Couple, Member};

/// How many queued members should be paired today
///
/// Spreads the queue evenly over the working days left in the period.
/// Above the one-pair floor the count is made even, rounding up unless
/// that would overshoot the queue, in which case it rounds down.
///
/// # Arguments
/// * `queue_len` - Number of members still waiting this period
/// * `days_remaining` - Working days left, today included (at least 1)
pub fn players_today(queue_len: usize, days_remaining: u32) -> usize {
    debug_assert!(days_remaining > 0, "today must be a working day");
    let days = days_remaining.max(1) as usize;
    let target = queue_len.div_ceil(days);

    if target == 1 {
        return 2.min(queue_len);
    }

    if target % 2 == 0 {
        target
    } else if target + 1 > queue_len {
        target - 1
    } else {
        target + 1
    }
}

/// Pair today's share of the queue
///
/// The first `players_today` members of `queue` are paired off; whatever
/// is left (including an odd player) is returned as the residual queue
/// for the following days.
pub fn create_matches(mut queue: Vec<Member>, days_remaining: u32) -> Allocation {
    let count = players_today(queue.len(), days_remaining);
    tracing::info!("{} matched today", count);

    let residual = queue.split_off(count);
    let mut players = queue;

    let mut matches = Vec::with_capacity(players.len() / 2);
    while players.len() >= 2 {
        if let (Some(first), Some(second)) = (players.pop(), players.pop()) {
            matches.push(Couple::new(first, second));
        }
    }
    // An odd player left in the slice goes back to the queue
    let mut residual_queue = players;
    residual_queue.extend(residual);

    Allocation {
        matches,
        residual: residual_queue,
    }
}
