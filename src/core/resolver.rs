use rand::seq::IndexedRandom;
use rand::Rng;

use crate::models::{Couple, Member};

/// Find a partner for a member who could not be paired normally
///
/// The partner is drawn uniformly from `roster`, never the member itself
/// and never anyone in `exclude` (those already paired today). Returns
/// `None` when nobody is eligible.
pub fn resolve_leftover<R: Rng + ?Sized>(
    leftover: &str,
    roster: &[Member],
    exclude: &[Member],
    rng: &mut R,
) -> Option<Couple> {
    let candidates: Vec<&Member> = roster
        .iter()
        .filter(|member| member.as_str() != leftover)
        .filter(|member| !exclude.contains(member))
        .collect();

    let partner = candidates.choose(rng)?;
    tracing::info!("{} joins {} for a second coffee", leftover, partner);

    Some(Couple::new(leftover, partner.as_str()))
}
