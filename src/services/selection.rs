use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Draws an ordered item set for a new session: a uniform sample without
/// replacement, clamped to the eligible population. A short draw is a valid
/// outcome; only a zero-sized population fails. The returned order is fixed
/// for the life of the session.
pub fn select_items(eligible: &[Uuid], target: usize) -> Result<Vec<Uuid>> {
    let mut seen = HashSet::new();
    let mut pool: Vec<Uuid> = eligible
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if pool.is_empty() {
        if target == 0 {
            return Ok(Vec::new());
        }
        return Err(Error::InsufficientEligibleItems);
    }

    pool.shuffle(&mut thread_rng());
    pool.truncate(target.min(pool.len()));
    Ok(pool)
}
