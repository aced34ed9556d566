//! Score policy: point deltas, clamping and the end-of-level score.

use std::time::Duration;

pub const COMPLETION_BONUS: i32 = 100;
pub const SWITCH_PENALTY: i32 = -10;
pub const DISCARD_PENALTY: i32 = -10;

/// Seconds of play that cost one point at the win checkpoint.
pub const SECONDS_PER_POINT: u64 = 3;

/// `max(0, score + delta)`.
pub fn apply(score: u32, delta: i32) -> u32 {
    let next = i64::from(score) + i64::from(delta);
    next.clamp(0, i64::from(u32::MAX)) as u32
}

/// Score banked when a level is won: one point off per three whole seconds, never negative.
pub fn final_score(score: u32, time_elapsed: Duration) -> u32 {
    let time_penalty = time_elapsed.as_secs() / SECONDS_PER_POINT;
    u64::from(score).saturating_sub(time_penalty) as u32
}
