//! Sleep-schedule computation from forger hit times.
//!
//! The node predicts which accounts may produce the next block and
//! when. From that list we derive how long to sleep between height
//! polls, so the observer wakes up just after each candidate's
//! predicted hit instead of polling on a fixed interval.

use std::time::Duration;

use crate::api::types::Forger;

/// The node's relative clock runs ahead of the hit-time predictions
/// by this many seconds in practice.
pub const NODE_CLOCK_DRIFT_SECS: i64 = 20;

/// Fixed buffer added to every sleep so we poll just after the
/// predicted hit, not just before it.
pub const SLEEP_BUFFER: Duration = Duration::from_millis(100);

/// Compute the sleep durations between consecutive forger hit times.
///
/// `node_time` is the node's relative timestamp in seconds,
/// `generators` must be ascending by `hit_time`, and `timeout_secs`
/// caps how far into the future candidates are scheduled (0 disables
/// the cap).
///
/// Example: with `node_time = 46358100` and hit times
/// `[46358130, 46358145, 46358670]` the adjusted time is 46358080 and
/// the schedule is `[50s, 15s, 525s]` (the last entry is dropped when
/// `timeout_secs < 590`).
pub fn sleep_schedule(node_time: i64, generators: &[Forger], timeout_secs: u64) -> Vec<Duration> {
    let adjusted_time = node_time - NODE_CLOCK_DRIFT_SECS;
    let mut schedule = Vec::new();
    let mut total_scheduled: i64 = 0;

    for generator in generators {
        let until_hit = generator.hit_time - adjusted_time;
        if until_hit <= 0 {
            // candidate already due, nothing to sleep for
            continue;
        }
        if timeout_secs > 0 && until_hit > timeout_secs as i64 {
            break;
        }
        // Hit times are network-supplied; an out-of-order candidate
        // gets an immediate poll, not a sign-wrapped sleep.
        let delta = (until_hit - total_scheduled).max(0);
        schedule.push(Duration::from_secs(delta as u64));
        total_scheduled += delta;
    }

    schedule
}
