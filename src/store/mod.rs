//! In-memory typed stores.
//!
//! Each store is an independent map keyed by string. Expiry is lazy: an
//! entry whose deadline has passed is invisible to every read and is removed
//! the first time it is touched.

mod channels;
mod hashes;
mod lists;
mod sets;
mod strings;

use std::time::{Duration, Instant};

pub use channels::ChannelTable;
pub use hashes::HashStore;
pub use lists::ListStore;
pub use sets::SetStore;
pub use strings::StringStore;

/// `None` never expires.
pub(crate) fn is_expired(expiry: Option<Instant>, now: Instant) -> bool {
    expiry.is_some_and(|deadline| deadline <= now)
}

/// Deadline `seconds` from `now`. Non-positive durations are already due.
pub(crate) fn deadline_after(now: Instant, seconds: i64) -> Instant {
    match u64::try_from(seconds) {
        Ok(secs) if secs > 0 => now
            .checked_add(Duration::from_secs(secs))
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64)),
        _ => now,
    }
}

/// Whole seconds until `deadline`, rounded down.
pub(crate) fn remaining_secs(deadline: Instant, now: Instant) -> i64 {
    deadline
        .checked_duration_since(now)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
