//! Which words of a list need review.
//!
//! A word needs practice if any of these hold:
//! - it was never attempted,
//! - it was answered wrong recently (within `recent_failure_window_days`),
//! - it has enough attempts to judge (`min_attempts`) and its error rate is above `max_error_rate`.

use chrono::{DateTime, Utc};

use crate::config::PracticePolicy;
use crate::performance::{PerformanceStore, WordStat};
use crate::vocabulary::WordPair;

pub fn needs_practice(stat: Option<&WordStat>, now: DateTime<Utc>, policy: &PracticePolicy) -> bool {
    let Some(stat) = stat else {
        return true;
    };

    if let Some(last_incorrect_at) = stat.last_incorrect_at {
        if now - last_incorrect_at < policy.recent_failure_window() {
            return true;
        }
    }

    stat.attempts() >= policy.min_attempts && stat.error_rate() > policy.max_error_rate
}

/// The words needing practice, in list order.
pub fn select_needing_practice<'a>(
    list_id: &str,
    words: &'a [WordPair],
    now: DateTime<Utc>,
    store: &PerformanceStore,
    policy: &PracticePolicy,
) -> Vec<&'a WordPair> {
    words
        .iter()
        .filter(|word| needs_practice(store.stats_for(list_id, &word.id), now, policy))
        .collect()
}
