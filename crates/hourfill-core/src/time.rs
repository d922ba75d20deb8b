//! Entrance/exit time generation and `HH:MM` validation.

use std::sync::LazyLock;

use chrono::{NaiveTime, TimeDelta};
use hourfill_config::TimeWindow;
use rand::Rng;
use regex::Regex;

static TIME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is a valid regex")
});

/// One day's generated entrance and exit, both `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub entrance: String,
    pub exit: String,
}

/// Strict two-digit `HH:MM`, `00:00` through `23:59`.
pub fn is_valid_time_format(value: &str) -> bool {
    TIME_FORMAT.is_match(value)
}

/// Format minutes after midnight as `HH:MM`, wrapping past midnight.
pub fn format_minutes(minutes: u32) -> String {
    let time = NaiveTime::MIN + TimeDelta::minutes(i64::from(minutes));
    time.format("%H:%M").to_string()
}

/// Draw an entrance uniformly from `[min_entrance, max_entrance)` and an exit
/// `[min_work_hours, max_work_hours]` hours later, both at minute resolution.
pub fn generate_time_entry<R: Rng + ?Sized>(window: &TimeWindow, rng: &mut R) -> TimeEntry {
    let start = window.entrance_start_minutes();
    let end = window.entrance_end_minutes();
    let entrance = if end > start { rng.gen_range(start..end) } else { start };

    let min_work = window.min_work_hours * 60;
    let max_work = (window.max_work_hours * 60).max(min_work);
    let worked = rng.gen_range(min_work..=max_work);

    TimeEntry {
        entrance: format_minutes(entrance),
        exit: format_minutes(entrance + worked),
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
