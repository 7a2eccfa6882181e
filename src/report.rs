use std::time::Duration;

use chrono::{DateTime, Local};

/// Print a framed section header, e.g. `─── 📊 FINAL REPORT ───`.
pub fn section_header(title: &str) {
    println!("\n─── {} ───", title);
}

/// Pick the singular or plural label for a count.
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Humanize a duration in whole seconds: "1 hour, 2 minutes and 5 seconds".
///
/// Zero components are dropped except when the whole duration rounds to
/// nothing, which renders as "0 seconds".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!(
            "{} {}",
            hours,
            pluralize(hours as usize, "hour", "hours")
        ));
    }
    if minutes > 0 {
        parts.push(format!(
            "{} {}",
            minutes,
            pluralize(minutes as usize, "minute", "minutes")
        ));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!(
            "{} {}",
            seconds,
            pluralize(seconds as usize, "second", "seconds")
        ));
    }

    match parts.len() {
        1 => parts.remove(0),
        2 => format!("{} and {}", parts[0], parts[1]),
        _ => format!("{}, {} and {}", parts[0], parts[1], parts[2]),
    }
}

/// Start/end line for the final report. Dates only appear when the run
/// crossed midnight.
pub fn format_time_range(start: DateTime<Local>, end: DateTime<Local>) -> String {
    if start.date_naive() == end.date_naive() {
        format!(
            "📅 Start: {} | End: {}",
            start.format("%H:%M:%S"),
            end.format("%H:%M:%S")
        )
    } else {
        format!(
            "📅 Start: {} {} | End: {} {}",
            start.format("%H:%M:%S"),
            start.format("%Y-%m-%d"),
            end.format("%H:%M:%S"),
            end.format("%Y-%m-%d")
        )
    }
}
