//! Informal duration strings ("2h 30m", "1.5ч", "45м") to whole seconds.

/// Seconds in one hour.
pub const HOUR: u64 = 3600;

/// Longest duration a single entry may claim; anything longer is garbage.
pub const MAX_DURATION_SECONDS: u64 = 24 * HOUR;

/// Parses an informal duration into whole seconds.
///
/// Never fails: empty, garbage or all-zero input yields 0, as does anything
/// longer than [`MAX_DURATION_SECONDS`]. Hours must come before minutes;
/// other orderings degrade to partial results.
#[must_use]
pub fn parse_duration(input: &str) -> u64 {
    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'ч' => 'h',
            'м' => 'm',
            other => other,
        })
        .collect();

    let mut rest = normalized.as_str();
    let mut total = 0u64;

    if let Some((hours, after)) = rest.split_once('h') {
        total = total.saturating_add(component_seconds(hours, HOUR));
        rest = after;
    }

    if let Some((minutes, _)) = rest.split_once('m') {
        total = total.saturating_add(component_seconds(minutes, 60));
    }

    if total > MAX_DURATION_SECONDS {
        return 0;
    }
    total
}

/// `round(value * unit)` for a finite, positive value within
/// [`MAX_DURATION_SECONDS`]; anything else counts as zero.
fn component_seconds(raw: &str, unit: u64) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            let seconds = (value * unit as f64).round();
            if seconds > MAX_DURATION_SECONDS as f64 {
                0
            } else {
                seconds as u64
            }
        }
        _ => 0,
    }
}

/// Renders seconds the way the assistant is asked to write them: `2h 30m`, `2h`, `45m`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / HOUR;
    let minutes = (seconds % HOUR) / 60;
    match (hours, minutes) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}

/// Always both components, for tables: `0h 0m`, `7h 30m`.
#[must_use]
pub fn format_hours_minutes(seconds: u64) -> String {
    format!("{}h {}m", seconds / HOUR, (seconds % HOUR) / 60)
}
