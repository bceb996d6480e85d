//! Duration parsing and fee computation.
//!
//! Durations arrive as free text picked from the apps' selectors
//! ("30 minutes", "1 hour", "2 hours 30 minutes"). Hours and minutes are
//! extracted independently; input matching neither pattern falls back to
//! 30 minutes. The fallback is intentional: the selectors only offer
//! well-formed values, so a lenient default beats a hard failure here.

use once_cell::sync::Lazy;
use regex::Regex;

static HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*hours?").expect("invalid hours pattern"));
static MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*minutes?").expect("invalid minutes pattern"));
static FIRST_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("invalid integer pattern"));

/// Default applied when a duration string matches neither pattern.
pub const FALLBACK_MINUTES: i64 = 30;

/// Total minutes described by a free-text duration.
pub fn parse_duration(text: &str) -> i64 {
    let hours = capture_int(&HOURS_RE, text);
    let minutes = capture_int(&MINUTES_RE, text);

    match (hours, minutes) {
        (None, None) => FALLBACK_MINUTES,
        (h, m) => h.unwrap_or(0) * 60 + m.unwrap_or(0),
    }
}

/// Fee in rupees for a duration at an hourly rate: `round(minutes/60 × rate)`.
///
/// Hours are kept exact before rounding so "1 hour 30 minutes" at 150/hr
/// prices as 1.5 × 150 = 225, not 2 × 150.
pub fn fee_for(duration_text: &str, rate_per_hour: i64) -> i64 {
    let minutes = parse_duration(duration_text);
    let hours = minutes as f64 / 60.0;
    (hours * rate_per_hour as f64).round() as i64
}

/// First integer substring of a zone's free-text rate field
/// (`"Rs. 150 per hour"` → 150). `None` when the field contains no digits.
pub fn parse_rate_text(text: &str) -> Option<i64> {
    FIRST_INT_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

fn capture_int(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes_only() {
        assert_eq!(parse_duration("30 minutes"), 30);
        assert_eq!(parse_duration("45 minutes"), 45);
        assert_eq!(parse_duration("1 minute"), 1);
    }

    #[test]
    fn parses_hours_only() {
        assert_eq!(parse_duration("1 hour"), 60);
        assert_eq!(parse_duration("2 hours"), 120);
    }

    #[test]
    fn parses_hours_and_minutes() {
        assert_eq!(parse_duration("1 hour 30 minutes"), 90);
        assert_eq!(parse_duration("2 hours 30 minutes"), 150);
        assert_eq!(parse_duration("3 hours 15 minutes"), 195);
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(parse_duration("1 Hour 30 Minutes"), 90);
        assert_eq!(parse_duration("2 HOURS"), 120);
    }

    #[test]
    fn unparseable_input_falls_back_to_thirty_minutes() {
        assert_eq!(parse_duration(""), FALLBACK_MINUTES);
        assert_eq!(parse_duration("all day"), FALLBACK_MINUTES);
        assert_eq!(parse_duration("90"), FALLBACK_MINUTES);
    }

    #[test]
    fn fee_is_proportional_and_rounded() {
        assert_eq!(fee_for("1 hour 30 minutes", 150), 225);
        assert_eq!(fee_for("30 minutes", 150), 75);
        assert_eq!(fee_for("1 hour", 100), 100);
        // 20 minutes at 100/hr = 33.33.. rounds down
        assert_eq!(fee_for("20 minutes", 100), 33);
        // 45 minutes at 90/hr = 67.5 rounds half up
        assert_eq!(fee_for("45 minutes", 90), 68);
    }

    #[test]
    fn fee_for_unparseable_duration_uses_fallback() {
        assert_eq!(fee_for("whenever", 100), 50);
    }

    #[test]
    fn extracts_first_integer_from_rate_text() {
        assert_eq!(parse_rate_text("Rs. 150 per hour"), Some(150));
        assert_eq!(parse_rate_text("200"), Some(200));
        assert_eq!(parse_rate_text("LKR 80/hr"), Some(80));
    }

    #[test]
    fn rate_text_without_digits_yields_none() {
        assert_eq!(parse_rate_text("free"), None);
        assert_eq!(parse_rate_text(""), None);
    }
}
