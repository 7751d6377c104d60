// src/attempt/countdown.rs

use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant, Interval};

/// One countdown step.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quiz duration {0:?}, expected HH:MM")]
pub struct DurationError(pub String);

/// Parses an `HH:MM` quiz duration into whole seconds.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let invalid = || DurationError(text.to_owned());

    let (hours, minutes) = text.trim().split_once(':').ok_or_else(invalid)?;
    let hours = digits(hours).ok_or_else(invalid)?;
    let minutes = digits(minutes).ok_or_else(invalid)?;
    if minutes >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60))
        .ok_or_else(invalid)
}

fn digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Renders seconds as `HH:MM:SS`.
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// A running one-second ticker.
///
/// Dropping it cancels it; nothing fires unless [`Countdown::wait`] is polled.
#[derive(Debug)]
pub struct Countdown {
    interval: Interval,
}

impl Countdown {
    /// Starts ticking; the first tick is one full period from now.
    pub fn start() -> Self {
        Self {
            interval: time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD),
        }
    }

    /// Waits for the next tick. Cancel safe.
    pub async fn wait(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_and_minutes() {
        assert_eq!(parse_duration("01:30"), Ok(5400));
        assert_eq!(parse_duration("00:01"), Ok(60));
        assert_eq!(parse_duration("00:00"), Ok(0));
        assert_eq!(parse_duration("2:05"), Ok(7500));
    }

    #[test]
    fn rejects_malformed_durations() {
        for text in ["", "90", "01:", ":30", "01:60", "aa:bb", "-1:00", "+1:00", "01:30:00"] {
            assert!(parse_duration(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn formats_as_clock() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(5400), "01:30:00");
        assert_eq!(format_hms(3661), "01:01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let started = Instant::now();
        let mut countdown = Countdown::start();

        countdown.wait().await;
        assert_eq!(started.elapsed(), TICK_PERIOD);
        countdown.wait().await;
        assert_eq!(started.elapsed(), TICK_PERIOD * 2);
    }
}
