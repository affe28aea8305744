//! Parsing of the short duration strings the gateway prints ("120s", "5m").

use chrono::Duration;
use thiserror::Error;

/// Largest whole-second count a `chrono::Duration` can hold.
const MAX_SECONDS: i64 = i64::MAX / 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("expected a number before '{0}'")]
    MissingNumber(char),
    #[error("unknown duration unit '{0}' (expected s, m, h or d)")]
    UnknownUnit(char),
    #[error("duration is too large")]
    Overflow,
}

/// Parse a duration like `120s`, `5m`, `1h30m` or a bare `90` (seconds).
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    if input.chars().all(|c| c.is_ascii_digit()) {
        let seconds = input.parse::<i64>().map_err(|_| DurationError::Overflow)?;
        return to_duration(seconds);
    }

    let mut total: i64 = 0;
    let mut number: Option<i64> = None;

    for c in input.chars() {
        if c.is_whitespace() {
            continue;
        }
        if let Some(digit) = c.to_digit(10) {
            let n = number.unwrap_or(0);
            number = Some(
                n.checked_mul(10)
                    .and_then(|n| n.checked_add(digit as i64))
                    .ok_or(DurationError::Overflow)?,
            );
            continue;
        }

        let multiplier = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            other => return Err(DurationError::UnknownUnit(other)),
        };
        let n = number.take().ok_or(DurationError::MissingNumber(c))?;
        total = n
            .checked_mul(multiplier)
            .and_then(|secs| total.checked_add(secs))
            .ok_or(DurationError::Overflow)?;
    }

    // Trailing digits without a unit ("1m30") count as seconds
    if let Some(n) = number {
        total = total.checked_add(n).ok_or(DurationError::Overflow)?;
    }

    to_duration(total)
}

fn to_duration(seconds: i64) -> Result<Duration, DurationError> {
    if seconds > MAX_SECONDS {
        return Err(DurationError::Overflow);
    }
    Ok(Duration::seconds(seconds))
}
