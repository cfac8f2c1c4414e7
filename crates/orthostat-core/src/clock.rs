use crate::error::CoreError;

/// Longest test duration, in whole minutes, a backfilled time may name.
pub const MAX_TEST_MINUTES: u32 = 10;

/// Format elapsed seconds as `M:SS` (e.g. `150` → `"2:30"`).
pub fn format_clock(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse an operator-entered `M:SS` or `MM:SS` string into total seconds.
///
/// Rejects anything not shaped like one or two digits, a colon and exactly
/// two digits, seconds of 60 or more, and minutes past [`MAX_TEST_MINUTES`].
pub fn parse_clock(input: &str) -> Result<u32, CoreError> {
    let (minutes, seconds) = split_clock(input, 2)?;
    if minutes > MAX_TEST_MINUTES {
        return Err(invalid_time(
            input,
            &format!("time cannot exceed {MAX_TEST_MINUTES} minutes"),
        ));
    }
    Ok(minutes * 60 + seconds)
}

/// Parse the `M:SS` label of a reading that is already recorded.
///
/// Live readings are stored at whatever the standing timer shows, so the
/// minutes are not capped here; only the shape and the seconds are checked.
pub fn parse_elapsed(input: &str) -> Result<u32, CoreError> {
    let (minutes, seconds) = split_clock(input, 4)?;
    Ok(minutes * 60 + seconds)
}

fn split_clock(input: &str, max_minute_digits: usize) -> Result<(u32, u32), CoreError> {
    let (minutes, seconds) = input
        .trim()
        .split_once(':')
        .ok_or_else(|| invalid_time(input, FORMAT_HINT))?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(minutes)
        || minutes.len() > max_minute_digits
        || !all_digits(seconds)
        || seconds.len() != 2
    {
        return Err(invalid_time(input, FORMAT_HINT));
    }

    // At most four ASCII digits each, so these cannot overflow.
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| invalid_time(input, "minutes are not a number"))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| invalid_time(input, "seconds are not a number"))?;

    if seconds >= 60 {
        return Err(invalid_time(input, "seconds must be less than 60"));
    }
    Ok((minutes, seconds))
}

const FORMAT_HINT: &str = "time must be in format MM:SS (e.g., 2:30)";

fn invalid_time(input: &str, reason: &str) -> CoreError {
    CoreError::InvalidTime {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
