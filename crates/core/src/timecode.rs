//! `HH:MM:SS,mmm` timecodes as used by SRT files.

use anyhow::{anyhow, Result};

/// Parse `HH:MM:SS,mmm` into milliseconds.
/// Every field must have exactly the expected number of digits.
pub fn parse_timecode(t: &str) -> Result<u64> {
    let (hms, millis) = t
        .split_once(',')
        .ok_or_else(|| anyhow!("missing millisecond separator in '{t}'"))?;
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!("bad timecode '{t}'"));
    }
    let h = digits(parts[0], 2, t)?;
    let m = digits(parts[1], 2, t)?;
    let s = digits(parts[2], 2, t)?;
    let ms = digits(millis, 3, t)?;
    if m >= 60 || s >= 60 {
        return Err(anyhow!("minutes or seconds out of range in '{t}'"));
    }
    Ok(((h * 60 + m) * 60 + s) * 1000 + ms)
}

/// Format milliseconds back to `HH:MM:SS,mmm`.
pub fn format_timecode(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let ms = ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000`.
/// Anything after the end timecode (e.g. position hints) is ignored.
pub fn parse_time_range(line: &str) -> Result<(u64, u64)> {
    let (start, rest) = line
        .split_once(" --> ")
        .ok_or_else(|| anyhow!("missing '-->' in '{line}'"))?;
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("missing end time in '{line}'"))?;
    Ok((parse_timecode(start.trim())?, parse_timecode(end)?))
}

fn digits(field: &str, width: usize, whole: &str) -> Result<u64> {
    if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("bad timecode field '{field}' in '{whole}'"));
    }
    Ok(field.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let ms = parse_timecode("01:02:03,045").unwrap();
        assert_eq!(ms, 3_723_045);
        assert_eq!(format_timecode(ms), "01:02:03,045");
    }

    /// Timecodes without zero padding or with a dot separator are rejected.
    #[test]
    fn rejects_loose_timecodes() {
        assert!(parse_timecode("1:02:03,045").is_err());
        assert!(parse_timecode("00:00:01.000").is_err());
        assert!(parse_timecode("00:61:00,000").is_err());
        assert!(parse_timecode("00:00:01,0000").is_err());
    }

    /// Trailing coordinates after the end time do not break parsing.
    #[test]
    fn range_ignores_trailing_tokens() {
        let (s, e) = parse_time_range("00:00:05,000 --> 00:00:06,500 X1:10 X2:20").unwrap();
        assert_eq!((s, e), (5000, 6500));
    }

    #[test]
    fn range_requires_arrow() {
        assert!(parse_time_range("00:00:05,000 00:00:06,500").is_err());
    }
}
