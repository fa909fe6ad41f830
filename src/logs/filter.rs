//! Size and time filters applied to assembled log output.
//!
//! Output is handled as raw bytes and returned unmodified apart from the
//! newline each kept line gets. The tail and byte limits keep one unit more
//! than requested. The `since_seconds` window keeps lines older than the
//! window.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::logs::query::LogOptions;

/// Layout of the timestamp prefix on timestamped log lines.
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Apply the tail limit, or else the byte limit, or nothing.
pub fn truncate(output: Vec<u8>, opts: &LogOptions) -> Vec<u8> {
    if opts.tail != 0 {
        tail_lines(&output, opts.tail)
    } else if opts.limit_bytes != 0 {
        last_bytes(&output, opts.limit_bytes).to_vec()
    } else {
        output
    }
}

/// Last `tail + 1` pieces of `output` split on `\n`, each followed by `\n`.
pub fn tail_lines(output: &[u8], tail: usize) -> Vec<u8> {
    let lines: Vec<&[u8]> = output.split(|b| *b == b'\n').collect();
    let keep = tail.saturating_add(1).min(lines.len());

    let mut out = Vec::with_capacity(output.len() + 1);
    for line in &lines[lines.len() - keep..] {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

/// Last `limit + 1` bytes of `output`.
pub fn last_bytes(output: &[u8], limit: usize) -> &[u8] {
    let keep = limit.saturating_add(1).min(output.len());
    &output[output.len() - keep..]
}

pub fn parse_log_timestamp(token: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(token, LOG_TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

/// Keep timestamped lines that fall in the requested window.
///
/// Lines without a parsable leading timestamp are dropped. With
/// `since_seconds`, a line is kept when it is more than `since_seconds` old
/// at `now`; otherwise it is kept when it is not before `since_time`. Only the
/// timestamp token is decoded; kept lines are copied byte for byte.
pub fn window(output: &[u8], opts: &LogOptions, now: DateTime<Utc>) -> Vec<u8> {
    let mut out = Vec::new();

    for line in output.split(|b| *b == b'\n') {
        let token = line.split(|b| *b == b' ').next().unwrap_or(line);
        let Some(stamp) = std::str::from_utf8(token).ok().and_then(parse_log_timestamp) else {
            continue;
        };

        let keep = if opts.since_seconds != 0 {
            age_secs(now, stamp) > opts.since_seconds as f64
        } else if let Some(since) = opts.since_time {
            stamp >= since
        } else {
            true
        };

        if keep {
            out.extend_from_slice(line);
            out.push(b'\n');
        }
    }
    out
}

fn age_secs(now: DateTime<Utc>, then: DateTime<Utc>) -> f64 {
    let age = now - then;
    age.num_nanoseconds()
        .map_or(age.num_seconds() as f64, |n| n as f64 / 1e9)
}
