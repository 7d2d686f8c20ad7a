//! Read-only traffic queries over a `LogTable`.
//!
//! Rankings are ordered by count, descending. Keys with equal counts keep the
//! order in which they first appear in the table.

use chrono::{NaiveDateTime, Timelike};
use std::collections::{BTreeMap, HashMap};
use crate::error::ParseError;
use crate::models::{Column, KeyCount, LogTable};

/// Requests per (minute, ip)
pub type MinuteCounts = BTreeMap<(NaiveDateTime, String), usize>;

/// Count every distinct value of a column, most frequent first
pub fn value_counts(table: &LogTable, column: Column) -> Vec<KeyCount> {
    count_in_first_seen_order(table.iter().map(|record| record.field(column)))
}

/// The `n` most frequent values of a column
pub fn top_by(table: &LogTable, column: Column, n: usize) -> Vec<KeyCount> {
    let mut counts = value_counts(table, column);
    counts.truncate(n);
    counts
}

pub fn top_ips(table: &LogTable, n: usize) -> Vec<KeyCount> {
    top_by(table, Column::Ip, n)
}

pub fn top_user_agents(table: &LogTable, n: usize) -> Vec<KeyCount> {
    top_by(table, Column::Ua, n)
}

pub fn top_paths(table: &LogTable, n: usize) -> Vec<KeyCount> {
    top_by(table, Column::Path, n)
}

/// IPs with strictly more than `threshold` requests
pub fn detect_suspicious_ips(table: &LogTable, threshold: usize) -> Vec<KeyCount> {
    value_counts(table, Column::Ip)
        .into_iter()
        .filter(|entry| entry.count > threshold)
        .collect()
}

/// Floor a timestamp to the start of its minute
pub fn minute_bucket(timestamp: &NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(*timestamp)
}

/// Requests from each IP within each minute.
///
/// Needs the timestamp column from `LogTable::normalize_timestamps`, otherwise
/// fails with `SchemaError`. Counts always sum to the table's row count.
pub fn requests_per_minute_per_ip(table: &LogTable) -> Result<MinuteCounts, ParseError> {
    let timestamps = table.timestamps()?;
    let mut counts = MinuteCounts::new();

    for (record, timestamp) in table.iter().zip(timestamps) {
        *counts
            .entry((minute_bucket(timestamp), record.ip.clone()))
            .or_insert(0) += 1;
    }

    Ok(counts)
}

/// Peak per-minute request count of every IP
pub fn peak_requests_per_minute(table: &LogTable) -> Result<Vec<KeyCount>, ParseError> {
    let timestamps = table.timestamps()?;
    let mut first_seen: Vec<&str> = Vec::new();
    let mut per_minute: HashMap<(NaiveDateTime, &str), usize> = HashMap::new();
    let mut peaks: HashMap<&str, usize> = HashMap::new();

    for (record, timestamp) in table.iter().zip(timestamps) {
        let ip = record.ip.as_str();
        let count = per_minute.entry((minute_bucket(timestamp), ip)).or_insert(0);
        *count += 1;
        let count = *count;

        match peaks.get_mut(ip) {
            Some(peak) => *peak = (*peak).max(count),
            None => {
                first_seen.push(ip);
                peaks.insert(ip, count);
            }
        }
    }

    let entries = first_seen
        .into_iter()
        .map(|ip| KeyCount::new(ip, peaks.get(ip).copied().unwrap_or(0)))
        .collect();
    Ok(rank(entries))
}

/// The `n` IPs with the highest peak per-minute request count
pub fn top_n_requests_per_minute(table: &LogTable, n: usize) -> Result<Vec<KeyCount>, ParseError> {
    let mut peaks = peak_requests_per_minute(table)?;
    peaks.truncate(n);
    Ok(peaks)
}

fn count_in_first_seen_order<'a, I>(values: I) -> Vec<KeyCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<KeyCount> = Vec::new();

    for value in values {
        match positions.get(value) {
            Some(&position) => entries[position].count += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push(KeyCount::new(value, 1));
            }
        }
    }

    rank(entries)
}

/// Stable sort keeps first-seen order among equal counts
fn rank(mut entries: Vec<KeyCount>) -> Vec<KeyCount> {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
