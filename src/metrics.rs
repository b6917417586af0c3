use itertools::Itertools;
use std::collections::HashMap;
use std::time::Duration;

/// Conversion constant for WPM: five correct characters count as one word.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Live metrics reported to the rendering layer after every buffer edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub wpm: u64,
    pub accuracy: u8,
}

/// Qualitative rating of a completed run, by final accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Tier {
    #[strum(serialize = "PERFECT!")]
    Perfect,
    #[strum(serialize = "Excellent!")]
    Excellent,
    #[strum(serialize = "Good job!")]
    Good,
}

impl Tier {
    /// Runs below 85% accuracy earn no tier.
    pub fn from_accuracy(accuracy: u8) -> Option<Self> {
        match accuracy {
            100.. => Some(Self::Perfect),
            95..=99 => Some(Self::Excellent),
            85..=94 => Some(Self::Good),
            _ => None,
        }
    }
}

/// Words per minute over the elapsed session time.
///
/// Returns 0 until the clock has measurably started; the result is always
/// finite. Elapsed time stays fractional here, only the displayed timer
/// floors to whole seconds.
pub fn words_per_minute(correct_count: usize, elapsed: Duration) -> u64 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= f64::EPSILON {
        return 0;
    }

    let wpm = (correct_count as f64 / CHARS_PER_WORD) / minutes;
    if wpm.is_finite() {
        wpm.round() as u64
    } else {
        0
    }
}

/// Percentage of attempted keystrokes that matched the expected character.
///
/// With no attempts yet the session is flawless by definition.
pub fn accuracy(correct_count: usize, total_attempts: usize) -> u8 {
    if total_attempts == 0 {
        return 100;
    }

    ((correct_count as f64 / total_attempts as f64) * 100.0).round() as u8
}

/// One point on the results chart: cumulative WPM at `secs` into the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub secs: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(secs: f64, wpm: f64) -> Self {
        Self { secs, wpm }
    }
}

/// Group correct-keystroke offsets (seconds since session start) into
/// whole-second buckets, returning `(second, count)` pairs in order.
///
/// Keystrokes inside the first second land in bucket 1; the tail past the
/// last whole second lands at the exact elapsed time.
pub fn second_buckets(correct_offsets: &[f64], elapsed_secs: f64) -> Vec<(f64, f64)> {
    let whole_second_limit = elapsed_secs.floor();

    let mut counts: HashMap<u64, f64> = HashMap::new();
    for &offset in correct_offsets {
        let mut secs = offset.ceil();
        if secs < 1.0 {
            secs = 1.0;
        } else if secs > whole_second_limit {
            secs = elapsed_secs;
        }
        *counts.entry((secs * 1000.0) as u64).or_insert(0.0) += 1.0;
    }

    counts
        .into_iter()
        .map(|(millis, count)| (millis as f64 / 1000.0, count))
        .sorted_by(|a, b| a.partial_cmp(b).unwrap())
        .collect()
}

/// Cumulative WPM trajectory over the bucketed keystroke counts.
pub fn wpm_series(buckets: &[(f64, f64)]) -> Vec<TimeSeriesPoint> {
    let mut correct_so_far = 0.0;

    buckets
        .iter()
        .map(|&(secs, count)| {
            correct_so_far += count;
            TimeSeriesPoint::new(secs, (60.0 / secs) * correct_so_far / CHARS_PER_WORD)
        })
        .collect()
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;

    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
