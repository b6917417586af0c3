use std::time::{Duration, SystemTime};

use thiserror::Error;

use crate::metrics::{self, MetricsSnapshot, Tier, TimeSeriesPoint};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid configuration: reference text must not be empty")]
    InvalidConfiguration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Display classification of a single reference-text position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Untouched,
    Current,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Inactive,
    Active,
    Complete,
}

/// One classified keystroke. Attempts accumulate across deletions and are
/// never rolled back, so accuracy reflects cumulative effort rather than the
/// final on-screen state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attempt {
    pub typed: char,
    pub outcome: Outcome,
    pub at: SystemTime,
}

/// Final report captured by the internal complete transition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub metrics: MetricsSnapshot,
    pub tier: Option<Tier>,
    pub elapsed: Duration,
    pub wpm_series: Vec<TimeSeriesPoint>,
    pub std_dev: f64,
}

/// Everything the rendering layer needs for one frame, as a pure projection
/// of session state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub verdicts: Vec<Verdict>,
    pub metrics: MetricsSnapshot,
    pub elapsed_secs: u64,
}

/// State machine driving a single typing test.
///
/// Consumes full-buffer edit events (the entire typed sequence, not deltas)
/// and produces per-position verdicts, live WPM/accuracy, and a completion
/// summary once the cursor reaches the end of the reference text.
///
/// Transitions: Inactive -> Active (`start`) -> Complete (last position
/// classified) -> Inactive (`reset`/`start`). There is no path from Complete
/// back to Active that skips the reset.
#[derive(Debug, Default)]
pub struct TypingSession {
    text: String,
    reference: Vec<char>,
    cursor: usize,
    correct_count: usize,
    total_attempts: usize,
    started_at: Option<SystemTime>,
    phase: Phase,
    marks: Vec<Option<Outcome>>,
    attempts: Vec<Attempt>,
    elapsed_secs: u64,
    completion: Option<CompletionSummary>,
}

impl TypingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a test over `text`. Zeroes every counter; the elapsed-time clock
    /// stays unset until the first buffer edit arrives.
    pub fn start(&mut self, text: &str) -> Result<(), SessionError> {
        if text.is_empty() {
            return Err(SessionError::InvalidConfiguration);
        }

        *self = Self {
            text: text.to_owned(),
            reference: text.chars().collect(),
            phase: Phase::Active,
            ..Self::default()
        };
        self.marks = vec![None; self.reference.len()];

        Ok(())
    }

    /// Return to the zeroed, inactive state. Unlike `start`, no new text is
    /// selected.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Process the full current value of the typed buffer.
    ///
    /// A buffer shorter than the cursor position is a deletion and rewinds
    /// the cursor; a buffer carrying a character at the cursor position is an
    /// advance and classifies exactly that character. Anything else leaves
    /// the session untouched. Returns a fresh metrics snapshot, or `None`
    /// when the session is not active (stray events are silently dropped).
    pub fn submit_input(&mut self, typed: &str) -> Option<MetricsSnapshot> {
        if self.phase != Phase::Active {
            return None;
        }

        let now = SystemTime::now();
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        let typed: Vec<char> = typed.chars().collect();
        if typed.len() < self.cursor {
            // Deletion: rewind only the cursor. Tallies for the re-typed
            // span stay counted.
            self.cursor = typed.len();
        } else if let Some(&c) = typed.get(self.cursor) {
            self.advance(c, now);
        }

        Some(self.metrics_at(now))
    }

    fn advance(&mut self, typed: char, now: SystemTime) {
        let expected = self.reference[self.cursor];
        let outcome = if typed == expected {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };

        self.total_attempts += 1;
        if outcome == Outcome::Correct {
            self.correct_count += 1;
        }

        self.marks[self.cursor] = Some(outcome);
        self.attempts.push(Attempt {
            typed,
            outcome,
            at: now,
        });
        self.cursor += 1;

        if self.cursor == self.reference.len() {
            self.complete(now);
        }
    }

    /// Internal transition into Complete: freeze the clock and capture the
    /// final report.
    fn complete(&mut self, now: SystemTime) {
        self.phase = Phase::Complete;

        let elapsed = self.elapsed_at(now);
        self.elapsed_secs = elapsed.as_secs();

        let snapshot = MetricsSnapshot {
            wpm: metrics::words_per_minute(self.correct_count, elapsed),
            accuracy: metrics::accuracy(self.correct_count, self.total_attempts),
        };

        let started = self.started_at;
        let offsets: Vec<f64> = self
            .attempts
            .iter()
            .filter(|a| a.outcome == Outcome::Correct)
            .filter_map(|a| a.at.duration_since(started?).ok())
            .map(|d| d.as_secs_f64())
            .collect();
        let buckets = metrics::second_buckets(&offsets, elapsed.as_secs_f64());
        let wpm_series = metrics::wpm_series(&buckets);

        // Consistency over the whole-second buckets, dropping the ragged tail
        let counts: Vec<f64> = buckets
            .iter()
            .take(buckets.len().saturating_sub(1))
            .map(|&(_, count)| count)
            .collect();
        let std_dev = metrics::std_dev(&counts).unwrap_or(0.0);

        self.completion = Some(CompletionSummary {
            metrics: snapshot,
            tier: Tier::from_accuracy(snapshot.accuracy),
            elapsed,
            wpm_series,
            std_dev,
        });
    }

    /// Display-only refresh of the whole-second elapsed counter. No-op
    /// unless the session is active and the clock has started, so stray
    /// ticks after completion or reset change nothing.
    pub fn tick(&mut self) {
        if self.phase != Phase::Active {
            return;
        }

        if let Some(started) = self.started_at {
            if let Ok(elapsed) = started.elapsed() {
                self.elapsed_secs = elapsed.as_secs();
            }
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        match &self.completion {
            Some(summary) => summary.metrics,
            None => self.metrics_at(SystemTime::now()),
        }
    }

    fn metrics_at(&self, now: SystemTime) -> MetricsSnapshot {
        MetricsSnapshot {
            wpm: metrics::words_per_minute(self.correct_count, self.elapsed_at(now)),
            accuracy: metrics::accuracy(self.correct_count, self.total_attempts),
        }
    }

    fn elapsed_at(&self, now: SystemTime) -> Duration {
        self.started_at
            .and_then(|started| now.duration_since(started).ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Per-position display classification, derived from the cursor and the
    /// recorded outcome marks. Positions at or past the cursor read as
    /// untouched even if they carry stale marks from before a deletion, so a
    /// rewound span re-renders exactly as if typed fresh.
    pub fn verdicts(&self) -> Vec<Verdict> {
        (0..self.reference.len())
            .map(|idx| {
                if idx < self.cursor {
                    match self.marks[idx] {
                        Some(Outcome::Correct) => Verdict::Correct,
                        Some(Outcome::Incorrect) => Verdict::Incorrect,
                        None => Verdict::Untouched,
                    }
                } else if idx == self.cursor && self.phase == Phase::Active {
                    Verdict::Current
                } else {
                    Verdict::Untouched
                }
            })
            .collect()
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel {
            verdicts: self.verdicts(),
            metrics: self.metrics(),
            elapsed_secs: self.elapsed_secs,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        self.completion.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reference(&self) -> &[char] {
        &self.reference
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_attempts(&self) -> usize {
        self.total_attempts
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}
