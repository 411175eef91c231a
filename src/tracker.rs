//! Live position stream filtering and smoothing.
//!
//! The host delivers raw position samples at unpredictable intervals; the
//! tracker decides which of them are worth acting on and keeps a short
//! history of accepted samples for smoothing.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geodesic::distance_meters;
use crate::geometry::Coordinate;

/// One reading from the external position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub coord: Coordinate,
    pub accuracy_meters: f64,
    pub heading_degrees: Option<f64>,
    pub speed_mps: Option<f64>,
    /// Source timestamp, unix milliseconds.
    pub timestamp_ms: i64,
}

/// Acceptance thresholds and bounds for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum great-circle movement for a sample to matter, meters.
    pub min_move_meters: f64,
    /// Minimum accuracy improvement for a stationary sample to matter,
    /// meters.
    pub accuracy_gain_meters: f64,
    /// Accept any sample once this much time has passed, milliseconds.
    pub max_interval_ms: i64,
    /// Rolling history length, oldest evicted first.
    pub history_capacity: usize,
    /// Stop tracking once a session has run this long, if set.
    pub max_duration_ms: Option<i64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_move_meters: 2.0,
            accuracy_gain_meters: 5.0,
            max_interval_ms: 2000,
            history_capacity: 10,
            max_duration_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Tracking,
}

/// What the tracker did with an offered sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDisposition {
    /// Became the new `last_sample`; act on it.
    Accepted,
    /// Below every threshold; discarded, not queued.
    Rejected,
    /// Tracker is not tracking; sample ignored.
    Idle,
    /// The configured maximum duration elapsed; the tracker went idle.
    Expired,
}

/// An error reported by the external position source.
///
/// Recoverable errors (a timed-out read) leave the tracker waiting for the
/// next sample; terminal errors (permission revoked) end the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSourceError {
    Recoverable(String),
    Terminal(String),
}

impl fmt::Display for PositionSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSourceError::Recoverable(reason) => {
                write!(f, "recoverable position source error: {}", reason)
            }
            PositionSourceError::Terminal(reason) => {
                write!(f, "terminal position source error: {}", reason)
            }
        }
    }
}

impl std::error::Error for PositionSourceError {}

/// Idle/Tracking state machine over a stream of [`LocationSample`]s.
#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    state: TrackerState,
    started_ms: i64,
    last_sample: Option<LocationSample>,
    history: VecDeque<LocationSample>,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        let capacity = config.history_capacity;
        Self {
            config,
            state: TrackerState::Idle,
            started_ms: 0,
            last_sample: None,
            history: VecDeque::with_capacity(capacity),
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn last_sample(&self) -> Option<&LocationSample> {
        self.last_sample.as_ref()
    }

    pub fn history(&self) -> impl Iterator<Item = &LocationSample> {
        self.history.iter()
    }

    /// Begin a tracking session at `now_ms`.
    pub fn start(&mut self, now_ms: i64) {
        self.state = TrackerState::Tracking;
        self.started_ms = now_ms;
        self.last_sample = None;
        self.history.clear();
    }

    /// End the session and clear all sample state. Idempotent.
    pub fn cancel(&mut self) {
        self.state = TrackerState::Idle;
        self.last_sample = None;
        self.history.clear();
    }

    /// Offer an incoming sample to the acceptance filter.
    pub fn offer(&mut self, sample: LocationSample) -> SampleDisposition {
        if self.state == TrackerState::Idle {
            return SampleDisposition::Idle;
        }

        if let Some(max_duration) = self.config.max_duration_ms {
            if sample.timestamp_ms - self.started_ms > max_duration {
                tracing::debug!(started_ms = self.started_ms, "tracking session expired");
                self.cancel();
                return SampleDisposition::Expired;
            }
        }

        if !self.should_accept(&sample) {
            return SampleDisposition::Rejected;
        }

        self.last_sample = Some(sample);
        if self.history.len() == self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        SampleDisposition::Accepted
    }

    /// A sample is accepted if it moved, got meaningfully more accurate, or
    /// enough time passed since the last accepted one. The first sample of
    /// a session always passes.
    fn should_accept(&self, sample: &LocationSample) -> bool {
        let Some(last) = &self.last_sample else {
            return true;
        };
        distance_meters(last.coord, sample.coord) > self.config.min_move_meters
            || last.accuracy_meters - sample.accuracy_meters > self.config.accuracy_gain_meters
            || sample.timestamp_ms - last.timestamp_ms > self.config.max_interval_ms
    }

    /// Accuracy-weighted mean over the rolling history.
    ///
    /// Tighter readings dominate (weight `1/accuracy²`, accuracy floored at
    /// one meter). `None` until a sample has been accepted.
    pub fn smoothed_position(&self) -> Option<Coordinate> {
        if self.history.is_empty() {
            return None;
        }

        let mut lat_sum = 0.0;
        let mut lng_sum = 0.0;
        let mut weight_sum = 0.0;
        for sample in &self.history {
            let weight = 1.0 / sample.accuracy_meters.max(1.0).powi(2);
            lat_sum += sample.coord.lat * weight;
            lng_sum += sample.coord.lng * weight;
            weight_sum += weight;
        }
        Some(Coordinate::new(lat_sum / weight_sum, lng_sum / weight_sum))
    }

    /// Apply a source-level error, returning the resulting state.
    pub fn on_source_error(&mut self, error: &PositionSourceError) -> TrackerState {
        match error {
            PositionSourceError::Recoverable(reason) => {
                tracing::warn!(reason = %reason, "position source hiccup, still tracking");
            }
            PositionSourceError::Terminal(reason) => {
                tracing::warn!(reason = %reason, "position source lost, stopping");
                self.cancel();
            }
        }
        self.state
    }
}
