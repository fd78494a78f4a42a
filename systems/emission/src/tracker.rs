//! Spawn progress tracking driven by numerical curve integration.

use std::num::NonZeroU32;
use std::time::Duration;

use surge_core::{Curve, ProgressSnapshot, UnitCount};

use crate::integrate::segmented_area;

/// Default integration granularity, one sixtieth of a real-time unit.
pub const DEFAULT_SEGMENT_WIDTH: f64 = 1.0 / 60.0;

/// Strategy used to maintain the running area accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrationStrategy {
    /// Integrates only the interval covered since the previous step and adds
    /// it to the running accumulator. Cheap per step, but floating-point
    /// drift accumulates across very long runs; an optional resync interval
    /// replaces the accumulator with a from-scratch integration every that
    /// many advancing steps to bound the drift.
    Incremental {
        /// Advancing steps between from-scratch resynchronizations.
        resync_interval: Option<NonZeroU32>,
    },
    /// Recomputes the covered area from the domain start on every advancing
    /// step. Exact at each step, with cost linear in covered time.
    RecomputeFromStart,
}

impl Default for IntegrationStrategy {
    fn default() -> Self {
        Self::Incremental {
            resync_interval: None,
        }
    }
}

/// Configuration required to construct a [`SpawnTracker`].
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    curve: Curve,
    time_span: Duration,
    max_count: UnitCount,
    segment_width: f64,
    strategy: IntegrationStrategy,
}

impl ScheduleConfig {
    /// Creates a schedule pacing `max_count` units along `curve` over
    /// `time_span`, with the default integration granularity and strategy.
    #[must_use]
    pub fn new(curve: Curve, time_span: Duration, max_count: UnitCount) -> Self {
        Self {
            curve,
            time_span,
            max_count,
            segment_width: DEFAULT_SEGMENT_WIDTH,
            strategy: IntegrationStrategy::default(),
        }
    }

    /// Overrides the integration granularity in real-time units.
    #[must_use]
    pub fn with_segment_width(mut self, segment_width: f64) -> Self {
        self.segment_width = segment_width;
        self
    }

    /// Overrides the area accumulation strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: IntegrationStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Reasons schedule construction may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// The curve's time domain does not extend past zero.
    #[error("curve domain must extend past zero, got end {domain_end}")]
    NonPositiveDomain {
        /// Upper bound of the offending curve's domain.
        domain_end: f64,
    },
    /// The configured time span was zero.
    #[error("time span must be positive")]
    ZeroTimeSpan,
    /// The configured segment width was non-positive or non-finite.
    #[error("segment width must be positive and finite, got {segment_width}")]
    InvalidSegmentWidth {
        /// The rejected width value.
        segment_width: f64,
    },
}

/// Outcome of a single tracker step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Number of units that should have been emitted by now.
    pub target: UnitCount,
    /// Progress readings for observers.
    pub snapshot: ProgressSnapshot,
}

/// Converts elapsed real time into a monotone target spawn count by
/// integrating a rate curve.
///
/// The tracker advances a normalized time cursor through the curve's domain,
/// integrates the newly covered interval each step, and normalizes the
/// accumulated area against the precomputed total to derive the target.
/// Once the cursor reaches the domain end the tracker is complete and
/// further steps are cheap no-ops.
#[derive(Clone, Debug)]
pub struct SpawnTracker {
    curve: Curve,
    time_span_secs: f64,
    segment_width: f64,
    strategy: IntegrationStrategy,
    max_count: UnitCount,
    domain_end: f64,
    total_area: f64,
    accumulated_area: f64,
    normalized_time: f64,
    elapsed: Duration,
    steps_since_resync: u32,
    last_target: UnitCount,
    last_snapshot: ProgressSnapshot,
}

impl SpawnTracker {
    /// Creates a tracker from the provided schedule.
    ///
    /// The curve's total area is integrated once here; stepping never fails.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the curve's domain does not extend
    /// past zero, the time span is zero, or the segment width is not a
    /// positive finite number.
    pub fn new(config: ScheduleConfig) -> Result<Self, ScheduleError> {
        let domain_end = config.curve.domain_end();
        if domain_end <= 0.0 {
            return Err(ScheduleError::NonPositiveDomain { domain_end });
        }
        if config.time_span.is_zero() {
            return Err(ScheduleError::ZeroTimeSpan);
        }
        if !(config.segment_width.is_finite() && config.segment_width > 0.0) {
            return Err(ScheduleError::InvalidSegmentWidth {
                segment_width: config.segment_width,
            });
        }

        let time_span_secs = config.time_span.as_secs_f64();
        let total_area = segmented_area(
            &config.curve,
            0.0,
            domain_end,
            config.segment_width,
            time_span_secs,
        );

        Ok(Self {
            curve: config.curve,
            time_span_secs,
            segment_width: config.segment_width,
            strategy: config.strategy,
            max_count: config.max_count,
            domain_end,
            total_area,
            accumulated_area: 0.0,
            normalized_time: 0.0,
            elapsed: Duration::ZERO,
            steps_since_resync: 0,
            last_target: UnitCount::ZERO,
            last_snapshot: ProgressSnapshot::initial(),
        })
    }

    /// Advances the tracker by the provided real-time delta and returns the
    /// updated target count and progress snapshot.
    ///
    /// A delta that does not move the normalized cursor (zero, or a tracker
    /// that already reached the domain end) performs no integration and
    /// returns the previous outcome unchanged.
    pub fn step(&mut self, dt: Duration) -> StepOutcome {
        let previous = self.normalized_time;
        let advanced =
            (previous + dt.as_secs_f64() / self.time_span_secs).clamp(0.0, self.domain_end);
        if advanced == previous {
            return StepOutcome {
                target: self.last_target,
                snapshot: self.last_snapshot,
            };
        }

        self.normalized_time = advanced;
        self.elapsed = self.elapsed.saturating_add(dt);

        match self.strategy {
            IntegrationStrategy::Incremental { resync_interval } => {
                self.accumulated_area += segmented_area(
                    &self.curve,
                    previous,
                    advanced,
                    self.segment_width,
                    self.time_span_secs,
                );
                self.steps_since_resync = self.steps_since_resync.saturating_add(1);
                if let Some(interval) = resync_interval {
                    if self.steps_since_resync >= interval.get() {
                        self.accumulated_area = self.area_from_start(advanced);
                        self.steps_since_resync = 0;
                    }
                }
            }
            IntegrationStrategy::RecomputeFromStart => {
                self.accumulated_area = self.area_from_start(advanced);
            }
        }

        let progress = self.normalized_progress();
        let target = UnitCount::new((progress * f64::from(self.max_count.get())).round() as u32);
        let snapshot = ProgressSnapshot {
            percent_area: progress * 100.0,
            percent_time: 100.0 * self.normalized_time / self.domain_end,
            real_time_elapsed: self.elapsed,
        };

        self.last_target = target;
        self.last_snapshot = snapshot;
        StepOutcome { target, snapshot }
    }

    /// Reports whether the normalized cursor reached the curve's domain end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.normalized_time >= self.domain_end
    }

    /// Target count returned by the most recent advancing step.
    #[must_use]
    pub const fn target(&self) -> UnitCount {
        self.last_target
    }

    /// Snapshot returned by the most recent advancing step.
    #[must_use]
    pub const fn snapshot(&self) -> ProgressSnapshot {
        self.last_snapshot
    }

    /// Upper bound on the target count.
    #[must_use]
    pub const fn max_count(&self) -> UnitCount {
        self.max_count
    }

    /// Precomputed area under the full curve domain.
    #[must_use]
    pub const fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Area accumulated by integration so far.
    ///
    /// The raw accumulator is intentionally never clamped against the total;
    /// only the normalized ratio is. Incremental drift can therefore push it
    /// transiently past [`Self::total_area`].
    #[must_use]
    pub const fn accumulated_area(&self) -> f64 {
        self.accumulated_area
    }

    /// Current position of the cursor within the curve's time domain.
    #[must_use]
    pub const fn normalized_time(&self) -> f64 {
        self.normalized_time
    }

    fn area_from_start(&self, upto: f64) -> f64 {
        segmented_area(
            &self.curve,
            0.0,
            upto,
            self.segment_width,
            self.time_span_secs,
        )
    }

    fn normalized_progress(&self) -> f64 {
        if self.total_area == 0.0 {
            return 0.0;
        }
        (self.accumulated_area / self.total_area).clamp(0.0, 1.0)
    }
}
