#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic emission system that paces spawning along a rate curve.
//!
//! The system consumes [`Event::TimeAdvanced`] broadcasts, advances its
//! [`SpawnTracker`], and emits a [`Command::SpawnUnits`] batch whenever the
//! tracked target count runs ahead of the units emitted so far.

pub mod integrate;
mod tracker;

use std::num::NonZeroU32;
use std::time::Duration;

use surge_core::{Command, Event, ProgressSnapshot, UnitCount};

pub use tracker::{
    IntegrationStrategy, ScheduleConfig, ScheduleError, SpawnTracker, StepOutcome,
    DEFAULT_SEGMENT_WIDTH,
};

/// Configuration parameters required to construct the emission system.
#[derive(Clone, Debug)]
pub struct Config {
    schedule: ScheduleConfig,
    burst_cap: Option<NonZeroU32>,
}

impl Config {
    /// Creates a new configuration around the provided spawn schedule.
    #[must_use]
    pub fn new(schedule: ScheduleConfig) -> Self {
        Self {
            schedule,
            burst_cap: None,
        }
    }

    /// Limits how many units a single tick may emit.
    ///
    /// The emitted count then lags behind the target and catches up on later
    /// ticks; it never exceeds the target.
    #[must_use]
    pub fn with_burst_cap(mut self, burst_cap: NonZeroU32) -> Self {
        self.burst_cap = Some(burst_cap);
        self
    }
}

/// Pure system that converts elapsed time into spawn commands.
#[derive(Clone, Debug)]
pub struct Emission {
    tracker: SpawnTracker,
    emitted: UnitCount,
    burst_cap: Option<NonZeroU32>,
}

impl Emission {
    /// Creates a new emission system using the supplied configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`ScheduleError`] from tracker construction.
    pub fn new(config: Config) -> Result<Self, ScheduleError> {
        Ok(Self {
            tracker: SpawnTracker::new(config.schedule)?,
            emitted: UnitCount::ZERO,
            burst_cap: config.burst_cap,
        })
    }

    /// Consumes events to advance the tracker and emit spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        let outcome = self.tracker.step(accumulated);
        let mut deficit = outcome.target.saturating_sub(self.emitted);
        if let Some(cap) = self.burst_cap {
            deficit = UnitCount::new(deficit.get().min(cap.get()));
        }

        if deficit.is_zero() {
            return;
        }

        self.emitted = self.emitted.saturating_add(deficit);
        out.push(Command::SpawnUnits { count: deficit });
    }

    /// Snapshot produced by the most recent advancing step.
    #[must_use]
    pub const fn last_snapshot(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    /// Target count computed by the most recent advancing step.
    #[must_use]
    pub const fn target(&self) -> UnitCount {
        self.tracker.target()
    }

    /// Units emitted across all processed ticks.
    #[must_use]
    pub const fn emitted(&self) -> UnitCount {
        self.emitted
    }

    /// Reports whether the schedule finished and all emissions caught up.
    ///
    /// A burst cap can leave emission lagging after the tracker completes;
    /// further ticks drain the remainder.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete() && self.emitted == self.tracker.target()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use surge_core::{Command, Curve, Event, Interpolation, Keyframe, UnitCount};

    use super::{Config, Emission, ScheduleConfig};

    fn constant_schedule() -> ScheduleConfig {
        let keyframes = vec![Keyframe::new(0.0, 1.0), Keyframe::new(1.0, 1.0)];
        let curve = Curve::new(keyframes, Interpolation::Linear).expect("valid curve");
        ScheduleConfig::new(curve, Duration::from_secs(10), UnitCount::new(50))
    }

    #[test]
    fn emits_the_deficit_for_an_advancing_tick() {
        let mut emission = Emission::new(Config::new(constant_schedule())).expect("valid config");
        let mut commands = Vec::new();
        emission.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(5),
            }],
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::SpawnUnits {
                count: UnitCount::new(25),
            }]
        );
        assert_eq!(emission.emitted(), UnitCount::new(25));
    }

    #[test]
    fn ignores_event_batches_without_time_advances() {
        let mut emission = Emission::new(Config::new(constant_schedule())).expect("valid config");
        let mut commands = Vec::new();
        emission.handle(
            &[Event::UnitsSpawned {
                count: UnitCount::new(3),
                total: UnitCount::new(3),
            }],
            &mut commands,
        );

        assert!(commands.is_empty());
        assert_eq!(emission.emitted(), UnitCount::ZERO);
    }

    #[test]
    fn burst_cap_drains_the_backlog_across_ticks() {
        let cap = NonZeroU32::new(10).expect("non-zero cap");
        let config = Config::new(constant_schedule()).with_burst_cap(cap);
        let mut emission = Emission::new(config).expect("valid config");

        let mut commands = Vec::new();
        emission.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
            }],
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::SpawnUnits {
                count: UnitCount::new(10),
            }]
        );
        assert!(!emission.is_complete());

        let mut drained = 10;
        while drained < 50 {
            let mut batch = Vec::new();
            emission.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_millis(1),
                }],
                &mut batch,
            );
            match batch.as_slice() {
                [Command::SpawnUnits { count }] => drained += count.get(),
                other => panic!("expected one spawn batch, got {other:?}"),
            }
            assert!(emission.emitted().get() <= emission.target().get());
        }

        assert_eq!(emission.emitted(), UnitCount::new(50));
        assert!(emission.is_complete());
    }

    #[test]
    fn emitted_count_never_exceeds_the_target() {
        let mut emission = Emission::new(Config::new(constant_schedule())).expect("valid config");
        for _ in 0..300 {
            let mut commands = Vec::new();
            emission.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_millis(47),
                }],
                &mut commands,
            );
            assert!(emission.emitted().get() <= emission.target().get());
        }
        assert!(emission.is_complete());
        assert_eq!(emission.emitted(), UnitCount::new(50));
    }
}
