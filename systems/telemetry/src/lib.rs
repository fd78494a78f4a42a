#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic telemetry system that aggregates emission progress.
//!
//! Telemetry consumes world events for spawn totals and receives progress
//! snapshots through the [`ProgressObserver`] trait; the driving loop owns
//! both this system and the emission engine and pushes snapshots directly.

use std::fmt;

use surge_core::{Event, ProgressObserver, ProgressSnapshot, UnitCount};

/// Pure system that records spawn activity and progress readings.
#[derive(Debug, Default)]
pub struct Telemetry {
    ticks_observed: u64,
    total_spawned: UnitCount,
    peak_burst: UnitCount,
    last_snapshot: Option<ProgressSnapshot>,
}

impl Telemetry {
    /// Creates a telemetry system with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events to update spawn statistics.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => {
                    self.ticks_observed = self.ticks_observed.saturating_add(1);
                }
                Event::UnitsSpawned { count, total } => {
                    self.total_spawned = *total;
                    if count.get() > self.peak_burst.get() {
                        self.peak_burst = *count;
                    }
                }
            }
        }
    }

    /// Snapshot most recently delivered through [`ProgressObserver`], if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&ProgressSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Builds an aggregated report of the run observed so far.
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport {
            ticks_observed: self.ticks_observed,
            total_spawned: self.total_spawned,
            peak_burst: self.peak_burst,
            final_snapshot: self.last_snapshot,
        }
    }
}

impl ProgressObserver for Telemetry {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.last_snapshot = Some(*snapshot);
    }
}

/// Aggregated statistics describing an observed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    /// Number of ticks the telemetry system observed.
    pub ticks_observed: u64,
    /// Total units spawned across the run.
    pub total_spawned: UnitCount,
    /// Largest single-tick spawn batch.
    pub peak_burst: UnitCount,
    /// Last progress snapshot delivered before the report was built.
    pub final_snapshot: Option<ProgressSnapshot>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spawned {} units over {} ticks (peak burst {})",
            self.total_spawned.get(),
            self.ticks_observed,
            self.peak_burst.get(),
        )?;
        if let Some(snapshot) = &self.final_snapshot {
            write!(
                f,
                "; covered {:.1}% of the curve area in {:.2?}",
                snapshot.percent_area, snapshot.real_time_elapsed,
            )?;
        }
        Ok(())
    }
}
