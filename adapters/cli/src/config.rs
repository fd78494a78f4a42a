//! Schedule configuration loading for the Surge CLI.
//!
//! A schedule file is a TOML document with a `[schedule]` table describing
//! pacing and a `[curve]` table describing the rate curve:
//!
//! ```toml
//! [schedule]
//! time_span_secs = 10.0
//! max_count = 50
//!
//! [curve]
//! interpolation = "smooth-step"
//! keyframes = [[0.0, 1.0], [1.0, 1.0]]
//! ```

use std::{fs, num::NonZeroU32, path::Path, time::Duration};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use surge_core::{Curve, Interpolation, Keyframe, UnitCount};
use surge_system_emission::{
    Config, IntegrationStrategy, ScheduleConfig, DEFAULT_SEGMENT_WIDTH,
};

/// Parsed representation of a schedule file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScheduleFile {
    /// Pacing parameters for the emission engine.
    pub schedule: ScheduleSection,
    /// Rate curve authored as keyframes.
    pub curve: CurveSection,
}

/// Pacing parameters from the `[schedule]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScheduleSection {
    /// Real-time seconds mapped onto one traversal of the curve's domain.
    pub time_span_secs: f64,
    /// Number of units corresponding to full progress.
    pub max_count: u32,
    /// Integration granularity in real-time units.
    #[serde(default = "default_segment_width")]
    pub segment_width: f64,
    /// Area accumulation strategy.
    #[serde(default)]
    pub strategy: StrategyChoice,
    /// Advancing steps between incremental resynchronizations.
    #[serde(default)]
    pub resync_interval: Option<u32>,
    /// Maximum units spawned in a single tick.
    #[serde(default)]
    pub burst_cap: Option<u32>,
}

fn default_segment_width() -> f64 {
    DEFAULT_SEGMENT_WIDTH
}

/// Area accumulation strategy named in a schedule file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum StrategyChoice {
    /// Integrate only the newly covered interval each step.
    #[default]
    Incremental,
    /// Recompute the covered area from the domain start each step.
    RecomputeFromStart,
}

/// Rate curve description from the `[curve]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CurveSection {
    /// Interpolation rule applied between adjacent keyframes.
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Keyframes as `[time, value]` pairs with strictly increasing times.
    pub keyframes: Vec<[f64; 2]>,
}

impl ScheduleFile {
    /// Reads and parses the schedule file at `path`.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read schedule file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("could not parse schedule file {}", path.display()))
    }

    /// Validates the file and converts it into an emission configuration.
    pub(crate) fn into_emission_config(self) -> anyhow::Result<Config> {
        let keyframes = self
            .curve
            .keyframes
            .iter()
            .map(|[time, value]| Keyframe::new(*time, *value))
            .collect();
        let curve =
            Curve::new(keyframes, self.curve.interpolation).context("invalid rate curve")?;

        anyhow::ensure!(
            self.schedule.time_span_secs.is_finite() && self.schedule.time_span_secs > 0.0,
            "time_span_secs must be positive, got {}",
            self.schedule.time_span_secs
        );
        let time_span = Duration::from_secs_f64(self.schedule.time_span_secs);

        let strategy = match self.schedule.strategy {
            StrategyChoice::Incremental => IntegrationStrategy::Incremental {
                resync_interval: self.schedule.resync_interval.and_then(NonZeroU32::new),
            },
            StrategyChoice::RecomputeFromStart => IntegrationStrategy::RecomputeFromStart,
        };

        let schedule =
            ScheduleConfig::new(curve, time_span, UnitCount::new(self.schedule.max_count))
                .with_segment_width(self.schedule.segment_width)
                .with_strategy(strategy);

        let mut config = Config::new(schedule);
        if let Some(cap) = self.schedule.burst_cap {
            let cap = NonZeroU32::new(cap).context("burst_cap must be positive")?;
            config = config.with_burst_cap(cap);
        }
        Ok(config)
    }
}
