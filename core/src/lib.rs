#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Surge spawn engine.
//!
//! This crate defines the message surface that connects the driving loop,
//! the authoritative world, and pure systems. The loop submits [`Command`]
//! values describing desired mutations, the world executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to deterministically. It also hosts the rate-curve data
//! model consumed by the emission system and the [`ProgressSnapshot`] value
//! pushed to observers each step.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the world record a batch of freshly spawned units.
    SpawnUnits {
        /// Number of units to bring into existence this tick.
        count: UnitCount,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a batch of units entered the world.
    UnitsSpawned {
        /// Number of units spawned by the processed command.
        count: UnitCount,
        /// Total units spawned since the world was created.
        total: UnitCount,
    },
}

/// Unique identifier assigned to a spawned unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Count of units, used for spawn targets and emission batches.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitCount(u32);

impl UnitCount {
    /// Count of zero units.
    pub const ZERO: Self = Self(0);

    /// Creates a new unit count with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the count is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two counts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other` from `self`, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

/// Single authored point of a rate curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    time: f64,
    value: f64,
}

impl Keyframe {
    /// Creates a new keyframe at the provided time with the provided value.
    #[must_use]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    /// Position of the keyframe on the curve's time axis.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Instantaneous rate value stored at the keyframe.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

/// Interpolation rule applied between adjacent keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Holds the left keyframe's value until the next keyframe.
    Hold,
    /// Straight-line blend between the two keyframe values.
    Linear,
    /// Hermite smooth ease `3t² − 2t³` between the two keyframe values.
    #[default]
    SmoothStep,
}

impl Interpolation {
    /// Maps a phase in `[0, 1]` to the blend factor between two keyframes.
    ///
    /// The phase is clamped before the rule is applied, so callers may pass
    /// slightly out-of-range values produced by floating-point division.
    #[must_use]
    pub fn blend(self, phase: f64) -> f64 {
        let phase = phase.clamp(0.0, 1.0);
        match self {
            Self::Hold => 0.0,
            Self::Linear => phase,
            Self::SmoothStep => phase * phase * (3.0 - 2.0 * phase),
        }
    }
}

/// Immutable rate curve defined by ordered keyframes and an interpolation rule.
///
/// Keyframe times are strictly increasing; values carry no monotonicity or
/// sign requirement. Negative values produce signed areas when integrated,
/// which downstream normalization clamps rather than rejects.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    keyframes: Vec<Keyframe>,
    interpolation: Interpolation,
}

impl Curve {
    /// Creates a curve from the provided keyframes and interpolation rule.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::Empty`] when no keyframes are provided,
    /// [`CurveError::NonFiniteKeyframe`] when a keyframe carries a NaN or
    /// infinite component, and [`CurveError::NonMonotonicTime`] when keyframe
    /// times fail to strictly increase.
    pub fn new(keyframes: Vec<Keyframe>, interpolation: Interpolation) -> Result<Self, CurveError> {
        if keyframes.is_empty() {
            return Err(CurveError::Empty);
        }

        for (index, keyframe) in keyframes.iter().enumerate() {
            if !keyframe.time().is_finite() || !keyframe.value().is_finite() {
                return Err(CurveError::NonFiniteKeyframe { index });
            }
        }

        for index in 1..keyframes.len() {
            if keyframes[index].time() <= keyframes[index - 1].time() {
                return Err(CurveError::NonMonotonicTime { index });
            }
        }

        Ok(Self {
            keyframes,
            interpolation,
        })
    }

    /// Returns the interpolated value at `t`.
    ///
    /// Times outside the keyframe range are clamped to the boundary
    /// keyframe's value, matching the domain integrators ever query.
    #[must_use]
    pub fn sample(&self, t: f64) -> f64 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if t <= first.time() {
            return first.value();
        }
        if t >= last.time() {
            return last.value();
        }

        let index = self
            .keyframes
            .partition_point(|keyframe| keyframe.time() <= t);
        let left = self.keyframes[index - 1];
        let right = self.keyframes[index];
        let span = right.time() - left.time();
        if span <= 0.0 {
            return right.value();
        }

        let phase = (t - left.time()) / span;
        left.value() + (right.value() - left.value()) * self.interpolation.blend(phase)
    }

    /// Time of the first keyframe, the lower bound of the curve's domain.
    #[must_use]
    pub fn domain_start(&self) -> f64 {
        self.keyframes.first().map_or(0.0, Keyframe::time)
    }

    /// Time of the last keyframe, the upper bound of the curve's domain.
    #[must_use]
    pub fn domain_end(&self) -> f64 {
        self.keyframes.last().map_or(0.0, Keyframe::time)
    }

    /// Ordered keyframes composing the curve.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Interpolation rule applied between adjacent keyframes.
    #[must_use]
    pub const fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

/// Reasons curve construction may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    /// The curve was constructed without any keyframes.
    #[error("curve requires at least one keyframe")]
    Empty,
    /// A keyframe carried a NaN or infinite time or value.
    #[error("keyframe {index} has a non-finite time or value")]
    NonFiniteKeyframe {
        /// Position of the offending keyframe in the provided sequence.
        index: usize,
    },
    /// Keyframe times failed to strictly increase.
    #[error("keyframe {index} does not strictly increase in time")]
    NonMonotonicTime {
        /// Position of the offending keyframe in the provided sequence.
        index: usize,
    },
}

/// Progress readings produced by the emission tracker each advancing step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Share of the curve's total area covered so far, in percent.
    pub percent_area: f64,
    /// Share of the curve's time domain covered so far, in percent.
    pub percent_time: f64,
    /// Real time accumulated across all advancing steps.
    pub real_time_elapsed: Duration,
}

impl ProgressSnapshot {
    /// Snapshot taken before any time has advanced.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            percent_area: 0.0,
            percent_time: 0.0,
            real_time_elapsed: Duration::ZERO,
        }
    }
}

/// Receiver for per-step progress snapshots.
///
/// The emission engine never broadcasts; the driving loop owns both the
/// tracker and its observers and pushes each snapshot to every registered
/// observer itself.
pub trait ProgressObserver {
    /// Delivers the snapshot produced by the most recent advancing step.
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);
}
