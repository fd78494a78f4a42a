#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use surge_core::Interpolation;

use crate::config::{CurveSection, ScheduleFile, ScheduleSection, StrategyChoice};

const PRESET_DOMAIN: &str = "surge";
const PRESET_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded preset payload.
pub(crate) const PRESET_HEADER: &str = "surge:v1";
/// Delimiter used to separate the prefix, pacing summary and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a schedule into a single-line string suitable for sharing.
///
/// The pacing summary (`<max_count>x<time_span_secs>`) stays human readable;
/// the remaining schedule travels as a base64 JSON payload.
pub(crate) fn encode(file: &ScheduleFile) -> String {
    let payload = SerializablePreset {
        segment_width: file.schedule.segment_width,
        strategy: file.schedule.strategy,
        resync_interval: file.schedule.resync_interval,
        burst_cap: file.schedule.burst_cap,
        interpolation: file.curve.interpolation,
        keyframes: file.curve.keyframes.clone(),
    };
    let json = serde_json::to_vec(&payload).expect("schedule preset serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!(
        "{PRESET_HEADER}:{}x{}:{encoded}",
        file.schedule.max_count, file.schedule.time_span_secs
    )
}

/// Decodes a schedule from the provided preset string.
pub(crate) fn decode(value: &str) -> Result<ScheduleFile, PresetError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PresetError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(PresetError::MissingPrefix)?;
    let version = parts.next().ok_or(PresetError::MissingVersion)?;
    let pacing = parts.next().ok_or(PresetError::MissingPacing)?;
    let payload = parts.next().ok_or(PresetError::MissingPayload)?;

    if domain != PRESET_DOMAIN {
        return Err(PresetError::InvalidPrefix(domain.to_owned()));
    }
    if version != PRESET_VERSION {
        return Err(PresetError::UnsupportedVersion(version.to_owned()));
    }

    let (max_count, time_span_secs) = parse_pacing(pacing)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(PresetError::InvalidEncoding)?;
    let decoded: SerializablePreset =
        serde_json::from_slice(&bytes).map_err(PresetError::InvalidPayload)?;

    Ok(ScheduleFile {
        schedule: ScheduleSection {
            time_span_secs,
            max_count,
            segment_width: decoded.segment_width,
            strategy: decoded.strategy,
            resync_interval: decoded.resync_interval,
            burst_cap: decoded.burst_cap,
        },
        curve: CurveSection {
            interpolation: decoded.interpolation,
            keyframes: decoded.keyframes,
        },
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePreset {
    segment_width: f64,
    strategy: StrategyChoice,
    resync_interval: Option<u32>,
    burst_cap: Option<u32>,
    interpolation: Interpolation,
    keyframes: Vec<[f64; 2]>,
}

/// Errors that can occur while decoding preset strings.
#[derive(Debug)]
pub(crate) enum PresetError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded preset.
    MissingPrefix,
    /// The encoded preset did not contain a version segment.
    MissingVersion,
    /// The encoded preset did not include the pacing summary.
    MissingPacing,
    /// The encoded preset did not include the payload segment.
    MissingPayload,
    /// The encoded preset used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded preset used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The pacing summary could not be parsed from the encoded preset.
    InvalidPacing(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "preset string was empty"),
            Self::MissingPrefix => write!(f, "preset string is missing the prefix"),
            Self::MissingVersion => write!(f, "preset string is missing the version"),
            Self::MissingPacing => write!(f, "preset string is missing the pacing summary"),
            Self::MissingPayload => write!(f, "preset string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "preset prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "preset version '{version}' is not supported")
            }
            Self::InvalidPacing(pacing) => {
                write!(f, "could not parse pacing summary '{pacing}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode preset payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse preset payload: {error}")
            }
        }
    }
}

impl Error for PresetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_pacing(pacing: &str) -> Result<(u32, f64), PresetError> {
    let (count, span) = pacing
        .split_once(['x', 'X'])
        .ok_or_else(|| PresetError::InvalidPacing(pacing.to_owned()))?;

    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|_| PresetError::InvalidPacing(pacing.to_owned()))?;
    let span = span
        .trim()
        .parse::<f64>()
        .map_err(|_| PresetError::InvalidPacing(pacing.to_owned()))?;

    if !(span.is_finite() && span > 0.0) {
        return Err(PresetError::InvalidPacing(pacing.to_owned()));
    }

    Ok((count, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CurveSection, ScheduleFile, ScheduleSection, StrategyChoice};
    use surge_core::Interpolation;

    fn sample_schedule() -> ScheduleFile {
        ScheduleFile {
            schedule: ScheduleSection {
                time_span_secs: 10.0,
                max_count: 50,
                segment_width: 0.02,
                strategy: StrategyChoice::Incremental,
                resync_interval: Some(120),
                burst_cap: Some(6),
            },
            curve: CurveSection {
                interpolation: Interpolation::SmoothStep,
                keyframes: vec![[0.0, 0.0], [0.4, 2.0], [1.0, 0.5]],
            },
        }
    }

    #[test]
    fn round_trip_preserves_the_schedule() {
        let schedule = sample_schedule();
        let encoded = encode(&schedule);
        assert!(encoded.starts_with(&format!("{PRESET_HEADER}:50x10:")));

        let decoded = decode(&encoded).expect("preset decodes");
        assert_eq!(schedule, decoded);
    }

    #[test]
    fn rejects_a_foreign_prefix() {
        let encoded = encode(&sample_schedule()).replacen("surge", "maze", 1);
        assert!(matches!(
            decode(&encoded),
            Err(PresetError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn rejects_an_unsupported_version() {
        let encoded = encode(&sample_schedule()).replacen("v1", "v9", 1);
        assert!(matches!(
            decode(&encoded),
            Err(PresetError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn rejects_a_mangled_pacing_summary() {
        assert!(matches!(
            decode("surge:v1:fiftyxten:e30"),
            Err(PresetError::InvalidPacing(_))
        ));
    }

    #[test]
    fn rejects_an_empty_string() {
        assert!(matches!(decode("   "), Err(PresetError::EmptyPayload)));
    }
}
