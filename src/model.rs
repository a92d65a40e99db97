// Core data structures shared by the selection wizard and the lap analyzer

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker the timing feed uses for a lap without a recorded time
pub const NOT_A_TIME: &str = "NaT";

/// A driver taking part in a session.
///
/// Two drivers are equal when they carry the same number, the rest of the record is
/// descriptive only.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Driver {
    /// Car number as published by the timing feed (e.g. "44")
    pub driver_number: String,
    pub first_name: String,
    pub last_name: String,
    pub team_name: String,
    /// Team color as a CSS hex string
    pub team_color: String,
    pub country_code: String,
    /// Three letter abbreviation (e.g. "HAM")
    pub abbreviation: String,
    pub headshot_url: String,
}

impl Driver {
    /// Numeric value of the car number, if it is one
    pub fn number(&self) -> Option<u32> {
        self.driver_number.trim().parse().ok()
    }

    /// Ordering key putting numeric car numbers first, ascending
    pub(crate) fn sort_key(&self) -> (bool, u32, String) {
        match self.number() {
            Some(number) => (false, number, self.driver_number.clone()),
            None => (true, 0, self.driver_number.clone()),
        }
    }
}

impl PartialEq for Driver {
    fn eq(&self, other: &Self) -> bool {
        self.driver_number == other.driver_number
    }
}

impl Eq for Driver {}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {}",
            self.driver_number, self.first_name, self.last_name
        )
    }
}

/// Time recorded for a single lap.
#[derive(Clone, Debug, PartialEq)]
pub enum LapTime {
    /// Lap time in seconds, always finite
    Seconds(f64),
    /// The feed explicitly marked the lap as having no valid time
    NotATime,
    /// A value that is neither a number nor the sentinel, kept verbatim
    Malformed(String),
}

impl LapTime {
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == NOT_A_TIME {
            return LapTime::NotATime;
        }
        match trimmed.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => LapTime::Seconds(seconds),
            _ => LapTime::Malformed(raw.to_string()),
        }
    }

    /// Numeric lap time, only for laps with a usable time
    pub fn seconds(&self) -> Option<f64> {
        match self {
            LapTime::Seconds(seconds) => Some(*seconds),
            _ => None,
        }
    }

    /// Laps without a usable time are treated as invalid laps for display purposes
    pub fn is_invalid(&self) -> bool {
        self.seconds().is_none()
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LapTime::Seconds(seconds) => write!(f, "{}", format_lap_time(*seconds)),
            LapTime::NotATime => write!(f, "{NOT_A_TIME}"),
            LapTime::Malformed(raw) => write!(f, "?{raw}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLapTime {
    Number(f64),
    Text(String),
    Null,
}

impl<'de> Deserialize<'de> for LapTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLapTime::deserialize(deserializer)? {
            RawLapTime::Number(seconds) if seconds.is_finite() => LapTime::Seconds(seconds),
            RawLapTime::Number(seconds) => LapTime::Malformed(seconds.to_string()),
            RawLapTime::Text(raw) => LapTime::from_raw(&raw),
            RawLapTime::Null => LapTime::NotATime,
        })
    }
}

impl Serialize for LapTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LapTime::Seconds(seconds) => serializer.serialize_str(&seconds.to_string()),
            LapTime::NotATime => serializer.serialize_str(NOT_A_TIME),
            LapTime::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

/// One lap of a driver in a session, as produced by the timing feed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapSample {
    /// Lap number, unique per driver and session, starting at 1
    pub lap_number: u32,
    pub lap_time: LapTime,
    #[serde(default)]
    pub compound: Option<String>,
    #[serde(default)]
    pub tyre_life: Option<f32>,
    #[serde(default)]
    pub deleted: bool,
}

/// A single telemetry sample of a lap, indexed by distance from the start line
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DistanceSample {
    /// Meters from the start/finish line
    pub distance: f64,
    /// Speed in km/h
    pub speed: f64,
    /// Throttle application, 0 to 100
    pub throttle: f64,
    pub brake: bool,
    pub x: f64,
    pub y: f64,
}

/// Per-distance telemetry for one lap. Passed through to the renderer as-is.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LapDetail {
    pub samples: Vec<DistanceSample>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TrackCorner {
    pub number: u32,
    pub x: f64,
    pub y: f64,
}

/// Track outline and corner positions of a session's venue
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TrackGeometry {
    pub track: Vec<TrackPoint>,
    pub corners: Vec<TrackCorner>,
}

/// Identifies a single session: season, venue and session type
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub year: i32,
    pub venue: String,
    pub session_type: String,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.year, self.venue, self.session_type)
    }
}

/// Format a lap time in seconds as `m:ss.mmm`
pub fn format_lap_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0. {
        return "-".to_string();
    }
    let total_ms = (seconds * 1000.).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{minutes}:{secs:02}.{millis:03}")
}
