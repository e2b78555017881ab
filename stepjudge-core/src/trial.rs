use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction the participant believes the motor moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("confidence must be between 1 and 7, got {0}")]
pub struct ConfidenceOutOfRange(pub u8);

/// Confidence rating on the 1-7 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// All valid ratings in ascending order
    pub fn scale() -> impl Iterator<Item = Confidence> {
        (Self::MIN..=Self::MAX).map(Confidence)
    }
}

impl TryFrom<u8> for Confidence {
    type Error = ConfidenceOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ConfidenceOutOfRange(value))
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> u8 {
        c.0
    }
}

/// One trial: the last movement start, the direction guess and its rating.
///
/// Column names follow the files the analysis scripts already read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub guessed_direction: Option<Direction>,
    pub confidence: Option<Confidence>,
    #[serde(rename = "startTime", with = "epoch_seconds")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime", with = "epoch_seconds")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TrialRecord {
    pub const COLUMNS: [&'static str; 4] = ["guessed_direction", "confidence", "startTime", "endTime"];

    pub fn is_complete(&self) -> bool {
        self.guessed_direction.is_some() && self.confidence.is_some()
    }

    /// Time from the last movement start to the direction choice
    pub fn response_time(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }

    /// Cell values in `COLUMNS` order; unset fields are empty
    pub fn cells(&self) -> [String; 4] {
        [
            self.guessed_direction
                .map(|d| d.as_str().to_string())
                .unwrap_or_default(),
            self.confidence
                .map(|c| c.value().to_string())
                .unwrap_or_default(),
            self.start_time.map(format_epoch).unwrap_or_default(),
            self.end_time.map(format_epoch).unwrap_or_default(),
        ]
    }
}

/// UNIX seconds with microsecond precision, e.g. `1697712345.123456`
pub fn format_epoch(ts: DateTime<Utc>) -> String {
    let micros = ts.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let magnitude = micros.unsigned_abs();
    format!("{sign}{}.{:06}", magnitude / 1_000_000, magnitude % 1_000_000)
}

mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_f64(ts.timestamp_micros() as f64 / 1e6),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        Ok(secs.and_then(|s| DateTime::from_timestamp_micros((s * 1e6).round() as i64)))
    }
}
