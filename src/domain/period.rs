use super::ValidationError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref CLOCK_TIME: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$")
        .expect("Clock time regex is valid");
}

pub const FULL_DAY_SENTINEL: &str = "fullDay";
const FULL_DAY_ALIASES: [&str; 3] = [FULL_DAY_SENTINEL, "full-day", "全天"];

/// A 24-hour `HH:mm` wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(String);

impl ClockTime {
    pub fn parse(time: &str) -> Result<Self, ValidationError> {
        let time = time.trim();
        if CLOCK_TIME.is_match(time) {
            Ok(Self(time.to_owned()))
        } else {
            Err(ValidationError::new(format!(
                "Invalid time {time:?}, expected HH:mm"
            )))
        }
    }
}

impl AsRef<str> for ClockTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.0
    }
}

/// The part of the day a leave covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod", into = "RawPeriod")]
pub enum LeavePeriod {
    FullDay,
    Custom {
        start_time: ClockTime,
        end_time: ClockTime,
    },
}

impl LeavePeriod {
    pub fn custom(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start_time = ClockTime::parse(start)?;
        let end_time = ClockTime::parse(end)?;
        if start_time == end_time {
            return Err(ValidationError::new(String::from(
                "Start time and end time cannot be equal",
            )));
        }
        Ok(Self::Custom {
            start_time,
            end_time,
        })
    }

    pub fn is_full_day(&self) -> bool {
        matches!(self, LeavePeriod::FullDay)
    }
}

impl fmt::Display for LeavePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeavePeriod::FullDay => write!(f, "full day"),
            LeavePeriod::Custom {
                start_time,
                end_time,
            } => write!(f, "{start_time}-{end_time}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPeriod {
    Sentinel(String),
    Range {
        #[serde(rename = "startTime")]
        start_time: String,
        #[serde(rename = "endTime")]
        end_time: String,
    },
}

impl TryFrom<RawPeriod> for LeavePeriod {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        match raw {
            RawPeriod::Sentinel(value)
                if FULL_DAY_ALIASES.contains(&value.trim()) =>
            {
                Ok(LeavePeriod::FullDay)
            }
            RawPeriod::Sentinel(value) => Err(ValidationError::new(format!(
                "Invalid period {value:?}, expected \"{FULL_DAY_SENTINEL}\" or a time range"
            ))),
            RawPeriod::Range {
                start_time,
                end_time,
            } => LeavePeriod::custom(&start_time, &end_time),
        }
    }
}

impl From<LeavePeriod> for RawPeriod {
    fn from(period: LeavePeriod) -> Self {
        match period {
            LeavePeriod::FullDay => {
                RawPeriod::Sentinel(FULL_DAY_SENTINEL.to_owned())
            }
            LeavePeriod::Custom {
                start_time,
                end_time,
            } => RawPeriod::Range {
                start_time: start_time.into(),
                end_time: end_time.into(),
            },
        }
    }
}
