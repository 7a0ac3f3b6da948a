use super::Team;
use chrono::{Datelike, NaiveDate, Weekday};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftType {
    DayEarly,
    DayMid,
    Night,
    ShortRest,
    LongRest,
}

impl ShiftType {
    pub fn is_rest(&self) -> bool {
        matches!(self, ShiftType::ShortRest | ShiftType::LongRest)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::DayEarly => "early day shift",
            ShiftType::DayMid => "mid day shift",
            ShiftType::Night => "night shift",
            ShiftType::ShortRest => "short rest",
            ShiftType::LongRest => "long rest",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One full rotation. Every team walks the same cycle, offset by its phase.
pub const SHIFT_CYCLE: [ShiftType; 8] = [
    ShiftType::LongRest,
    ShiftType::DayEarly,
    ShiftType::DayEarly,
    ShiftType::DayMid,
    ShiftType::DayMid,
    ShiftType::ShortRest,
    ShiftType::Night,
    ShiftType::Night,
];

/// Long-rest teams are never pulled in for overtime on this weekday.
pub const LONG_REST_EXCLUDED_WEEKDAY: Weekday = Weekday::Tue;

lazy_static! {
    static ref CYCLE_EPOCH: NaiveDate =
        NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid cycle epoch");
}

pub fn cycle_epoch() -> NaiveDate {
    *CYCLE_EPOCH
}

fn phase_offset(team: Team) -> i64 {
    match team {
        Team::A => 0,
        Team::B => 2,
        Team::C => 4,
        Team::D => 6,
    }
}

pub fn cycle_position(team: Team, date: NaiveDate) -> usize {
    let days_since_epoch = (date - cycle_epoch()).num_days();
    let n = SHIFT_CYCLE.len() as i64;
    let position = phase_offset(team) + days_since_epoch;
    (((position % n) + n) % n) as usize
}

/// The shift `team` works on `date`.
pub fn shift_for(team: Team, date: NaiveDate) -> ShiftType {
    SHIFT_CYCLE[cycle_position(team, date)]
}

/// Same as [`shift_for`] for an unparsed team code.
pub fn shift_for_code(
    team: &str,
    date: NaiveDate,
) -> Result<ShiftType, CalendarError> {
    let team = Team::from_str(team)
        .map_err(|_| CalendarError::InvalidTeam(team.to_owned()))?;
    Ok(shift_for(team, date))
}

/// Every team with its shift for `date`, in team order.
pub fn shifts_on(date: NaiveDate) -> Vec<(Team, ShiftType)> {
    Team::ALL
        .iter()
        .map(|team| (*team, shift_for(*team, date)))
        .collect()
}

pub fn team_on(date: NaiveDate, shift: ShiftType) -> Option<Team> {
    Team::ALL
        .into_iter()
        .find(|team| shift_for(*team, date) == shift)
}

pub fn is_long_rest_excluded_day(date: NaiveDate) -> bool {
    date.weekday() == LONG_REST_EXCLUDED_WEEKDAY
}

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("Invalid team: {0}")]
    InvalidTeam(String),
}
