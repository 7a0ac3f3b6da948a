use super::{roster, ClockTime, LineUserId, MemberName, Team, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Attribution for an action someone performed on behalf of another member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub is_proxy: bool,
    pub proxy_by_name: MemberName,
    pub proxy_by_line_user_id: LineUserId,
    pub proxy_by_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeSlot {
    pub name: MemberName,
    pub team: Team,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_request: Option<ProxyRequest>,
}

impl OvertimeSlot {
    pub fn new(name: MemberName, team: Team) -> Self {
        Self {
            name,
            team,
            confirmed: false,
            proxy_request: None,
        }
    }

    pub fn with_proxy(mut self, proxy_request: Option<ProxyRequest>) -> Self {
        self.proxy_request = proxy_request;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FullDayOvertime {
    #[serde(rename = "full-shift", rename_all = "camelCase")]
    FullShift {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_day_member: Option<OvertimeSlot>,
    },
    #[serde(rename = "half-shift", rename_all = "camelCase")]
    HalfShift {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_half_member: Option<OvertimeSlot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_half_member: Option<OvertimeSlot>,
    },
}

impl FullDayOvertime {
    pub fn empty_half_shift() -> Self {
        FullDayOvertime::HalfShift {
            first_half_member: None,
            second_half_member: None,
        }
    }

    pub fn kind(&self) -> OvertimeKind {
        match self {
            FullDayOvertime::FullShift { .. } => OvertimeKind::FullShift,
            FullDayOvertime::HalfShift { .. } => OvertimeKind::HalfShift,
        }
    }
}

/// Overtime for a leave that only covers part of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOvertime {
    #[serde(flatten)]
    pub member: OvertimeSlot,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// Addresses a single slot of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotTarget {
    FullShift,
    FirstHalf,
    SecondHalf,
    Custom,
}

impl fmt::Display for SlotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SlotTarget::FullShift => "full shift",
                SlotTarget::FirstHalf => "first half",
                SlotTarget::SecondHalf => "second half",
                SlotTarget::Custom => "custom period",
            }
        )
    }
}

/// What an overtime opportunity covers, as shown to candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum OvertimeKind {
    FullShift,
    HalfShift,
    FirstHalf,
    SecondHalf,
    Custom {
        start_time: ClockTime,
        end_time: ClockTime,
    },
}

impl fmt::Display for OvertimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvertimeKind::FullShift => write!(f, "full shift"),
            OvertimeKind::HalfShift => write!(f, "half shift (first or second half)"),
            OvertimeKind::FirstHalf => write!(f, "half shift (first half)"),
            OvertimeKind::SecondHalf => write!(f, "half shift (second half)"),
            OvertimeKind::Custom {
                start_time,
                end_time,
            } => write!(f, "{start_time}-{end_time}"),
        }
    }
}

/// Upgrades a stored `fullDayOvertime` value to the tagged representation.
///
/// Older rows carry the overtime without a `type` tag, with the short tags
/// `full`/`half`, or with bare member names instead of slot objects. Member
/// teams missing from old slots are resolved from the roster on `date`.
pub fn normalize_full_day_overtime(
    value: Value,
    date: NaiveDate,
) -> Result<Option<FullDayOvertime>, ValidationError> {
    let mut object = match value {
        Value::Null => return Ok(None),
        Value::Object(object) => object,
        other => {
            return Err(ValidationError::new(format!(
                "Unrecognised overtime shape: {other}"
            )))
        }
    };

    let tag = match object.remove("type") {
        Some(Value::String(tag)) => Some(tag),
        None | Some(Value::Null) => None,
        Some(other) => {
            return Err(ValidationError::new(format!(
                "Unrecognised overtime type: {other}"
            )))
        }
    };

    let is_full_shift = match tag.as_deref() {
        Some("full-shift") | Some("full") => true,
        Some("half-shift") | Some("half") => false,
        Some(other) => {
            return Err(ValidationError::new(format!(
                "Unrecognised overtime type: {other}"
            )))
        }
        None => object.contains_key("fullDayMember"),
    };

    let mut take_slot = |key: &str| {
        normalize_slot(object.remove(key).unwrap_or(Value::Null), date)
    };

    if is_full_shift {
        Ok(Some(FullDayOvertime::FullShift {
            full_day_member: take_slot("fullDayMember")?,
        }))
    } else {
        Ok(Some(FullDayOvertime::HalfShift {
            first_half_member: take_slot("firstHalfMember")?,
            second_half_member: take_slot("secondHalfMember")?,
        }))
    }
}

fn normalize_slot(
    value: Value,
    date: NaiveDate,
) -> Result<Option<OvertimeSlot>, ValidationError> {
    let mut object = match value {
        Value::Null => return Ok(None),
        Value::String(name) if name.trim().is_empty() => return Ok(None),
        Value::String(name) => {
            let mut object = serde_json::Map::new();
            object.insert(String::from("name"), Value::String(name));
            object
        }
        Value::Object(object) => object,
        other => {
            return Err(ValidationError::new(format!(
                "Unrecognised overtime slot: {other}"
            )))
        }
    };

    if !object.contains_key("team") {
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let team = roster::team_of(name, date).ok_or_else(|| {
            ValidationError::new(format!(
                "Cannot resolve team for overtime member {name:?}"
            ))
        })?;
        object.insert(String::from("team"), Value::String(team.to_string()));
    }

    serde_json::from_value(Value::Object(object))
        .map(Some)
        .map_err(|e| ValidationError::new(format!("Invalid overtime slot: {e}")))
}
