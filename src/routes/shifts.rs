use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        roster::{roster_for, RosterEntry},
        shifts_on, LeaveAPIError, ShiftType, Team,
    },
    services::leave_lifecycle::parse_date,
    AppState,
};

#[derive(Deserialize)]
pub struct GetShiftsQueryParams {
    date: Option<String>,
}

#[tracing::instrument(name = "Get shifts route handler", skip_all)]
pub async fn get_shifts(
    State(state): State<AppState>,
    Query(query_params): Query<GetShiftsQueryParams>,
) -> Result<(StatusCode, Json<ShiftsResponse>), LeaveAPIError> {
    let date = match query_params.date {
        Some(date) => parse_date(&date)?,
        None => state.clock.today(),
    };
    let roster = roster_for(date);

    let teams = shifts_on(date)
        .into_iter()
        .map(|(team, shift)| TeamShift {
            team,
            shift,
            members: roster.members(team),
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(ShiftsResponse {
            date,
            roster_effective_from: roster.effective_from,
            teams,
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftsResponse {
    pub date: NaiveDate,
    pub roster_effective_from: NaiveDate,
    pub teams: Vec<TeamShift>,
}

#[derive(Debug, Serialize)]
pub struct TeamShift {
    pub team: Team,
    pub shift: ShiftType,
    pub members: &'static [RosterEntry],
}
