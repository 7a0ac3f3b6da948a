use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        LeaveAPIError, MemberName, ProfileStoreError, ValidationError,
    },
    services::{
        leave_lifecycle::{leave_store_error, profile_store_error},
        opportunities::{upcoming_opportunities, OpenOpportunity},
    },
    utils::constants::UPCOMING_OPPORTUNITY_DAYS,
    AppState,
};

const MAX_DAYS: i64 = 31;

#[derive(Deserialize)]
pub struct OpportunitiesQueryParams {
    name: String,
    days: Option<i64>,
}

#[tracing::instrument(name = "Get opportunities route handler", skip_all)]
pub async fn get_opportunities(
    State(state): State<AppState>,
    Query(query_params): Query<OpportunitiesQueryParams>,
) -> Result<(StatusCode, Json<OpportunitiesResponse>), LeaveAPIError> {
    let name = MemberName::parse(&query_params.name)?;
    let days = query_params.days.unwrap_or(UPCOMING_OPPORTUNITY_DAYS);
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(ValidationError::new(format!(
            "days must be between 1 and {MAX_DAYS}"
        ))
        .into());
    }

    let fallback = match state
        .profile_store
        .read()
        .await
        .get_profile_by_member_name(&name)
        .await
    {
        Ok(profile) => Some((profile.team, profile.role)),
        Err(ProfileStoreError::ProfileNotFound) => None,
        Err(e) => return Err(profile_store_error(e)),
    };

    let from = state.clock.today();
    let opportunities = upcoming_opportunities(
        &*state.leave_store.read().await,
        &name,
        fallback,
        from,
        days,
    )
    .await
    .map_err(leave_store_error)?;

    Ok((
        StatusCode::OK,
        Json(OpportunitiesResponse {
            name,
            from,
            days,
            opportunities,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct OpportunitiesResponse {
    pub name: MemberName,
    pub from: NaiveDate,
    pub days: i64,
    pub opportunities: Vec<OpenOpportunity>,
}
