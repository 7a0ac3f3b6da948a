use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{LeaveAPIError, LeaveRecord, ValidationError},
    services::leave_lifecycle::{leave_store_error, parse_date},
    AppState,
};

#[derive(Deserialize)]
pub struct GetLeaveQueryParams {
    date: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[tracing::instrument(name = "Get leave route handler", skip_all)]
pub async fn get_leave(
    State(state): State<AppState>,
    Query(query_params): Query<GetLeaveQueryParams>,
) -> Result<(StatusCode, Json<GetLeaveResponse>), LeaveAPIError> {
    let leave_store = state.leave_store.read().await;
    let records = match query_params {
        GetLeaveQueryParams {
            date: Some(date), ..
        } => leave_store.get_records_by_date(parse_date(&date)?).await,
        GetLeaveQueryParams {
            from: Some(from),
            to: Some(to),
            ..
        } => {
            let (from, to) = (parse_date(&from)?, parse_date(&to)?);
            if from > to {
                return Err(ValidationError::new(String::from(
                    "from must not be after to",
                ))
                .into());
            }
            leave_store.get_records_in_range(from, to).await
        }
        _ => {
            return Err(ValidationError::new(String::from(
                "Either date or from and to are required",
            ))
            .into())
        }
    }
    .map_err(leave_store_error)?;

    Ok((StatusCode::OK, Json(GetLeaveResponse { records })))
}

#[derive(Debug, Serialize)]
pub struct GetLeaveResponse {
    pub records: Vec<LeaveRecord>,
}
