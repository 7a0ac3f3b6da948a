use axum::{extract::State, http::StatusCode, Json};

use super::LeaveResponse;
use crate::{
    domain::LeaveAPIError,
    services::leave_lifecycle::{update_leave as update, UpdateLeaveRequest},
    AppState,
};

#[tracing::instrument(name = "Update leave route handler", skip_all)]
pub async fn update_leave(
    State(state): State<AppState>,
    Json(request): Json<UpdateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveResponse>), LeaveAPIError> {
    let (record, notifications) = update(&state, request).await?;

    Ok((
        StatusCode::OK,
        Json(LeaveResponse {
            record,
            notifications,
        }),
    ))
}
