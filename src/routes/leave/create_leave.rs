use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
    domain::{LeaveAPIError, LeaveRecord},
    services::{
        leave_lifecycle::{create_leave as create, CreateLeaveRequest},
        notification_fanout::DispatchReport,
    },
    AppState,
};

#[tracing::instrument(name = "Create leave route handler", skip_all)]
pub async fn create_leave(
    State(state): State<AppState>,
    Json(request): Json<CreateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveResponse>), LeaveAPIError> {
    let (record, notifications) = create(&state, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(LeaveResponse {
            record,
            notifications,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub record: LeaveRecord,
    pub notifications: DispatchReport,
}
