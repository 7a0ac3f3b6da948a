use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    domain::{LeaveAPIError, MemberName},
    services::leave_lifecycle::{delete_leave as delete, DeleteLeaveRequest},
    AppState,
};

#[tracing::instrument(name = "Delete leave route handler", skip_all)]
pub async fn delete_leave(
    State(state): State<AppState>,
    Query(request): Query<DeleteLeaveRequest>,
) -> Result<(StatusCode, Json<DeleteLeaveResponse>), LeaveAPIError> {
    let (record, report) = delete(&state, request).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteLeaveResponse {
            date: record.date,
            name: record.requester_name,
            success_count: report.success_count,
            failed_count: report.failed_count,
            excluded_count: report.excluded_count,
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLeaveResponse {
    pub date: NaiveDate,
    pub name: MemberName,
    pub success_count: usize,
    pub failed_count: usize,
    pub excluded_count: usize,
}
