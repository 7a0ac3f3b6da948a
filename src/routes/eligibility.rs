use axum::{http::StatusCode, Json};
use serde::Deserialize;

use crate::domain::{
    check_eligibility, Candidate, Eligibility, OpportunityRequest,
};

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub candidate: Candidate,
    pub request: OpportunityRequest,
}

#[tracing::instrument(name = "Check eligibility route handler", skip_all)]
pub async fn check_candidate(
    Json(body): Json<EligibilityRequest>,
) -> (StatusCode, Json<Eligibility>) {
    (
        StatusCode::OK,
        Json(check_eligibility(&body.candidate, &body.request)),
    )
}
