use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::{
    check_eligibility, roster, Candidate, LeavePeriod, LeaveRecord,
    LeaveStore, LeaveStoreError, MemberName, OpportunityRequest, Role, Team,
};

/// An open overtime slot someone may take.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOpportunity {
    pub date: NaiveDate,
    pub requester_name: MemberName,
    pub requester_team: Team,
    pub period: LeavePeriod,
    pub overtime: String,
    pub reason: Option<String>,
}

/// Open slots from `today` through the following `days - 1` days that
/// `name` is eligible for.
///
/// Team and role come from the roster in force on each leave date, falling
/// back to `fallback` for members the roster does not list.
#[tracing::instrument(name = "Listing upcoming opportunities", skip_all)]
pub async fn upcoming_opportunities(
    leave_store: &(dyn LeaveStore + Send + Sync),
    name: &MemberName,
    fallback: Option<(Team, Role)>,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<OpenOpportunity>, LeaveStoreError> {
    let dates: Vec<NaiveDate> = (0..days.max(1))
        .map(|offset| today + Duration::days(offset))
        .collect();
    let records = leave_store.get_records_for_dates(&dates).await?;

    Ok(records
        .iter()
        .filter_map(|record| {
            let candidate = candidate_on(name, record.date, fallback)?;
            Some(open_for(&candidate, record))
        })
        .flatten()
        .collect())
}

fn candidate_on(
    name: &MemberName,
    date: NaiveDate,
    fallback: Option<(Team, Role)>,
) -> Option<Candidate> {
    let version = roster::roster_for(date);
    let (team, role) = match version.find(name.as_ref()) {
        Some((team, entry)) => (team, entry.role),
        None => fallback?,
    };
    Some(Candidate {
        name: name.clone(),
        team,
        role,
    })
}

fn open_for(
    candidate: &Candidate,
    record: &LeaveRecord,
) -> Vec<OpenOpportunity> {
    let request = OpportunityRequest {
        requester_name: record.requester_name.clone(),
        requester_team: record.requester_team,
        date: record.date,
    };
    let eligibility = check_eligibility(candidate, &request);
    if !eligibility.eligible {
        return Vec::new();
    }

    record
        .open_overtime()
        .into_iter()
        .map(|kind| OpenOpportunity {
            date: record.date,
            requester_name: record.requester_name.clone(),
            requester_team: record.requester_team,
            period: record.period.clone(),
            overtime: kind.to_string(),
            reason: eligibility.reason.clone(),
        })
        .collect()
}
