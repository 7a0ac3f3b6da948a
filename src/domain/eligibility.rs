use super::{
    is_long_rest_excluded_day, shift_for, MemberName, Role, ShiftType, Team,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: MemberName,
    pub team: Team,
    pub role: Role,
}

/// The leave that created an overtime opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRequest {
    pub requester_name: MemberName,
    pub requester_team: Team,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Eligibility {
    fn eligible(reason: String) -> Self {
        Self {
            eligible: true,
            reason: Some(reason),
        }
    }

    fn not_eligible(reason: String) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Decides whether `candidate` may be offered the overtime created by
/// `request`. Rules are checked in order and the first match wins; the
/// reason text is shown to the candidate as-is.
pub fn check_eligibility(
    candidate: &Candidate,
    request: &OpportunityRequest,
) -> Eligibility {
    if candidate.name == request.requester_name {
        return Eligibility::not_eligible(String::from(
            "You cannot cover overtime for your own leave",
        ));
    }

    if candidate.team == request.requester_team {
        return Eligibility::not_eligible(format!(
            "Team {} is the requester's own team",
            candidate.team
        ));
    }

    let shift = shift_for(candidate.team, request.date);

    if shift == ShiftType::LongRest {
        if is_long_rest_excluded_day(request.date) {
            return Eligibility::not_eligible(format!(
                "Team {} is on long rest and cannot take overtime on a Tuesday",
                candidate.team
            ));
        }
        return Eligibility::eligible(format!(
            "Team {} is on long rest and is the priority team to cover Team {}",
            candidate.team, request.requester_team
        ));
    }

    if shift == ShiftType::ShortRest {
        return Eligibility::eligible(format!(
            "Team {} is on short rest and can cover Team {}",
            candidate.team, request.requester_team
        ));
    }

    if candidate.role == Role::Leader {
        return Eligibility::eligible(format!(
            "Team {} leader may always volunteer to cover Team {}",
            candidate.team, request.requester_team
        ));
    }

    // Every remaining shift is a working shift; the pool is deliberately broad.
    match shift {
        ShiftType::DayEarly | ShiftType::DayMid | ShiftType::Night => {
            Eligibility::eligible(format!(
                "Team {} is on the {} and can back up Team {}",
                candidate.team, shift, request.requester_team
            ))
        }
        ShiftType::ShortRest | ShiftType::LongRest => {
            Eligibility::not_eligible(format!(
                "Team {} is not available on {}",
                candidate.team, request.date
            ))
        }
    }
}
