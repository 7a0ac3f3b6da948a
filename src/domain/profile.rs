use super::{Candidate, LineUserId, MemberName, Role, Team};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Permanent binding between a LINE account and a roster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub line_user_id: LineUserId,
    pub display_name: String,
    pub team: Team,
    pub role: Role,
    pub member_name: MemberName,
    pub notification_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityStep {
    AwaitingName,
    AwaitingConfirmation,
    Completed,
}

/// Conversational progress of a LINE account towards a permanent profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySelectionState {
    pub line_user_id: LineUserId,
    pub step: IdentityStep,
    pub selected_name: Option<MemberName>,
    pub selected_team: Option<Team>,
    pub selected_role: Option<Role>,
    pub last_activity: DateTime<Utc>,
}

impl IdentitySelectionState {
    pub fn start(line_user_id: LineUserId, now: DateTime<Utc>) -> Self {
        Self {
            line_user_id,
            step: IdentityStep::AwaitingName,
            selected_name: None,
            selected_team: None,
            selected_role: None,
            last_activity: now,
        }
    }

    fn completed_selection(&self) -> Option<(MemberName, Team, Role)> {
        match (
            self.step,
            &self.selected_name,
            self.selected_team,
            self.selected_role,
        ) {
            (IdentityStep::Completed, Some(name), Some(team), Some(role)) => {
                Some((name.clone(), team, role))
            }
            _ => None,
        }
    }
}

/// Someone who can receive notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct AudienceMember {
    pub line_user_id: LineUserId,
    pub name: MemberName,
    pub team: Team,
    pub role: Role,
}

impl AudienceMember {
    pub fn as_candidate(&self) -> Candidate {
        Candidate {
            name: self.name.clone(),
            team: self.team,
            role: self.role,
        }
    }
}

impl From<&UserProfile> for AudienceMember {
    fn from(profile: &UserProfile) -> Self {
        Self {
            line_user_id: profile.line_user_id.clone(),
            name: profile.member_name.clone(),
            team: profile.team,
            role: profile.role,
        }
    }
}

/// Merges notification-enabled profiles with completed identity selections,
/// one entry per LINE account.
///
/// A permanent profile always wins over a selection state for the same
/// account. Selection states only contribute accounts that have finished
/// picking a name. Output is ordered by team, then name.
pub fn resolve_audience(
    profiles: &[UserProfile],
    selections: &[IdentitySelectionState],
) -> Vec<AudienceMember> {
    let mut audience: HashMap<&LineUserId, AudienceMember> = HashMap::new();

    for state in selections {
        if let Some((name, team, role)) = state.completed_selection() {
            audience.insert(
                &state.line_user_id,
                AudienceMember {
                    line_user_id: state.line_user_id.clone(),
                    name,
                    team,
                    role,
                },
            );
        }
    }

    // Accounts with a permanent profile follow the profile, including its
    // notification preference.
    for profile in profiles {
        if profile.notification_enabled {
            audience.insert(&profile.line_user_id, profile.into());
        } else {
            audience.remove(&profile.line_user_id);
        }
    }

    let mut audience: Vec<AudienceMember> = audience.into_values().collect();
    audience.sort_by(|a, b| {
        (a.team.code(), a.name.as_ref()).cmp(&(b.team.code(), b.name.as_ref()))
    });
    audience
}
