use color_eyre::eyre::{eyre, Report};
use serde::Serialize;

use crate::{
    app_state::{
        AppState, IdentitySelectionStoreType, NotificationSenderType,
        ProfileStoreType,
    },
    domain::{
        check_eligibility, is_long_rest_excluded_day, resolve_audience,
        team_on, AudienceMember, LeavePeriod, LeaveEvent, LeaveRecord,
        LineUserId, MemberName, OpportunityRequest, OvertimeKind,
        OvertimeSlot, ProfileStoreError, ShiftType, SlotTarget, Team,
    },
};

/// Outcome of an opportunity broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub total_candidates: usize,
}

/// Outcome of a cancellation broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub excluded_count: usize,
}

/// Everything the notification passes for one event did.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_notified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<BroadcastReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<BroadcastReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationReport>,
}

impl DispatchReport {
    /// Folds the report of a later event into this one.
    pub fn merge(&mut self, other: DispatchReport) {
        self.proxy_notified = other.proxy_notified.or(self.proxy_notified);
        self.suggestion = other.suggestion.or(self.suggestion);
        self.opportunity = other.opportunity.or(self.opportunity);
        self.cancellation = other.cancellation.or(self.cancellation);
    }
}

/// Why a cancellation broadcast is going out.
#[derive(Debug, Clone, PartialEq)]
pub enum CancellationNotice {
    LeaveCancelled,
    SlotFilled {
        target: SlotTarget,
        by: MemberName,
    },
    OvertimeCleared,
}

/// Sends best-effort notifications about leave records. Nothing here returns
/// an error: failed sends are logged and counted.
pub struct NotificationFanout {
    profile_store: ProfileStoreType,
    identity_selection_store: IdentitySelectionStoreType,
    notification_sender: NotificationSenderType,
}

impl From<&AppState> for NotificationFanout {
    fn from(state: &AppState) -> Self {
        Self {
            profile_store: state.profile_store.clone(),
            identity_selection_store: state.identity_selection_store.clone(),
            notification_sender: state.notification_sender.clone(),
        }
    }
}

impl NotificationFanout {
    #[tracing::instrument(name = "Dispatching leave event", skip_all)]
    pub async fn dispatch(&self, event: LeaveEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        tracing::debug!(
            date = %event.record().date,
            requester = %event.record().requester_name,
            "dispatching leave event"
        );

        match event {
            LeaveEvent::LeaveCreated(record) => {
                if let Some(proxy) =
                    record.proxy_request.as_ref().filter(|p| p.is_proxy)
                {
                    let text = format!(
                        "{} filed a {} leave for you on {}.",
                        proxy.proxy_by_name, record.period, record.date
                    );
                    report.proxy_notified = Some(
                        self.notify_member(&record.requester_name, &text).await,
                    );
                }

                report.suggestion = Some(self.suggest_team(&record).await);

                let kind = offered_overtime(&record);
                report.opportunity = Some(
                    self.broadcast_opportunity(
                        &opportunity_request(&record),
                        &kind,
                        &record.period,
                    )
                    .await,
                );
            }
            LeaveEvent::OvertimeAssigned {
                record,
                target,
                slot,
            } => {
                if let Some(proxy) =
                    slot.proxy_request.as_ref().filter(|p| p.is_proxy)
                {
                    let text = format!(
                        "{} signed you up for the {} overtime covering {} (Team {}) on {}.",
                        proxy.proxy_by_name,
                        target,
                        record.requester_name,
                        record.requester_team,
                        record.date
                    );
                    report.proxy_notified =
                        Some(self.notify_member(&slot.name, &text).await);
                }
            }
            LeaveEvent::OvertimeConfirmed {
                record,
                target,
                slot,
            } => {
                let notice = CancellationNotice::SlotFilled {
                    target,
                    by: slot.name.clone(),
                };
                report.cancellation = Some(
                    self.broadcast_cancellation(
                        &record,
                        &notice,
                        &[slot.name],
                    )
                    .await,
                );
            }
            LeaveEvent::OvertimeCleared { record, removed } => {
                log_removed(&record, &removed);
                report.cancellation = Some(
                    self.broadcast_cancellation(
                        &record,
                        &CancellationNotice::OvertimeCleared,
                        &[record.requester_name.clone()],
                    )
                    .await,
                );
            }
            LeaveEvent::LeaveCancelled {
                record,
                cancelled_by,
            } => {
                if let Some(proxy) = cancelled_by.filter(|p| p.is_proxy) {
                    let text = format!(
                        "{} cancelled your {} leave on {}.",
                        proxy.proxy_by_name, record.period, record.date
                    );
                    report.proxy_notified = Some(
                        self.notify_member(&record.requester_name, &text).await,
                    );
                }
                report.cancellation = Some(
                    self.broadcast_cancellation(
                        &record,
                        &CancellationNotice::LeaveCancelled,
                        &[record.requester_name.clone()],
                    )
                    .await,
                );
            }
        }

        report
    }

    /// Everyone who can currently be notified, one entry per LINE account.
    pub async fn audience(&self) -> Result<Vec<AudienceMember>, Report> {
        let profiles = self
            .profile_store
            .read()
            .await
            .get_profiles(false)
            .await
            .map_err(|e| eyre!(e))?;
        let selections = self
            .identity_selection_store
            .read()
            .await
            .get_completed_states()
            .await
            .map_err(|e| eyre!(e))?;
        Ok(resolve_audience(&profiles, &selections))
    }

    /// Offers `kind` to every audience member the eligibility rules allow.
    #[tracing::instrument(name = "Broadcasting overtime opportunity", skip_all)]
    pub async fn broadcast_opportunity(
        &self,
        request: &OpportunityRequest,
        kind: &OvertimeKind,
        period: &LeavePeriod,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for candidate in self.audience_or_empty().await {
            let eligibility =
                check_eligibility(&candidate.as_candidate(), request);
            if !eligibility.eligible {
                continue;
            }
            report.total_candidates += 1;

            let text = format!(
                "Overtime opportunity\n{} (Team {}) is on leave on {} ({}).\nNeeded: {}\nSuggested team: Team {}\n{}",
                request.requester_name,
                request.requester_team,
                request.date,
                period,
                kind,
                candidate.team,
                eligibility.reason.unwrap_or_default()
            );
            if self.deliver(&candidate.line_user_id, &text).await {
                report.success_count += 1;
            } else {
                report.failed_count += 1;
            }
        }

        tracing::info!(
            success = report.success_count,
            failed = report.failed_count,
            total = report.total_candidates,
            "opportunity broadcast finished"
        );
        report
    }

    /// Tells everyone not named in `exclude_names` that an opportunity is
    /// gone. Exclusion is applied before anything else and no eligibility
    /// filter is used.
    #[tracing::instrument(name = "Broadcasting cancellation", skip_all)]
    pub async fn broadcast_cancellation(
        &self,
        record: &LeaveRecord,
        notice: &CancellationNotice,
        exclude_names: &[MemberName],
    ) -> CancellationReport {
        let mut report = CancellationReport::default();
        let text = cancellation_text(record, notice);

        for candidate in self.audience_or_empty().await {
            if exclude_names.contains(&candidate.name) {
                report.excluded_count += 1;
                continue;
            }
            if self.deliver(&candidate.line_user_id, &text).await {
                report.success_count += 1;
            } else {
                report.failed_count += 1;
            }
        }

        tracing::info!(
            success = report.success_count,
            failed = report.failed_count,
            excluded = report.excluded_count,
            "cancellation broadcast finished"
        );
        report
    }

    /// Team-level hint to the crew that should normally pick up the leave:
    /// the long-rest team, or the short-rest team when long rest is off
    /// limits that day.
    #[tracing::instrument(name = "Sending team suggestion", skip_all)]
    pub async fn suggest_team(&self, record: &LeaveRecord) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        let team = match suggested_team(record) {
            Some(team) => team,
            None => return report,
        };

        let profiles =
            match self.profile_store.read().await.get_profiles(true).await {
                Ok(profiles) => profiles,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "could not load profiles for team suggestion"
                    );
                    return report;
                }
            };

        let text = format!(
            "Team {} is the suggested team to cover {} (Team {}) on {} ({}). Reply \"overtime\" to see open slots.",
            team,
            record.requester_name,
            record.requester_team,
            record.date,
            record.period
        );

        for profile in profiles.iter().filter(|p| {
            p.team == team && p.member_name != record.requester_name
        }) {
            report.total_candidates += 1;
            if self.deliver(&profile.line_user_id, &text).await {
                report.success_count += 1;
            } else {
                report.failed_count += 1;
            }
        }
        report
    }

    /// Sends `text` straight to the account bound to `name`. Returns whether
    /// the message went out.
    #[tracing::instrument(name = "Notifying member directly", skip_all)]
    pub async fn notify_member(&self, name: &MemberName, text: &str) -> bool {
        let profile = match self
            .profile_store
            .read()
            .await
            .get_profile_by_member_name(name)
            .await
        {
            Ok(profile) => profile,
            Err(ProfileStoreError::ProfileNotFound) => {
                tracing::info!(member = %name, "no LINE account bound, skipping direct notice");
                return false;
            }
            Err(e) => {
                tracing::warn!(member = %name, error = %e, "could not look up profile");
                return false;
            }
        };

        self.deliver(&profile.line_user_id, text).await
    }

    async fn audience_or_empty(&self) -> Vec<AudienceMember> {
        self.audience().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not resolve notification audience");
            Vec::new()
        })
    }

    async fn deliver(&self, to: &LineUserId, text: &str) -> bool {
        match self.notification_sender.send(to, text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    to = %to,
                    error = ?e,
                    "notification delivery failed"
                );
                false
            }
        }
    }
}

pub fn opportunity_request(record: &LeaveRecord) -> OpportunityRequest {
    OpportunityRequest {
        requester_name: record.requester_name.clone(),
        requester_team: record.requester_team,
        date: record.date,
    }
}

/// What a new record asks candidates to cover. A custom-period leave with
/// no overtime still advertises its own hours.
pub fn offered_overtime(record: &LeaveRecord) -> OvertimeKind {
    match (record.opportunity(), &record.period) {
        (Some(kind), _) => kind,
        (
            None,
            LeavePeriod::Custom {
                start_time,
                end_time,
            },
        ) => OvertimeKind::Custom {
            start_time: start_time.clone(),
            end_time: end_time.clone(),
        },
        (None, LeavePeriod::FullDay) => OvertimeKind::FullShift,
    }
}

pub fn suggested_team(record: &LeaveRecord) -> Option<Team> {
    let long_rest = team_on(record.date, ShiftType::LongRest)
        .filter(|_| !is_long_rest_excluded_day(record.date));
    long_rest
        .or_else(|| team_on(record.date, ShiftType::ShortRest))
        .filter(|team| *team != record.requester_team)
}

fn cancellation_text(
    record: &LeaveRecord,
    notice: &CancellationNotice,
) -> String {
    match notice {
        CancellationNotice::LeaveCancelled => format!(
            "Leave cancelled\n{} (Team {}) is no longer on leave on {} ({}). Any overtime for it is no longer needed.",
            record.requester_name,
            record.requester_team,
            record.date,
            record.period
        ),
        CancellationNotice::SlotFilled { target, by } => format!(
            "Overtime filled\nThe {} overtime covering {} (Team {}) on {} has been confirmed by {}.",
            target,
            record.requester_name,
            record.requester_team,
            record.date,
            by
        ),
        CancellationNotice::OvertimeCleared => format!(
            "Overtime withdrawn\nOvertime is no longer required for the leave of {} (Team {}) on {}.",
            record.requester_name, record.requester_team, record.date
        ),
    }
}

fn log_removed(record: &LeaveRecord, removed: &[OvertimeSlot]) {
    for slot in removed {
        tracing::info!(
            date = %record.date,
            requester = %record.requester_name,
            member = %slot.name,
            "overtime assignment removed"
        );
    }
}
