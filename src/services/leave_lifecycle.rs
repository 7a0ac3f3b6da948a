use chrono::NaiveDate;
use color_eyre::eyre::eyre;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::notification_fanout::{
    CancellationReport, DispatchReport, NotificationFanout,
};
use crate::{
    app_state::AppState,
    domain::{
        normalize_full_day_overtime, roster, AuthorizationError, ClockTime,
        ConfirmOutcome, IdentitySelectionStoreError, LeaveAPIError,
        LeaveEvent, LeavePeriod, LeaveRecord, LeaveStoreError, LineUserId,
        MemberName, OvertimeError, OvertimeSlot, ProfileStoreError,
        ProxyRequest, SlotTarget, Team, UserProfile, ValidationError,
    },
};

/// Who is asking, as carried by a leave request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Actor {
    pub line_user_id: Option<String>,
    pub is_proxy: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub team: Option<String>,
    pub period: Option<Value>,
    pub full_day_overtime: Option<Value>,
    pub line_user_id: Option<String>,
    #[serde(default)]
    pub is_proxy: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotMemberRequest {
    pub name: String,
    pub team: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOvertimeRequest {
    pub name: String,
    pub team: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// A change to an existing leave. The operation is picked from which
/// fields are present, in this order: `clearOvertime`, `confirm`,
/// `customOvertime`, then `slot` with `member`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub clear_overtime: bool,
    pub confirm: Option<bool>,
    pub slot: Option<SlotTarget>,
    pub member: Option<SlotMemberRequest>,
    pub custom_overtime: Option<CustomOvertimeRequest>,
    pub line_user_id: Option<String>,
    #[serde(default)]
    pub is_proxy: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLeaveRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub line_user_id: Option<String>,
    #[serde(default)]
    pub is_proxy: bool,
}

#[derive(Debug, Clone)]
enum UpdateMode {
    Clear,
    Confirm { target: SlotTarget, confirm: bool },
    Assign { target: SlotTarget, member: SlotMemberRequest },
    AssignCustom(CustomOvertimeRequest),
}

impl UpdateLeaveRequest {
    fn mode(
        &self,
        record: &LeaveRecord,
    ) -> Result<UpdateMode, ValidationError> {
        if self.clear_overtime {
            return Ok(UpdateMode::Clear);
        }
        if let Some(confirm) = self.confirm {
            let target = match self.slot {
                Some(target) => target,
                None => default_confirm_target(record)?,
            };
            return Ok(UpdateMode::Confirm { target, confirm });
        }
        if let Some(custom) = &self.custom_overtime {
            return Ok(UpdateMode::AssignCustom(custom.clone()));
        }
        match (self.slot, &self.member) {
            (Some(SlotTarget::Custom), _) => Err(ValidationError::new(
                String::from("Use customOvertime to assign custom overtime"),
            )),
            (Some(target), Some(member)) => Ok(UpdateMode::Assign {
                target,
                member: member.clone(),
            }),
            (Some(target), None) => Err(ValidationError::new(format!(
                "A member is required for the {target} assignment"
            ))),
            (None, _) => Err(ValidationError::new(String::from(
                "No update operation given",
            ))),
        }
    }
}

/// The only slot a confirmation can mean when the caller names none.
fn default_confirm_target(
    record: &LeaveRecord,
) -> Result<SlotTarget, ValidationError> {
    if record.custom_overtime.is_some() {
        return Ok(SlotTarget::Custom);
    }
    if record.slot(SlotTarget::FullShift).is_some() {
        return Ok(SlotTarget::FullShift);
    }
    Err(ValidationError::new(String::from(
        "slot is required to confirm a half-shift assignment",
    )))
}

#[tracing::instrument(name = "Creating leave record", skip_all)]
pub async fn create_leave(
    state: &AppState,
    request: CreateLeaveRequest,
) -> Result<(LeaveRecord, DispatchReport), LeaveAPIError> {
    validate(&request)?;
    let date = parse_date(&request.date)?;
    let name = MemberName::parse(&request.name)?;
    let team = resolve_team(&name, request.team.as_deref(), date)?;

    let period = match request.period {
        None => LeavePeriod::FullDay,
        Some(value) => serde_json::from_value::<LeavePeriod>(value)
            .map_err(|e| ValidationError::new(format!("Invalid period: {e}")))?,
    };
    let full_day_overtime = match request.full_day_overtime {
        None => None,
        Some(value) => normalize_full_day_overtime(value, date)?,
    };

    let actor = Actor {
        line_user_id: request.line_user_id,
        is_proxy: request.is_proxy,
    };
    let proxy_request = authorize(state, &actor, &name).await?;

    let record = LeaveRecord::new(
        date,
        name,
        team,
        period,
        full_day_overtime,
        proxy_request,
    )?;

    state
        .leave_store
        .write()
        .await
        .add_record(record.clone())
        .await
        .map_err(|e| match e {
            LeaveStoreError::RecordExists => LeaveAPIError::ConflictError {
                date: record.date,
                name: record.requester_name.to_string(),
            },
            e => leave_store_error(e),
        })?;

    let report = NotificationFanout::from(state)
        .dispatch(LeaveEvent::LeaveCreated(record.clone()))
        .await;

    Ok((record, report))
}

#[tracing::instrument(name = "Updating leave record", skip_all)]
pub async fn update_leave(
    state: &AppState,
    request: UpdateLeaveRequest,
) -> Result<(LeaveRecord, DispatchReport), LeaveAPIError> {
    validate(&request)?;
    let date = parse_date(&request.date)?;
    let name = MemberName::parse(&request.name)?;

    // Held until the record is written back so concurrent edits to the
    // other half of the same record are not lost.
    let mut leave_store = state.leave_store.write().await;
    let previous = leave_store
        .get_record(date, &name)
        .await
        .map_err(|e| match e {
            LeaveStoreError::RecordNotFound => not_found(date, &name),
            e => leave_store_error(e),
        })?;
    let mut record = previous.clone();
    let mode = request.mode(&record)?;
    let actor = Actor {
        line_user_id: request.line_user_id.clone(),
        is_proxy: request.is_proxy,
    };

    let mut events = Vec::new();
    match mode {
        UpdateMode::Clear => {
            identify(state, &actor).await?;
            let removed = record.clear_overtime();
            events.push(LeaveEvent::OvertimeCleared {
                record: record.clone(),
                removed,
            });
        }
        UpdateMode::Confirm { target, confirm } => {
            identify(state, &actor).await?;
            match record
                .set_confirmation(target, confirm)
                .map_err(overtime_error)?
            {
                ConfirmOutcome::NewlyConfirmed(slot) => {
                    events.push(LeaveEvent::OvertimeConfirmed {
                        record: record.clone(),
                        target,
                        slot,
                    })
                }
                ConfirmOutcome::AlreadyConfirmed => {
                    return Ok((record, DispatchReport::default()))
                }
                ConfirmOutcome::Cleared(slot) => {
                    tracing::info!(
                        member = %slot.name,
                        slot = %target,
                        "overtime confirmation withdrawn"
                    );
                }
            }
        }
        UpdateMode::Assign { target, member } => {
            let slot = new_slot(
                state,
                &actor,
                &record,
                &member.name,
                member.team.as_deref(),
            )
            .await?;
            record.assign(target, slot.clone()).map_err(overtime_error)?;
            events.push(LeaveEvent::OvertimeAssigned {
                record: record.clone(),
                target,
                slot,
            });
            if member.confirmed {
                confirm_assigned(&mut record, target, &mut events)?;
            }
        }
        UpdateMode::AssignCustom(custom) => {
            let slot = new_slot(
                state,
                &actor,
                &record,
                &custom.name,
                custom.team.as_deref(),
            )
            .await?;
            record
                .assign_custom(
                    slot.clone(),
                    ClockTime::parse(&custom.start_time)?,
                    ClockTime::parse(&custom.end_time)?,
                )
                .map_err(overtime_error)?;
            events.push(LeaveEvent::OvertimeAssigned {
                record: record.clone(),
                target: SlotTarget::Custom,
                slot,
            });
            if custom.confirmed {
                confirm_assigned(&mut record, SlotTarget::Custom, &mut events)?;
            }
        }
    }

    leave_store
        .update_record(&previous, &record)
        .await
        .map_err(|e| match e {
            LeaveStoreError::RecordNotFound => not_found(date, &name),
            LeaveStoreError::StaleRecord => LeaveAPIError::StaleUpdateError {
                date,
                name: name.to_string(),
            },
            e => leave_store_error(e),
        })?;
    drop(leave_store);

    let fanout = NotificationFanout::from(state);
    let mut report = DispatchReport::default();
    for event in events {
        report.merge(fanout.dispatch(event).await);
    }

    Ok((record, report))
}

#[tracing::instrument(name = "Deleting leave record", skip_all)]
pub async fn delete_leave(
    state: &AppState,
    request: DeleteLeaveRequest,
) -> Result<(LeaveRecord, CancellationReport), LeaveAPIError> {
    validate(&request)?;
    let date = parse_date(&request.date)?;
    let name = MemberName::parse(&request.name)?;

    let mut leave_store = state.leave_store.write().await;
    let record = leave_store
        .get_record(date, &name)
        .await
        .map_err(|e| match e {
            LeaveStoreError::RecordNotFound => not_found(date, &name),
            e => leave_store_error(e),
        })?;
    let actor = Actor {
        line_user_id: request.line_user_id,
        is_proxy: request.is_proxy,
    };
    let cancelled_by = authorize(state, &actor, &name).await?;

    leave_store
        .delete_record(date, &name)
        .await
        .map_err(|e| match e {
            LeaveStoreError::RecordNotFound => not_found(date, &name),
            e => leave_store_error(e),
        })?;
    drop(leave_store);

    let report = NotificationFanout::from(state)
        .dispatch(LeaveEvent::LeaveCancelled {
            record: record.clone(),
            cancelled_by,
        })
        .await;

    Ok((record, report.cancellation.unwrap_or_default()))
}

/// Looks up the caller's profile, if the request names a LINE account.
pub async fn identify(
    state: &AppState,
    actor: &Actor,
) -> Result<Option<UserProfile>, LeaveAPIError> {
    let line_user_id = match actor.line_user_id.as_deref() {
        Some(id) => LineUserId::parse(id)?,
        None if actor.is_proxy => {
            return Err(ValidationError::new(String::from(
                "Proxy requests require a lineUserId",
            ))
            .into())
        }
        None => return Ok(None),
    };

    state
        .profile_store
        .read()
        .await
        .get_profile_by_line_id(&line_user_id)
        .await
        .map(Some)
        .map_err(|e| match e {
            ProfileStoreError::ProfileNotFound => {
                AuthorizationError::NotRegistered.into()
            }
            e => profile_store_error(e),
        })
}

/// Checks that the caller may act for `acting_for`.
///
/// Requests without a LINE account are trusted. Registered callers act for
/// themselves, or for anyone when the proxy flag is set, in which case the
/// returned attribution must be stored with whatever they changed.
pub async fn authorize(
    state: &AppState,
    actor: &Actor,
    acting_for: &MemberName,
) -> Result<Option<ProxyRequest>, LeaveAPIError> {
    let caller = match identify(state, actor).await? {
        Some(caller) => caller,
        None => return Ok(None),
    };

    if &caller.member_name == acting_for {
        return Ok(None);
    }
    if !actor.is_proxy {
        return Err(
            AuthorizationError::NotPermitted(acting_for.to_string()).into()
        );
    }

    Ok(Some(ProxyRequest {
        is_proxy: true,
        proxy_by_name: caller.member_name,
        proxy_by_line_user_id: caller.line_user_id,
        proxy_by_display_name: caller.display_name,
    }))
}

async fn new_slot(
    state: &AppState,
    actor: &Actor,
    record: &LeaveRecord,
    name: &str,
    team: Option<&str>,
) -> Result<OvertimeSlot, LeaveAPIError> {
    let name = MemberName::parse(name)?;
    if name == record.requester_name {
        return Err(ValidationError::new(String::from(
            "You cannot cover overtime for your own leave",
        ))
        .into());
    }
    let team = resolve_team(&name, team, record.date)?;
    let proxy_request = authorize(state, actor, &name).await?;
    Ok(OvertimeSlot::new(name, team).with_proxy(proxy_request))
}

fn confirm_assigned(
    record: &mut LeaveRecord,
    target: SlotTarget,
    events: &mut Vec<LeaveEvent>,
) -> Result<(), LeaveAPIError> {
    if let ConfirmOutcome::NewlyConfirmed(slot) = record
        .set_confirmation(target, true)
        .map_err(overtime_error)?
    {
        events.push(LeaveEvent::OvertimeConfirmed {
            record: record.clone(),
            target,
            slot,
        });
    }
    Ok(())
}

/// Team given in the request, otherwise the member's team on `date`.
pub fn resolve_team(
    name: &MemberName,
    team: Option<&str>,
    date: NaiveDate,
) -> Result<Team, ValidationError> {
    match team {
        Some(team) => team.parse(),
        None => roster::team_of(name.as_ref(), date).ok_or_else(|| {
            ValidationError::new(format!(
                "{name} is not on the roster for {date}, team is required"
            ))
        }),
    }
}

pub fn parse_date(date: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(format!(
            "Invalid date {date:?}, expected YYYY-MM-DD"
        ))
    })
}

fn validate(request: &impl Validate) -> Result<(), ValidationError> {
    request
        .validate()
        .map_err(|e| ValidationError::new(e.to_string()))
}

fn not_found(date: NaiveDate, name: &MemberName) -> LeaveAPIError {
    LeaveAPIError::NotFoundError(format!("No leave for {name} on {date}"))
}

fn overtime_error(e: OvertimeError) -> LeaveAPIError {
    match e {
        OvertimeError::SlotNotFound(_) => {
            LeaveAPIError::NotFoundError(e.to_string())
        }
        OvertimeError::ValidationError(e) => e.into(),
    }
}

pub fn leave_store_error(e: LeaveStoreError) -> LeaveAPIError {
    match e {
        LeaveStoreError::Unavailable(_) => {
            LeaveAPIError::StorageUnavailableError(eyre!(e))
        }
        e => LeaveAPIError::UnexpectedError(eyre!(e)),
    }
}

pub fn profile_store_error(e: ProfileStoreError) -> LeaveAPIError {
    match e {
        ProfileStoreError::Unavailable(_) => {
            LeaveAPIError::StorageUnavailableError(eyre!(e))
        }
        e => LeaveAPIError::UnexpectedError(eyre!(e)),
    }
}

pub fn identity_selection_store_error(
    e: IdentitySelectionStoreError,
) -> LeaveAPIError {
    match e {
        IdentitySelectionStoreError::Unavailable(_) => {
            LeaveAPIError::StorageUnavailableError(eyre!(e))
        }
        e => LeaveAPIError::UnexpectedError(eyre!(e)),
    }
}
