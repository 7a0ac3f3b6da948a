use super::{
    ClockTime, CustomOvertime, FullDayOvertime, LeavePeriod, MemberName,
    OvertimeKind, OvertimeSlot, ProxyRequest, SlotTarget, Team,
    ValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    pub date: NaiveDate,
    pub requester_name: MemberName,
    pub requester_team: Team,
    pub period: LeavePeriod,
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_day_overtime: Option<FullDayOvertime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_overtime: Option<CustomOvertime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_request: Option<ProxyRequest>,
}

#[derive(Debug, Error, PartialEq)]
pub enum OvertimeError {
    #[error("No member assigned to the {0} slot")]
    SlotNotFound(SlotTarget),
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
}

/// Outcome of a confirmation toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The slot went from unconfirmed to confirmed; carries the member.
    NewlyConfirmed(OvertimeSlot),
    AlreadyConfirmed,
    /// Un-confirming discards the assignment; carries the removed member.
    Cleared(OvertimeSlot),
}

impl LeaveRecord {
    /// A new leave. Full-day leave without explicit overtime gets an empty
    /// half-shift requirement.
    pub fn new(
        date: NaiveDate,
        requester_name: MemberName,
        requester_team: Team,
        period: LeavePeriod,
        full_day_overtime: Option<FullDayOvertime>,
        proxy_request: Option<ProxyRequest>,
    ) -> Result<Self, ValidationError> {
        let full_day_overtime = match (&period, full_day_overtime) {
            (LeavePeriod::FullDay, None) => {
                Some(FullDayOvertime::empty_half_shift())
            }
            (LeavePeriod::FullDay, overtime) => overtime,
            (LeavePeriod::Custom { .. }, None) => None,
            (LeavePeriod::Custom { .. }, Some(_)) => {
                return Err(ValidationError::new(String::from(
                    "Full-day overtime requires a full-day leave",
                )))
            }
        };

        let mut record = Self {
            date,
            requester_name,
            requester_team,
            period,
            confirmed: false,
            full_day_overtime,
            custom_overtime: None,
            proxy_request,
        };
        record.refresh_confirmed();
        Ok(record)
    }

    pub fn slot(&self, target: SlotTarget) -> Option<&OvertimeSlot> {
        self.slot_entry(target).and_then(|slot| slot.as_ref())
    }

    fn slot_entry(&self, target: SlotTarget) -> Option<&Option<OvertimeSlot>> {
        match (target, &self.full_day_overtime) {
            (
                SlotTarget::FullShift,
                Some(FullDayOvertime::FullShift { full_day_member }),
            ) => Some(full_day_member),
            (
                SlotTarget::FirstHalf,
                Some(FullDayOvertime::HalfShift {
                    first_half_member, ..
                }),
            ) => Some(first_half_member),
            (
                SlotTarget::SecondHalf,
                Some(FullDayOvertime::HalfShift {
                    second_half_member, ..
                }),
            ) => Some(second_half_member),
            _ => None,
        }
    }

    fn slot_entry_mut(
        &mut self,
        target: SlotTarget,
    ) -> Option<&mut Option<OvertimeSlot>> {
        match (target, &mut self.full_day_overtime) {
            (
                SlotTarget::FullShift,
                Some(FullDayOvertime::FullShift { full_day_member }),
            ) => Some(full_day_member),
            (
                SlotTarget::FirstHalf,
                Some(FullDayOvertime::HalfShift {
                    first_half_member, ..
                }),
            ) => Some(first_half_member),
            (
                SlotTarget::SecondHalf,
                Some(FullDayOvertime::HalfShift {
                    second_half_member, ..
                }),
            ) => Some(second_half_member),
            _ => None,
        }
    }

    /// Puts `slot` into a full-day overtime slot as unconfirmed.
    ///
    /// Assigning the full shift replaces any half-shift split; assigning a
    /// half turns a full-shift requirement into a half-shift one and leaves
    /// the sibling half untouched.
    pub fn assign(
        &mut self,
        target: SlotTarget,
        mut slot: OvertimeSlot,
    ) -> Result<(), OvertimeError> {
        if !self.period.is_full_day() {
            return Err(ValidationError::new(String::from(
                "Full-day overtime requires a full-day leave",
            ))
            .into());
        }
        slot.confirmed = false;

        match target {
            SlotTarget::FullShift => {
                self.full_day_overtime = Some(FullDayOvertime::FullShift {
                    full_day_member: Some(slot),
                });
            }
            SlotTarget::FirstHalf | SlotTarget::SecondHalf => {
                if !matches!(
                    self.full_day_overtime,
                    Some(FullDayOvertime::HalfShift { .. })
                ) {
                    self.full_day_overtime =
                        Some(FullDayOvertime::empty_half_shift());
                }
                if let Some(entry) = self.slot_entry_mut(target) {
                    *entry = Some(slot);
                }
            }
            SlotTarget::Custom => {
                return Err(ValidationError::new(String::from(
                    "Custom overtime needs a time range",
                ))
                .into())
            }
        }
        self.refresh_confirmed();
        Ok(())
    }

    /// Puts `slot` into the custom-period overtime as unconfirmed.
    pub fn assign_custom(
        &mut self,
        mut slot: OvertimeSlot,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Result<(), OvertimeError> {
        if self.period.is_full_day() {
            return Err(ValidationError::new(String::from(
                "Custom overtime requires a custom-period leave",
            ))
            .into());
        }
        if start_time == end_time {
            return Err(ValidationError::new(String::from(
                "Start time and end time cannot be equal",
            ))
            .into());
        }
        slot.confirmed = false;
        self.custom_overtime = Some(CustomOvertime {
            member: slot,
            start_time,
            end_time,
        });
        self.refresh_confirmed();
        Ok(())
    }

    /// Confirms (`confirm == true`) or discards (`confirm == false`) the
    /// member assigned to `target`.
    pub fn set_confirmation(
        &mut self,
        target: SlotTarget,
        confirm: bool,
    ) -> Result<ConfirmOutcome, OvertimeError> {
        let outcome = if target == SlotTarget::Custom {
            let custom = self
                .custom_overtime
                .as_mut()
                .ok_or(OvertimeError::SlotNotFound(target))?;
            if !confirm {
                let removed = custom.member.clone();
                self.custom_overtime = None;
                ConfirmOutcome::Cleared(removed)
            } else if custom.member.confirmed {
                ConfirmOutcome::AlreadyConfirmed
            } else {
                custom.member.confirmed = true;
                ConfirmOutcome::NewlyConfirmed(custom.member.clone())
            }
        } else {
            let entry = self
                .slot_entry_mut(target)
                .ok_or(OvertimeError::SlotNotFound(target))?;
            let slot =
                entry.as_mut().ok_or(OvertimeError::SlotNotFound(target))?;
            if !confirm {
                let removed = slot.clone();
                *entry = None;
                ConfirmOutcome::Cleared(removed)
            } else if slot.confirmed {
                ConfirmOutcome::AlreadyConfirmed
            } else {
                slot.confirmed = true;
                ConfirmOutcome::NewlyConfirmed(slot.clone())
            }
        };
        self.refresh_confirmed();
        Ok(outcome)
    }

    /// Drops the overtime requirement entirely, returning the members that
    /// were assigned.
    pub fn clear_overtime(&mut self) -> Vec<OvertimeSlot> {
        let mut removed = self.assigned_slots();
        removed.extend(
            self.custom_overtime
                .as_ref()
                .map(|custom| custom.member.clone()),
        );
        self.full_day_overtime = None;
        self.custom_overtime = None;
        self.refresh_confirmed();
        removed
    }

    fn assigned_slots(&self) -> Vec<OvertimeSlot> {
        [SlotTarget::FullShift, SlotTarget::FirstHalf, SlotTarget::SecondHalf]
            .into_iter()
            .filter_map(|target| self.slot(target).cloned())
            .collect()
    }

    /// Slots still waiting for a member, described for candidates.
    pub fn open_overtime(&self) -> Vec<OvertimeKind> {
        match &self.full_day_overtime {
            Some(FullDayOvertime::FullShift { full_day_member: None }) => {
                vec![OvertimeKind::FullShift]
            }
            Some(FullDayOvertime::HalfShift {
                first_half_member,
                second_half_member,
            }) => match (first_half_member, second_half_member) {
                (None, None) => vec![OvertimeKind::HalfShift],
                (None, Some(_)) => vec![OvertimeKind::FirstHalf],
                (Some(_), None) => vec![OvertimeKind::SecondHalf],
                (Some(_), Some(_)) => vec![],
            },
            _ => vec![],
        }
    }

    /// The opportunity a freshly created record offers, if any.
    pub fn opportunity(&self) -> Option<OvertimeKind> {
        match (&self.full_day_overtime, &self.custom_overtime) {
            (Some(overtime), _) => Some(overtime.kind()),
            (None, Some(custom)) => Some(OvertimeKind::Custom {
                start_time: custom.start_time.clone(),
                end_time: custom.end_time.clone(),
            }),
            (None, None) => None,
        }
    }

    /// A record is confirmed once every slot it requires is filled and
    /// confirmed.
    fn refresh_confirmed(&mut self) {
        let confirmed = |slot: &Option<OvertimeSlot>| {
            slot.as_ref().is_some_and(|slot| slot.confirmed)
        };
        self.confirmed = match (&self.full_day_overtime, &self.custom_overtime)
        {
            (Some(FullDayOvertime::FullShift { full_day_member }), _) => {
                confirmed(full_day_member)
            }
            (
                Some(FullDayOvertime::HalfShift {
                    first_half_member,
                    second_half_member,
                }),
                _,
            ) => confirmed(first_half_member) && confirmed(second_half_member),
            (None, Some(custom)) => custom.member.confirmed,
            (None, None) => false,
        };
    }
}
