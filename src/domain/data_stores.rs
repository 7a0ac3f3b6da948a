use super::{
    IdentitySelectionState, LeaveRecord, LineUserId, MemberName, UserProfile,
};
use chrono::NaiveDate;
use color_eyre::eyre::Report;
use thiserror::Error;

#[async_trait::async_trait]
pub trait LeaveStore {
    async fn add_record(
        &mut self,
        record: LeaveRecord,
    ) -> Result<(), LeaveStoreError>;
    async fn get_record(
        &self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<LeaveRecord, LeaveStoreError>;
    async fn get_records_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError>;
    /// Records with `from <= date <= to`, ordered by date.
    async fn get_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError>;
    async fn get_records_for_dates(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError>;
    /// Replaces `previous` with `record`. Fails with `StaleRecord` when the
    /// stored record no longer matches `previous`.
    async fn update_record(
        &mut self,
        previous: &LeaveRecord,
        record: &LeaveRecord,
    ) -> Result<(), LeaveStoreError>;
    async fn delete_record(
        &mut self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<(), LeaveStoreError>;
}

#[derive(Debug, Error)]
pub enum LeaveStoreError {
    #[error("Leave record already exists")]
    RecordExists,
    #[error("Leave record not found")]
    RecordNotFound,
    #[error("Leave record was changed by another request")]
    StaleRecord,
    #[error("Leave store unavailable")]
    Unavailable(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for LeaveStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::RecordExists, Self::RecordExists)
                | (Self::RecordNotFound, Self::RecordNotFound)
                | (Self::StaleRecord, Self::StaleRecord)
                | (Self::Unavailable(_), Self::Unavailable(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait::async_trait]
pub trait ProfileStore {
    /// Bindings are one-time: a LINE account or member name that is already
    /// bound is rejected with `ProfileExists`.
    async fn add_profile(
        &mut self,
        profile: UserProfile,
    ) -> Result<(), ProfileStoreError>;
    async fn get_profile_by_line_id(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<UserProfile, ProfileStoreError>;
    async fn get_profile_by_member_name(
        &self,
        name: &MemberName,
    ) -> Result<UserProfile, ProfileStoreError>;
    async fn get_profiles(
        &self,
        notification_enabled_only: bool,
    ) -> Result<Vec<UserProfile>, ProfileStoreError>;
    async fn set_notification_enabled(
        &mut self,
        line_user_id: &LineUserId,
        enabled: bool,
    ) -> Result<(), ProfileStoreError>;
    async fn delete_profile(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), ProfileStoreError>;
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Profile already exists")]
    ProfileExists,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Profile store unavailable")]
    Unavailable(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for ProfileStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::ProfileExists, Self::ProfileExists)
                | (Self::ProfileNotFound, Self::ProfileNotFound)
                | (Self::Unavailable(_), Self::Unavailable(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait::async_trait]
pub trait IdentitySelectionStore {
    async fn get_state(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<IdentitySelectionState, IdentitySelectionStoreError>;
    async fn upsert_state(
        &mut self,
        state: IdentitySelectionState,
    ) -> Result<(), IdentitySelectionStoreError>;
    async fn delete_state(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), IdentitySelectionStoreError>;
    async fn get_completed_states(
        &self,
    ) -> Result<Vec<IdentitySelectionState>, IdentitySelectionStoreError>;
}

#[derive(Debug, Error)]
pub enum IdentitySelectionStoreError {
    #[error("Identity selection state not found")]
    StateNotFound,
    #[error("Identity selection store unavailable")]
    Unavailable(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for IdentitySelectionStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::StateNotFound, Self::StateNotFound)
                | (Self::Unavailable(_), Self::Unavailable(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}
