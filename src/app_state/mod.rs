use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        Clock, IdentitySelectionStore, LeaveStore, NotificationSender,
        ProfileStore,
    },
    utils::config::AppConfig,
};

pub type LeaveStoreType = Arc<RwLock<dyn LeaveStore + Send + Sync>>;
pub type ProfileStoreType = Arc<RwLock<dyn ProfileStore + Send + Sync>>;
pub type IdentitySelectionStoreType =
    Arc<RwLock<dyn IdentitySelectionStore + Send + Sync>>;
pub type NotificationSenderType = Arc<dyn NotificationSender + Send + Sync>;
pub type ClockType = Arc<dyn Clock + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub leave_store: LeaveStoreType,
    pub profile_store: ProfileStoreType,
    pub identity_selection_store: IdentitySelectionStoreType,
    pub notification_sender: NotificationSenderType,
    pub clock: ClockType,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        leave_store: LeaveStoreType,
        profile_store: ProfileStoreType,
        identity_selection_store: IdentitySelectionStoreType,
        notification_sender: NotificationSenderType,
        clock: ClockType,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            leave_store,
            profile_store,
            identity_selection_store,
            notification_sender,
            clock,
            config,
        }
    }
}
