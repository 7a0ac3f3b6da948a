use std::collections::HashMap;

use crate::domain::{
    LineUserId, MemberName, ProfileStore, ProfileStoreError, UserProfile,
};

#[derive(Default)]
pub struct HashmapProfileStore {
    profiles: HashMap<LineUserId, UserProfile>,
}

#[async_trait::async_trait]
impl ProfileStore for HashmapProfileStore {
    async fn add_profile(
        &mut self,
        profile: UserProfile,
    ) -> Result<(), ProfileStoreError> {
        let name_taken = self
            .profiles
            .values()
            .any(|existing| existing.member_name == profile.member_name);

        if name_taken || self.profiles.contains_key(&profile.line_user_id) {
            return Err(ProfileStoreError::ProfileExists);
        }

        self.profiles.insert(profile.line_user_id.clone(), profile);
        Ok(())
    }

    async fn get_profile_by_line_id(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<UserProfile, ProfileStoreError> {
        match self.profiles.get(line_user_id) {
            Some(profile) => Ok(profile.clone()),
            None => Err(ProfileStoreError::ProfileNotFound),
        }
    }

    async fn get_profile_by_member_name(
        &self,
        name: &MemberName,
    ) -> Result<UserProfile, ProfileStoreError> {
        self.profiles
            .values()
            .find(|profile| &profile.member_name == name)
            .cloned()
            .ok_or(ProfileStoreError::ProfileNotFound)
    }

    async fn get_profiles(
        &self,
        notification_enabled_only: bool,
    ) -> Result<Vec<UserProfile>, ProfileStoreError> {
        Ok(self
            .profiles
            .values()
            .filter(|profile| {
                !notification_enabled_only || profile.notification_enabled
            })
            .cloned()
            .collect())
    }

    async fn set_notification_enabled(
        &mut self,
        line_user_id: &LineUserId,
        enabled: bool,
    ) -> Result<(), ProfileStoreError> {
        match self.profiles.get_mut(line_user_id) {
            Some(profile) => {
                profile.notification_enabled = enabled;
                Ok(())
            }
            None => Err(ProfileStoreError::ProfileNotFound),
        }
    }

    async fn delete_profile(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), ProfileStoreError> {
        match self.profiles.remove(line_user_id) {
            Some(_) => Ok(()),
            None => Err(ProfileStoreError::ProfileNotFound),
        }
    }
}
