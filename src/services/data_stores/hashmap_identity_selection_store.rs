use std::collections::HashMap;

use crate::domain::{
    IdentitySelectionState, IdentitySelectionStore,
    IdentitySelectionStoreError, IdentityStep, LineUserId,
};

#[derive(Default)]
pub struct HashmapIdentitySelectionStore {
    states: HashMap<LineUserId, IdentitySelectionState>,
}

#[async_trait::async_trait]
impl IdentitySelectionStore for HashmapIdentitySelectionStore {
    async fn get_state(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<IdentitySelectionState, IdentitySelectionStoreError> {
        match self.states.get(line_user_id) {
            Some(state) => Ok(state.clone()),
            None => Err(IdentitySelectionStoreError::StateNotFound),
        }
    }

    async fn upsert_state(
        &mut self,
        state: IdentitySelectionState,
    ) -> Result<(), IdentitySelectionStoreError> {
        self.states.insert(state.line_user_id.clone(), state);
        Ok(())
    }

    async fn delete_state(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), IdentitySelectionStoreError> {
        self.states.remove(line_user_id);
        Ok(())
    }

    async fn get_completed_states(
        &self,
    ) -> Result<Vec<IdentitySelectionState>, IdentitySelectionStoreError> {
        Ok(self
            .states
            .values()
            .filter(|state| state.step == IdentityStep::Completed)
            .cloned()
            .collect())
    }
}
