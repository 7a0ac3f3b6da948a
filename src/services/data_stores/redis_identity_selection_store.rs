use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr};
use redis::{Commands, Connection, RedisError};
use tokio::sync::RwLock;

use crate::domain::{
    IdentitySelectionState, IdentitySelectionStore,
    IdentitySelectionStoreError, IdentityStep, LineUserId,
};

/// Keeps every in-progress selection as a JSON value in one Redis hash,
/// keyed by LINE user ID.
pub struct RedisIdentitySelectionStore {
    conn: Arc<RwLock<Connection>>,
}

impl RedisIdentitySelectionStore {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl IdentitySelectionStore for RedisIdentitySelectionStore {
    #[tracing::instrument(
        name = "Getting identity selection state from Redis",
        skip_all
    )]
    async fn get_state(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<IdentitySelectionState, IdentitySelectionStoreError> {
        let state = self
            .conn
            .write()
            .await
            .hget::<_, _, Option<String>>(
                IDENTITY_SELECTION_KEY,
                line_user_id.as_ref(),
            )
            .map_err(|e| {
                redis_error(
                    e,
                    "failed to read identity selection state from Redis",
                )
            })?
            .ok_or(IdentitySelectionStoreError::StateNotFound)?;

        serde_json::from_str(&state)
            .wrap_err("failed to deserialise identity selection state")
            .map_err(IdentitySelectionStoreError::UnexpectedError)
    }

    #[tracing::instrument(
        name = "Saving identity selection state to Redis",
        skip_all
    )]
    async fn upsert_state(
        &mut self,
        state: IdentitySelectionState,
    ) -> Result<(), IdentitySelectionStoreError> {
        let value = serde_json::to_string(&state)
            .wrap_err("failed to serialise identity selection state")
            .map_err(IdentitySelectionStoreError::UnexpectedError)?;

        self.conn
            .write()
            .await
            .hset::<_, _, _, ()>(
                IDENTITY_SELECTION_KEY,
                state.line_user_id.as_ref(),
                value,
            )
            .map_err(|e| {
                redis_error(
                    e,
                    "failed to write identity selection state to Redis",
                )
            })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Removing identity selection state from Redis",
        skip_all
    )]
    async fn delete_state(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), IdentitySelectionStoreError> {
        self.conn
            .write()
            .await
            .hdel::<_, _, ()>(IDENTITY_SELECTION_KEY, line_user_id.as_ref())
            .map_err(|e| {
                redis_error(
                    e,
                    "failed to delete identity selection state from Redis",
                )
            })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Listing completed identity selections from Redis",
        skip_all
    )]
    async fn get_completed_states(
        &self,
    ) -> Result<Vec<IdentitySelectionState>, IdentitySelectionStoreError> {
        let values = self
            .conn
            .write()
            .await
            .hvals::<_, Vec<String>>(IDENTITY_SELECTION_KEY)
            .map_err(|e| {
                redis_error(
                    e,
                    "failed to list identity selection states from Redis",
                )
            })?;

        let mut states = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_str::<IdentitySelectionState>(&value) {
                Ok(state) if state.step == IdentityStep::Completed => {
                    states.push(state)
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "skipping unreadable identity selection state: {e}"
                    )
                }
            }
        }
        Ok(states)
    }
}

const IDENTITY_SELECTION_KEY: &str = "identity_selection";

fn redis_error(
    e: RedisError,
    context: &'static str,
) -> IdentitySelectionStoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
    {
        IdentitySelectionStoreError::Unavailable(eyre!(e).wrap_err(context))
    } else {
        IdentitySelectionStoreError::UnexpectedError(
            eyre!(e).wrap_err(context),
        )
    }
}
