use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    domain::LineUserId, services::conversation::handle_message, AppState,
};

/// The parts of a LINE webhook delivery this service reads.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

impl WebhookEvent {
    fn text_message(&self) -> Option<(&str, &str)> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        let user_id = self.source.as_ref()?.user_id.as_deref()?;
        Some((user_id, message.text.as_deref()?))
    }
}

/// Handles LINE text messages for the sender in `source.userId`.
///
/// The `X-Line-Signature` header is not checked here, so this route must
/// only be reachable through ingress that verifies it. Otherwise anyone can
/// post as an admin account and run `admin reset`.
#[tracing::instrument(name = "LINE webhook route handler", skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> (StatusCode, Json<WebhookResponse>) {
    let mut handled = 0;

    for (user_id, text) in request
        .events
        .iter()
        .filter_map(WebhookEvent::text_message)
    {
        let line_user_id = match LineUserId::parse(user_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring event from unknown source");
                continue;
            }
        };

        let reply = match handle_message(&state, &line_user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = ?e, "failed to handle LINE message");
                String::from("Something went wrong, please try again later.")
            }
        };

        if let Err(e) =
            state.notification_sender.send(&line_user_id, &reply).await
        {
            tracing::warn!(error = ?e, "failed to deliver reply");
        }
        handled += 1;
    }

    (StatusCode::OK, Json(WebhookResponse { handled }))
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub handled: usize,
}
