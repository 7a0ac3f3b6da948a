use std::time::Duration;

use color_eyre::eyre::{eyre, Report, WrapErr};
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::{
    domain::{LineUserId, NotificationDeliveryError, NotificationSender},
    utils::constants::LINE_PUSH_PATH,
};

/// Pushes text messages through the LINE Messaging API.
///
/// Every send goes through the typed JSON request first. If that errors or
/// comes back non-2xx, the same payload is serialised by hand and posted
/// again through a second client that carries no default configuration.
pub struct LineMessagingClient {
    http_client: Client,
    fallback_client: Client,
    base_url: String,
    channel_access_token: Secret<String>,
}

impl LineMessagingClient {
    pub fn new(
        base_url: String,
        channel_access_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let fallback_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            fallback_client,
            base_url,
            channel_access_token,
        })
    }

    fn push_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), LINE_PUSH_PATH)
    }

    #[tracing::instrument(name = "Pushing LINE message", skip_all)]
    async fn push(&self, body: &PushRequest<'_>) -> Result<(), Report> {
        self.http_client
            .post(self.push_url())
            .bearer_auth(self.channel_access_token.expose_secret())
            .json(body)
            .send()
            .await
            .wrap_err("LINE push request failed")?
            .error_for_status()
            .wrap_err("LINE push rejected")?;
        Ok(())
    }

    #[tracing::instrument(name = "Pushing LINE message over raw HTTP", skip_all)]
    async fn push_raw(&self, body: &PushRequest<'_>) -> Result<(), Report> {
        let payload = serde_json::to_string(body)
            .wrap_err("failed to serialise LINE push body")?;

        let response = self
            .fallback_client
            .post(self.push_url())
            .header(CONTENT_TYPE, "application/json")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.channel_access_token.expose_secret()),
            )
            .body(payload)
            .send()
            .await
            .wrap_err("raw LINE push request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("raw LINE push rejected with {}", response.status()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationSender for LineMessagingClient {
    async fn send(
        &self,
        to: &LineUserId,
        text: &str,
    ) -> Result<(), NotificationDeliveryError> {
        let body = PushRequest {
            to: to.as_ref(),
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        };

        let primary_error = match self.push(&body).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(
            to = %to,
            error = %primary_error,
            "LINE push failed, retrying over raw HTTP"
        );

        self.push_raw(&body).await.map_err(|fallback_error| {
            NotificationDeliveryError::new(
                to,
                fallback_error.wrap_err(format!(
                    "both delivery paths failed, primary error: {primary_error}"
                )),
            )
        })
    }
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'a str,
    text: &'a str,
}
