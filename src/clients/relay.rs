use crate::clients::http_client;
use crate::config::RelayConfig;
use crate::constants::HANDOFF_SEND_ENDPOINT;
use crate::core::normalize_whatsapp;
use crate::errors::RelayError;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Serialize)]
struct HandoffRequest<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
    #[serde(rename = "pauseMinutes", skip_serializing_if = "Option::is_none")]
    pause_minutes: Option<u32>,
}

/// Client for the handoff relay that delivers human-authored replies. The
/// relay persists the outbound message row and pauses bot automation for
/// the contact; this service never writes to the message table itself.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(config: &RelayConfig, timeout: Duration) -> Self {
        RelayClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout,
        }
    }

    /// Sends a manual operator reply to `to`, pausing automated replies
    /// for `pause_minutes`. Empty text is rejected before any call.
    pub async fn send_reply(
        &self,
        from: &str,
        to: &str,
        text: &str,
        pause_minutes: Option<u32>,
    ) -> Result<(), RelayError> {
        if text.trim().is_empty() {
            return Err(RelayError::EmptyText);
        }

        let from = normalize_whatsapp(from).map_err(|e| RelayError::InvalidNumber(e.0))?;
        let to = normalize_whatsapp(to).map_err(|e| RelayError::InvalidNumber(e.0))?;

        let url = format!("{}{}", self.base_url, HANDOFF_SEND_ENDPOINT);
        let body = HandoffRequest {
            from: &from,
            to: &to,
            text,
            pause_minutes,
        };

        let response = http_client()
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("manual reply relayed to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RelayClient {
        RelayClient {
            base_url: "http://localhost:9".to_string(),
            api_key: "key".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn empty_reply_text_is_rejected_locally() {
        let err = client()
            .send_reply("whatsapp:+1000", "whatsapp:+2000", "   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::EmptyText));
    }

    #[tokio::test]
    async fn invalid_contact_is_rejected_locally() {
        let err = client()
            .send_reply("whatsapp:+1000", "not-a-number", "hola", None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::InvalidNumber(_)));
    }

    #[test]
    fn pause_minutes_is_omitted_when_absent() {
        let body = HandoffRequest {
            from: "whatsapp:+1000",
            to: "whatsapp:+2000",
            text: "hola",
            pause_minutes: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("pauseMinutes").is_none());

        let body = HandoffRequest {
            pause_minutes: Some(30),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["pauseMinutes"], 30);
    }
}
