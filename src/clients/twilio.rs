use crate::clients::http_client;
use crate::config::TwilioConfig;
use crate::constants::TWILIO_API_BASE;
use crate::core::normalize_whatsapp;
use crate::errors::SendError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Outbound template-message delivery, abstracted so the orchestrator and
/// broadcaster can run against a stub in tests.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends the configured template to `to` with the given variable
    /// slots and returns the provider message id.
    ///
    /// `to` may be any representation the normalizer accepts; the wire
    /// form is produced here, immediately before the call.
    async fn send_template(
        &self,
        to: &str,
        variables: &serde_json::Value,
    ) -> Result<String, SendError>;
}

/// Twilio implementation of [`MessageSender`] using the Messages API with
/// a pre-approved content template.
#[derive(Debug, Clone)]
pub struct TwilioSender {
    account_sid: String,
    auth_token: String,
    from: String,
    template_sid: String,
    timeout: Duration,
}

impl TwilioSender {
    pub fn new(config: &TwilioConfig, timeout: Duration) -> Self {
        TwilioSender {
            account_sid: config.account_sid.trim().to_string(),
            auth_token: config.auth_token.trim().to_string(),
            from: config.from.trim().to_string(),
            template_sid: config.template_sid.trim().to_string(),
            timeout,
        }
    }

    /// Checked on every send rather than once at startup so a partially
    /// configured deployment degrades into recorded failures instead of
    /// refusing to boot.
    fn check_credentials(&self) -> Result<(), SendError> {
        let mut missing = Vec::new();
        if self.account_sid.is_empty() {
            missing.push("account_sid");
        }
        if self.auth_token.is_empty() {
            missing.push("auth_token");
        }
        if self.from.is_empty() {
            missing.push("from");
        }
        if self.template_sid.is_empty() {
            missing.push("template_sid");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SendError::MissingCredentials(missing.join(", ")))
        }
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send_template(
        &self,
        to: &str,
        variables: &serde_json::Value,
    ) -> Result<String, SendError> {
        self.check_credentials()?;

        let to = normalize_whatsapp(to)?;
        let from = normalize_whatsapp(&self.from)?;
        let content_variables = variables.to_string();

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        );
        let params = [
            ("From", from.as_str()),
            ("To", to.as_str()),
            ("ContentSid", self.template_sid.as_str()),
            ("ContentVariables", content_variables.as_str()),
        ];

        let response = http_client()
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let json: serde_json::Value = response.json().await?;
        match json["sid"].as_str() {
            Some(sid) => {
                debug!("provider accepted message {}", sid);
                Ok(sid.to_string())
            }
            None => Err(SendError::Rejected(
                "no sid in provider response".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(from: &str) -> TwilioSender {
        TwilioSender {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from: from.to_string(),
            template_sid: "HX123".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn missing_credentials_are_enumerated() {
        let incomplete = TwilioSender {
            account_sid: String::new(),
            auth_token: "token".to_string(),
            from: String::new(),
            template_sid: "HX123".to_string(),
            timeout: Duration::from_secs(1),
        };

        let err = incomplete.check_credentials().unwrap_err();
        match err {
            SendError::MissingCredentials(fields) => {
                assert!(fields.contains("account_sid"));
                assert!(fields.contains("from"));
                assert!(!fields.contains("auth_token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_destination_fails_before_any_request() {
        let err = sender("573116123189")
            .send_template("abc", &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::InvalidNumber(_)));
    }
}
