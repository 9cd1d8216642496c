mod parser;

use crate::constants::{DEFAULT_PAUSE_MINUTES, DEFAULT_SEND_DELAY};
use crate::core::AssigneeDirectory;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub use parser::load_config;

/// Full configuration of the service, loaded from a YAML file at startup.
/// Secrets can be written as `${VAR}` placeholders resolved from the
/// environment by the loader.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Path to the bot's message mirror database (read-only)
    #[serde(default)]
    pub messages_db: String,
    /// Path to the service's own notification database
    #[serde(default)]
    pub notifications_db: String,
    #[serde(default)]
    pub task_source: TaskSourceConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    /// Assignee directory, in priority order
    #[serde(default)]
    pub directory: Vec<DirectoryEntry>,
    /// Pause between sends within one batch, e.g. "300ms"
    #[serde(default)]
    pub send_delay: Option<String>,
    /// Default minutes the relay pauses bot automation after a manual reply
    #[serde(default)]
    pub pause_minutes: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TaskSourceConfig {
    /// Base URL of the task-management API
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    /// The WhatsApp-enabled number the system sends from; also used to
    /// disambiguate thread direction
    #[serde(default)]
    pub from: String,
    /// Content SID of the pre-approved task-notification template
    #[serde(default)]
    pub template_sid: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RelayConfig {
    /// Base URL of the manual-reply relay
    #[serde(default)]
    pub base_url: String,
    /// Bearer credential for the relay
    #[serde(default)]
    pub api_key: String,
}

/// One assignee directory entry: a lowercase name fragment and the
/// WhatsApp number it resolves to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub phone: String,
}

impl AppConfig {
    /// Validates the whole configuration eagerly, collecting every
    /// missing or invalid field into a single error so the operator can
    /// fix them all at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        for (field, value) in [
            ("messages_db", &self.messages_db),
            ("notifications_db", &self.notifications_db),
            ("task_source.base_url", &self.task_source.base_url),
            ("twilio.account_sid", &self.twilio.account_sid),
            ("twilio.auth_token", &self.twilio.auth_token),
            ("twilio.from", &self.twilio.from),
            ("twilio.template_sid", &self.twilio.template_sid),
            ("relay.base_url", &self.relay.base_url),
            ("relay.api_key", &self.relay.api_key),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field} is missing"));
            }
        }

        for (field, value) in [
            ("task_source.base_url", &self.task_source.base_url),
            ("relay.base_url", &self.relay.base_url),
        ] {
            if !value.trim().is_empty() && Url::parse(value).is_err() {
                problems.push(format!("{field} is not a valid URL: {value}"));
            }
        }

        if let Some(delay) = &self.send_delay {
            if humantime::parse_duration(delay).is_err() {
                problems.push(format!("send_delay is not a valid duration: {delay}"));
            }
        }

        if self.directory.is_empty() {
            problems.push("directory has no entries".to_string());
        }
        for entry in &self.directory {
            if entry.name.trim().is_empty() {
                problems.push(format!(
                    "directory entry for {} has an empty name fragment",
                    entry.phone
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    /// Inter-message delay within a batch; `validate` guarantees the
    /// configured value parses.
    pub fn send_delay(&self) -> Duration {
        self.send_delay
            .as_deref()
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(DEFAULT_SEND_DELAY)
    }

    pub fn pause_minutes(&self) -> u32 {
        self.pause_minutes.unwrap_or(DEFAULT_PAUSE_MINUTES)
    }

    pub fn assignee_directory(&self) -> AssigneeDirectory {
        AssigneeDirectory::new(
            self.directory
                .iter()
                .map(|e| (e.name.clone(), e.phone.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AppConfig {
        AppConfig {
            messages_db: "bot.db".to_string(),
            notifications_db: "chatsuite.db".to_string(),
            task_source: TaskSourceConfig {
                base_url: "https://os.example.com/api".to_string(),
            },
            twilio: TwilioConfig {
                account_sid: "AC123".to_string(),
                auth_token: "token".to_string(),
                from: "whatsapp:+14155238886".to_string(),
                template_sid: "HX123".to_string(),
            },
            relay: RelayConfig {
                base_url: "https://relay.example.com".to_string(),
                api_key: "key".to_string(),
            },
            directory: vec![DirectoryEntry {
                name: "stiven".to_string(),
                phone: "573026444564".to_string(),
            }],
            send_delay: Some("300ms".to_string()),
            pause_minutes: None,
        }
    }

    #[test]
    fn complete_configuration_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn every_missing_field_is_reported_at_once() {
        let err = AppConfig::default().validate().unwrap_err();
        let message = err.to_string();

        for field in [
            "messages_db",
            "notifications_db",
            "task_source.base_url",
            "twilio.account_sid",
            "twilio.auth_token",
            "twilio.from",
            "twilio.template_sid",
            "relay.base_url",
            "relay.api_key",
            "directory",
        ] {
            assert!(message.contains(field), "missing '{field}' in: {message}");
        }
    }

    #[test]
    fn bad_url_and_bad_delay_are_flagged() {
        let mut config = complete();
        config.relay.base_url = "not a url".to_string();
        config.send_delay = Some("fast".to_string());

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("relay.base_url"));
        assert!(message.contains("send_delay"));
    }

    #[test]
    fn delay_defaults_when_unset() {
        let mut config = complete();
        config.send_delay = None;
        assert_eq!(config.send_delay(), Duration::from_millis(300));

        config.send_delay = Some("1s".to_string());
        assert_eq!(config.send_delay(), Duration::from_secs(1));
    }
}
