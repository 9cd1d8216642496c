use crate::clients::MessageSender;
use crate::core::normalize_whatsapp;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-number result of a broadcast run.
#[derive(Debug, Serialize)]
pub struct BroadcastResult {
    /// The number as the operator entered it
    pub number: String,
    pub success: bool,
    /// Provider sid on success, failure reason otherwise
    pub detail: String,
}

/// Tally of one broadcast run.
#[derive(Debug, Default, Serialize)]
pub struct BroadcastOutcome {
    /// Distinct recipients after normalization and de-duplication
    pub requested: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<BroadcastResult>,
}

/// Splits an operator-entered recipient list on newlines, commas and
/// semicolons, dropping empty fragments.
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses the operator-entered template variables, requiring a JSON
/// object. Rejected before any send happens.
pub fn parse_template_variables(raw: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("malformed JSON variables: {e}"))?;
    if !value.is_object() {
        return Err("template variables must be a JSON object".to_string());
    }
    Ok(value)
}

/// Sends one template message to every number in an ad-hoc list.
pub struct Broadcaster {
    sender: Arc<dyn MessageSender>,
    send_delay: Duration,
}

impl Broadcaster {
    pub fn new(sender: Arc<dyn MessageSender>, send_delay: Duration) -> Self {
        Broadcaster { sender, send_delay }
    }

    /// Normalizes and de-duplicates the recipient list, then sends the
    /// template to each number with the configured delay in between.
    /// Unnormalizable numbers are failures in the tally; they never abort
    /// the remaining sends.
    pub async fn send_to_all(
        &self,
        raw_list: &str,
        variables: &serde_json::Value,
    ) -> BroadcastOutcome {
        let mut targets: Vec<(String, Result<String, String>)> = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for raw in parse_recipient_list(raw_list) {
            match normalize_whatsapp(&raw) {
                Ok(normalized) => {
                    if seen.contains(&normalized) {
                        continue;
                    }
                    seen.push(normalized.clone());
                    targets.push((raw, Ok(normalized)));
                }
                Err(err) => {
                    if targets.iter().any(|(r, _)| *r == raw) {
                        continue;
                    }
                    targets.push((raw, Err(err.to_string())));
                }
            }
        }

        let mut outcome = BroadcastOutcome {
            requested: targets.len(),
            ..Default::default()
        };

        let total = targets.len();
        for (index, (raw, target)) in targets.into_iter().enumerate() {
            match target {
                Ok(normalized) => {
                    match self.sender.send_template(&normalized, variables).await {
                        Ok(sid) => {
                            outcome.sent += 1;
                            outcome.results.push(BroadcastResult {
                                number: raw,
                                success: true,
                                detail: sid,
                            });
                        }
                        Err(err) => {
                            outcome.failed += 1;
                            outcome.results.push(BroadcastResult {
                                number: raw,
                                success: false,
                                detail: err.to_string(),
                            });
                        }
                    }
                    if index + 1 < total {
                        tokio::time::sleep(self.send_delay).await;
                    }
                }
                Err(reason) => {
                    outcome.failed += 1;
                    outcome.results.push(BroadcastResult {
                        number: raw,
                        success: false,
                        detail: reason,
                    });
                }
            }
        }

        info!(
            "broadcast done: {} sent, {} failed of {} recipient(s)",
            outcome.sent, outcome.failed, outcome.requested
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubSender {
        fail_on: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSender {
        fn new(fail_on: Option<&str>) -> Self {
            StubSender {
                fail_on: fail_on.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessageSender for StubSender {
        async fn send_template(
            &self,
            to: &str,
            _variables: &serde_json::Value,
        ) -> Result<String, SendError> {
            self.calls.lock().unwrap().push(to.to_string());
            match &self.fail_on {
                Some(bad) if to == bad => Err(SendError::Rejected("unreachable".to_string())),
                _ => Ok(format!("SM-{}", self.calls.lock().unwrap().len())),
            }
        }
    }

    #[test]
    fn recipient_list_splits_on_all_separators() {
        let parsed = parse_recipient_list("3116123189\n3007189383, 3026444564; ; \n");
        assert_eq!(parsed, vec!["3116123189", "3007189383", "3026444564"]);
    }

    #[test]
    fn template_variables_must_be_an_object() {
        assert!(parse_template_variables(r#"{"1": "hola"}"#).is_ok());
        assert!(parse_template_variables(r#"["hola"]"#).is_err());
        assert!(parse_template_variables("not json").is_err());
    }

    #[tokio::test]
    async fn duplicates_collapse_after_normalization() {
        let sender = Arc::new(StubSender::new(None));
        let broadcaster = Broadcaster::new(sender.clone(), Duration::ZERO);

        // same number in three representations
        let outcome = broadcaster
            .send_to_all(
                "3116123189, +573116123189; whatsapp:+573116123189",
                &serde_json::json!({}),
            )
            .await;

        assert_eq!(outcome.requested, 1);
        assert_eq!(outcome.sent, 1);
        assert_eq!(
            sender.calls.lock().unwrap().as_slice(),
            ["whatsapp:+573116123189"]
        );
    }

    #[tokio::test]
    async fn invalid_numbers_fail_without_stopping_the_rest() {
        let sender = Arc::new(StubSender::new(None));
        let broadcaster = Broadcaster::new(sender.clone(), Duration::ZERO);

        let outcome = broadcaster
            .send_to_all("abc, 3116123189", &serde_json::json!({}))
            .await;

        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.results[0].success);
        assert!(outcome.results[1].success);
    }

    #[tokio::test]
    async fn provider_rejection_is_tallied_per_number() {
        let sender = Arc::new(StubSender::new(Some("whatsapp:+573007189383")));
        let broadcaster = Broadcaster::new(sender, Duration::ZERO);

        let outcome = broadcaster
            .send_to_all("3116123189\n3007189383", &serde_json::json!({}))
            .await;

        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.results[1].detail, "provider rejected message: unreachable");
    }
}
