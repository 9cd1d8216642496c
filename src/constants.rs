use std::time::Duration;

/// Consuming fetch endpoint on the task source; tasks returned here are
/// removed from the upstream queue.
pub const TASKS_ENDPOINT: &str = "/tasks";

/// Non-consuming preview endpoint on the task source.
pub const TASKS_PEEK_ENDPOINT: &str = "/tasks/peek";

/// Handoff endpoint on the manual-reply relay.
pub const HANDOFF_SEND_ENDPOINT: &str = "/handoff/send";

/// Base URL of the Twilio REST API.
pub const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Fallback values for template slots when a task arrives with fields
/// missing. These are operator-facing and match the WhatsApp template copy.
pub const DEFAULT_PRIORITY: &str = "Alta";
pub const DEFAULT_ASSIGNEE: &str = "Sin asignar";
pub const DEFAULT_CREATOR: &str = "Sistema";
pub const DEFAULT_TITLE: &str = "Sin título";
pub const DEFAULT_DESCRIPTION: &str = "Sin descripción";

/// Pause between template sends within one batch. A deliberate throttle for
/// the provider's rate limits, overridable via `send_delay` in the config.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(300);

/// Minutes the relay pauses bot automation for a contact after a manual
/// reply, unless the operator chooses otherwise.
pub const DEFAULT_PAUSE_MINUTES: u32 = 30;

/// Per-call network timeouts to the external APIs.
pub const TASK_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);
pub const SEND_TIMEOUT: Duration = Duration::from_secs(20);
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(20);
