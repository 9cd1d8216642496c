use crate::clients::PendingTask;
use crate::constants::*;
use crate::core::NotificationStatus;
use crate::schema::{messages, task_notifications};
use chrono::Utc;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};

/// One inbound or outbound WhatsApp event mirrored by the bot process.
/// Rows are written by the bot or the manual-reply relay, never by this
/// service; transcription fields may be back-filled by an external worker.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: i32,
    /// Sender address, E.164-ish
    #[serde(rename = "from")]
    pub from_number: String,
    /// Recipient address; absent on some legacy rows
    #[serde(rename = "to")]
    pub to_number: Option<String>,
    /// Message body, or a placeholder for media
    pub message: String,
    /// Bot-generated reply, when the bot answered this row
    pub response: Option<String>,
    /// Event time
    pub timestamp: String,
    pub message_type: Option<String>,
    pub num_media: Option<i32>,
    pub media_json: Option<String>,
    pub transcript: Option<String>,
    /// One of: none, pending, error, done
    pub transcript_status: Option<String>,
}

/// One attempted delivery of a task alert. A resend mutates the existing
/// row rather than creating a new one.
#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, AsChangeset,
)]
#[diesel(table_name = task_notifications)]
pub struct TaskNotification {
    pub id: i32,
    /// External id from the task source; absent on manual sends
    pub task_id: Option<String>,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub prioridad: String,
    /// Free-text assignee name as it arrived from the task source
    pub asignado: String,
    pub creador: String,
    pub proyecto: Option<String>,
    pub fecha_limite: Option<String>,
    /// Phone number the notification was actually targeted at
    pub enviado_a: String,
    /// Provider message id, set once the provider accepts the send
    pub twilio_sid: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskNotification {
    pub fn status(&self) -> Option<NotificationStatus> {
        self.status.parse().ok()
    }
}

/// Insertable form of a notification record, created immediately before a
/// send attempt.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_notifications)]
pub struct NewTaskNotification {
    pub task_id: Option<String>,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub prioridad: String,
    pub asignado: String,
    pub creador: String,
    pub proyecto: Option<String>,
    pub fecha_limite: Option<String>,
    pub enviado_a: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NewTaskNotification {
    /// Builds a `pending` record for a task fetched from the task source,
    /// filling the template fallbacks for missing fields.
    pub fn from_task(task: &PendingTask, asignado: &str, phone: &str) -> Self {
        let now = Utc::now().to_rfc3339();
        NewTaskNotification {
            task_id: task.id.clone(),
            titulo: task
                .titulo
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            descripcion: task.descripcion.clone(),
            prioridad: task
                .prioridad
                .clone()
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            asignado: asignado.to_string(),
            creador: task
                .creador
                .clone()
                .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            proyecto: task.proyecto.clone(),
            fecha_limite: task.fecha_limite.clone(),
            enviado_a: phone.to_string(),
            status: NotificationStatus::Pending.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
