use crate::api::errors::{api_error, ApiError};
use crate::api::ApiState;
use crate::core::{
    self, normalize_whatsapp, BatchOutcome, BroadcastOutcome, ManualTaskInput, NotificationStatus,
    NotifyError, SendReport, TaskPreview, ThreadAuthor,
};
use crate::db::{MessageRepository, NotificationRepository, TaskNotification};
use crate::errors::RelayError;
use axum::http::StatusCode;
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

/// One conversation in the thread index
#[derive(Serialize)]
pub struct ThreadSummary {
    pub contact: String,
    pub last_message: String,
    pub last_response: Option<String>,
    pub last_timestamp: String,
    pub message_count: i64,
}

/// One renderable line of a thread detail view
#[derive(Serialize)]
pub struct ThreadEntryDto {
    pub message_id: i32,
    pub author: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ThreadDetail {
    pub contact: String,
    pub entries: Vec<ThreadEntryDto>,
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub text: String,
    /// Minutes to pause bot automation; falls back to the configured default
    pub pause_minutes: Option<u32>,
}

#[derive(Deserialize)]
pub struct NotificationListParams {
    pub status: Option<String>,
}

fn default_consume() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CheckParams {
    /// Consume the upstream queue (default) or leave it intact
    #[serde(default = "default_consume")]
    pub consume: bool,
    /// Resolve and report without persisting or sending
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Deserialize)]
pub struct ManualSendRequest {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub asignado: String,
    pub creador: Option<String>,
    pub proyecto: Option<String>,
}

#[derive(Deserialize)]
pub struct BroadcastRequest {
    /// Newline/comma/semicolon delimited list of raw numbers
    pub numbers: String,
    /// Template variables, slot number to value
    pub variables: serde_json::Value,
}

fn author_label(author: ThreadAuthor) -> &'static str {
    match author {
        ThreadAuthor::Contact => "contact",
        ThreadAuthor::Operator => "operator",
        ThreadAuthor::Bot => "bot",
        ThreadAuthor::Unclassified => "unclassified",
    }
}

/// Contacts are taken from the URL path, so they may arrive in any of the
/// accepted representations; compare in canonical form, fall back to the
/// raw value for legacy addresses.
fn canonical_contact(raw: &str) -> String {
    normalize_whatsapp(raw).unwrap_or_else(|_| raw.trim().to_string())
}

/// Lists one summary per contact, newest conversation first
#[axum::debug_handler]
pub async fn list_threads(
    Extension(state): Extension<ApiState>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    let mut conn = state.messages_db.get_conn();
    let mut repo = MessageRepository::new(&mut conn);

    let latest = repo
        .latest_per_sender()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let mut summaries = Vec::new();
    for (contact, row) in core::index_by_contact(latest, &state.provider_sender) {
        let message_count = repo
            .count_for_contact(&contact)
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
        summaries.push(ThreadSummary {
            contact,
            last_message: row.message,
            last_response: row.response,
            last_timestamp: row.timestamp,
            message_count,
        });
    }

    Ok(Json(summaries))
}

/// Returns the full classified thread for a contact
#[axum::debug_handler]
pub async fn get_thread(
    Path(contact): Path<String>,
    Extension(state): Extension<ApiState>,
) -> Result<Json<ThreadDetail>, ApiError> {
    let contact = canonical_contact(&contact);

    let mut conn = state.messages_db.get_conn();
    let mut repo = MessageRepository::new(&mut conn);
    let rows = repo
        .thread(&contact)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let entries = core::assemble(&rows, &state.provider_sender, &contact)
        .into_iter()
        .map(|e| ThreadEntryDto {
            message_id: e.message_id,
            author: author_label(e.author).to_string(),
            text: e.text,
            timestamp: e.timestamp,
        })
        .collect();

    Ok(Json(ThreadDetail { contact, entries }))
}

/// Sends a manual operator reply through the handoff relay; the relay
/// persists the outbound row and pauses the bot for this contact
#[axum::debug_handler]
pub async fn send_reply(
    Path(contact): Path<String>,
    Extension(state): Extension<ApiState>,
    Json(payload): Json<ReplyRequest>,
) -> Result<StatusCode, ApiError> {
    let pause = payload.pause_minutes.unwrap_or(state.pause_minutes);

    state
        .relay
        .send_reply(&state.provider_sender, &contact, &payload.text, Some(pause))
        .await
        .map_err(|e| match e {
            RelayError::EmptyText | RelayError::InvalidNumber(_) => {
                api_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
            }
            _ => api_error(StatusCode::BAD_GATEWAY, &e.to_string()),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists notification records, optionally filtered by status
#[axum::debug_handler]
pub async fn list_notifications(
    Query(params): Query<NotificationListParams>,
    Extension(state): Extension<ApiState>,
) -> Result<Json<Vec<TaskNotification>>, ApiError> {
    let filter = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<NotificationStatus>().map_err(|_| {
            api_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                &format!("unknown status '{raw}'"),
            )
        })?),
        None => None,
    };

    let mut conn = state.notifications_db.get_conn();
    let mut repo = NotificationRepository::new(&mut conn);
    let rows = repo
        .list(filter.as_ref())
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    Ok(Json(rows))
}

/// Fetches pending tasks and notifies each assignee
#[axum::debug_handler]
pub async fn check_tasks(
    Query(params): Query<CheckParams>,
    Extension(state): Extension<ApiState>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let outcome = state
        .notifier
        .check_and_notify(params.consume, params.dry_run)
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, &e.to_string()))?;

    Ok(Json(outcome))
}

/// Previews the pending queue without consuming it
#[axum::debug_handler]
pub async fn peek_tasks(
    Extension(state): Extension<ApiState>,
) -> Result<Json<Vec<TaskPreview>>, ApiError> {
    let previews = state
        .notifier
        .peek()
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, &e.to_string()))?;

    Ok(Json(previews))
}

fn notify_error(e: NotifyError) -> ApiError {
    match &e {
        NotifyError::UnknownAssignee(_) => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
        NotifyError::NotFound(_) => api_error(StatusCode::NOT_FOUND, &e.to_string()),
        NotifyError::NotResendable(_, _) => api_error(StatusCode::CONFLICT, &e.to_string()),
        NotifyError::Database(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Sends one operator-entered notification
#[axum::debug_handler]
pub async fn manual_send(
    Extension(state): Extension<ApiState>,
    Json(payload): Json<ManualSendRequest>,
) -> Result<Json<SendReport>, ApiError> {
    let report = state
        .notifier
        .send_manual(ManualTaskInput {
            titulo: payload.titulo,
            descripcion: payload.descripcion,
            asignado: payload.asignado,
            creador: payload.creador,
            proyecto: payload.proyecto,
        })
        .await
        .map_err(notify_error)?;

    Ok(Json(report))
}

/// Re-attempts delivery of a failed notification
#[axum::debug_handler]
pub async fn resend_notification(
    Path(id): Path<i32>,
    Extension(state): Extension<ApiState>,
) -> Result<Json<SendReport>, ApiError> {
    let report = state.notifier.resend(id).await.map_err(notify_error)?;
    Ok(Json(report))
}

/// Deletes a notification record; explicit operator action only
#[axum::debug_handler]
pub async fn delete_notification(
    Path(id): Path<i32>,
    Extension(state): Extension<ApiState>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.notifications_db.get_conn();
    let mut repo = NotificationRepository::new(&mut conn);

    let removed = repo
        .delete(id)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    if removed == 0 {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            &format!("notification {id} not found"),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Sends the same template to every number in an ad-hoc list
#[axum::debug_handler]
pub async fn broadcast(
    Extension(state): Extension<ApiState>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<BroadcastOutcome>, ApiError> {
    if !payload.variables.is_object() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "template variables must be a JSON object",
        ));
    }

    let outcome = state
        .broadcaster
        .send_to_all(&payload.numbers, &payload.variables)
        .await;

    Ok(Json(outcome))
}
