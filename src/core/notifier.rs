use crate::clients::{MessageSender, PendingTask, TaskSourceClient};
use crate::constants::*;
use crate::core::{AssigneeDirectory, NotificationStatus};
use crate::db::{Database, NewTaskNotification, NotificationRepository, TaskNotification};
use crate::errors::FetchError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one batch run, for operator display.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    /// Correlation id for this run, also present in the logs
    pub run_id: String,
    pub fetched: usize,
    pub sent: usize,
    pub failed: usize,
    /// Tasks whose assignee had no configured number; no record is
    /// created for these
    pub skipped: usize,
    pub dry_run: bool,
    /// One line per task, in processing order
    pub details: Vec<String>,
}

/// One task of a peeked queue with its would-be destination.
#[derive(Debug, Serialize)]
pub struct TaskPreview {
    pub id: Option<String>,
    pub titulo: String,
    pub asignado: String,
    pub creador: String,
    /// Directory number the notification would go to, if any
    pub destination: Option<String>,
}

/// Structured result of a manual send or resend. A failed delivery is a
/// report with status `failed`, not an error: the record exists either way.
#[derive(Debug, Serialize)]
pub struct SendReport {
    pub id: i32,
    pub status: String,
    pub enviado_a: String,
    pub twilio_sid: Option<String>,
    pub error_message: Option<String>,
}

/// Operator-entered fields for a manual notification.
#[derive(Debug, Clone)]
pub struct ManualTaskInput {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub asignado: String,
    pub creador: Option<String>,
    pub proyecto: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no configured number for '{0}'")]
    UnknownAssignee(String),
    #[error("notification {0} not found")]
    NotFound(i32),
    #[error("notification {0} is '{1}', only failed notifications can be resent")]
    NotResendable(i32, String),
    #[error("database error: {0}")]
    Database(#[from] crate::errors::Error),
}

/// Drives the pending-task to persisted-record to outbound-send to
/// status-update pipeline for batch runs, manual sends and resends.
pub struct TaskNotifier {
    db: Database,
    task_source: TaskSourceClient,
    sender: Arc<dyn MessageSender>,
    directory: AssigneeDirectory,
    send_delay: Duration,
    /// Serializes batch runs within this process. Two concurrent runs
    /// would double-fetch and double-send; cross-process invocations
    /// remain the operator's responsibility.
    batch_lock: Mutex<()>,
}

impl TaskNotifier {
    pub fn new(
        db: Database,
        task_source: TaskSourceClient,
        sender: Arc<dyn MessageSender>,
        directory: AssigneeDirectory,
        send_delay: Duration,
    ) -> Self {
        TaskNotifier {
            db,
            task_source,
            sender,
            directory,
            send_delay,
            batch_lock: Mutex::new(()),
        }
    }

    /// Fetches the pending queue and notifies each task's assignee.
    ///
    /// An upstream fetch failure aborts the whole run with zero side
    /// effects; a single task's send failure is recorded on its row and
    /// never stops the rest of the batch.
    pub async fn check_and_notify(
        &self,
        consume: bool,
        dry_run: bool,
    ) -> Result<BatchOutcome, FetchError> {
        let _guard = self.batch_lock.lock().await;

        let batch = self.task_source.fetch(consume).await?;
        Ok(self.process_batch(batch.tasks, dry_run).await)
    }

    /// Previews the queue without consuming it, resolving each task's
    /// destination against the directory.
    pub async fn peek(&self) -> Result<Vec<TaskPreview>, FetchError> {
        let batch = self.task_source.fetch(false).await?;
        Ok(batch.tasks.iter().map(|t| self.preview(t)).collect())
    }

    fn preview(&self, task: &PendingTask) -> TaskPreview {
        let asignado = task
            .asignado
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_string());
        TaskPreview {
            id: task.id.clone(),
            titulo: task
                .titulo
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            destination: self.directory.lookup(&asignado).map(str::to_string),
            creador: task
                .creador
                .clone()
                .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            asignado,
        }
    }

    /// Processes an already-fetched batch. Public so callers that obtained
    /// tasks elsewhere (and tests) can drive the same pipeline.
    pub async fn process_batch(&self, tasks: Vec<PendingTask>, dry_run: bool) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            run_id: Uuid::new_v4().to_string(),
            fetched: tasks.len(),
            dry_run,
            ..Default::default()
        };
        info!(
            "processing batch {} with {} task(s)",
            outcome.run_id, outcome.fetched
        );

        let total = tasks.len();
        for (index, task) in tasks.into_iter().enumerate() {
            let asignado = task
                .asignado
                .clone()
                .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_string());
            let titulo = task
                .titulo
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string());

            let Some(phone) = self.directory.lookup(&asignado).map(str::to_string) else {
                warn!("no configured number for '{}', task skipped", asignado);
                outcome.skipped += 1;
                outcome
                    .details
                    .push(format!("{titulo} -> '{asignado}' has no configured number"));
                continue;
            };

            if dry_run {
                outcome.sent += 1;
                outcome
                    .details
                    .push(format!("[dry-run] {titulo} -> {asignado} ({phone})"));
                continue;
            }

            match self.deliver(&task, &asignado, &phone).await {
                Ok(_) => {
                    outcome.sent += 1;
                    outcome.details.push(format!("{titulo} -> {asignado}"));
                }
                Err(reason) => {
                    outcome.failed += 1;
                    outcome
                        .details
                        .push(format!("{titulo} -> {asignado}: {reason}"));
                }
            }

            // deliberate throttle between sends for the provider's rate
            // limits, not between skips
            if index + 1 < total && !dry_run {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        info!(
            "batch {} done: {} sent, {} failed, {} skipped",
            outcome.run_id, outcome.sent, outcome.failed, outcome.skipped
        );
        outcome
    }

    /// Creates the pending record, attempts the send and applies the
    /// outcome to the same row.
    async fn deliver(
        &self,
        task: &PendingTask,
        asignado: &str,
        phone: &str,
    ) -> Result<String, String> {
        let record = {
            let mut conn = self.db.get_conn();
            let mut repo = NotificationRepository::new(&mut conn);
            repo.insert_pending(NewTaskNotification::from_task(task, asignado, phone))
                .map_err(|e| e.to_string())?
        };

        let variables = template_variables(
            asignado,
            record.creador.as_str(),
            record.prioridad.as_str(),
            record.titulo.as_str(),
            record.descripcion.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
        );

        let sent = self.sender.send_template(phone, &variables).await;
        let mut conn = self.db.get_conn();
        let mut repo = NotificationRepository::new(&mut conn);

        match sent {
            Ok(sid) => {
                repo.mark_sent(record.id, &sid).map_err(|e| e.to_string())?;
                Ok(sid)
            }
            Err(err) => {
                let reason = err.to_string();
                if let Err(db_err) = repo.mark_failed(record.id, &reason) {
                    warn!("failed to record send error: {}", db_err);
                }
                Err(reason)
            }
        }
    }

    /// Sends a single operator-entered notification through the same
    /// persist → send → update path, without batch delay logic.
    pub async fn send_manual(&self, input: ManualTaskInput) -> Result<SendReport, NotifyError> {
        let phone = self
            .directory
            .lookup(&input.asignado)
            .map(str::to_string)
            .ok_or_else(|| NotifyError::UnknownAssignee(input.asignado.clone()))?;

        let task = PendingTask {
            titulo: Some(input.titulo),
            descripcion: input.descripcion,
            asignado: Some(input.asignado.clone()),
            creador: input.creador,
            proyecto: input.proyecto,
            ..PendingTask::default()
        };

        let record = {
            let mut conn = self.db.get_conn();
            let mut repo = NotificationRepository::new(&mut conn);
            repo.insert_pending(NewTaskNotification::from_task(&task, &input.asignado, &phone))?
        };

        self.attempt(record).await
    }

    /// Re-attempts delivery of a failed record with its original fields
    /// and previously resolved number; the assignee is not re-resolved.
    /// The same row is updated, never duplicated.
    pub async fn resend(&self, id: i32) -> Result<SendReport, NotifyError> {
        let record = {
            let mut conn = self.db.get_conn();
            let mut repo = NotificationRepository::new(&mut conn);
            repo.get(id)?.ok_or(NotifyError::NotFound(id))?
        };

        if record.status() != Some(NotificationStatus::Failed) {
            return Err(NotifyError::NotResendable(id, record.status.clone()));
        }

        self.attempt(record).await
    }

    /// Sends for an existing record and folds the outcome back into it.
    async fn attempt(&self, record: TaskNotification) -> Result<SendReport, NotifyError> {
        let variables = template_variables(
            record.asignado.as_str(),
            record.creador.as_str(),
            record.prioridad.as_str(),
            record.titulo.as_str(),
            record.descripcion.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
        );

        let sent = self.sender.send_template(&record.enviado_a, &variables).await;

        let mut conn = self.db.get_conn();
        let mut repo = NotificationRepository::new(&mut conn);

        match sent {
            Ok(sid) => {
                repo.mark_sent(record.id, &sid)?;
                Ok(SendReport {
                    id: record.id,
                    status: NotificationStatus::Sent.to_string(),
                    enviado_a: record.enviado_a,
                    twilio_sid: Some(sid),
                    error_message: None,
                })
            }
            Err(err) => {
                let reason = err.to_string();
                repo.mark_failed(record.id, &reason)?;
                Ok(SendReport {
                    id: record.id,
                    status: NotificationStatus::Failed.to_string(),
                    enviado_a: record.enviado_a,
                    twilio_sid: None,
                    error_message: Some(reason),
                })
            }
        }
    }
}

/// Maps a notification's fields onto the template's numbered slots.
pub fn template_variables(
    asignado: &str,
    creador: &str,
    prioridad: &str,
    titulo: &str,
    descripcion: &str,
) -> serde_json::Value {
    serde_json::json!({
        "1": asignado,
        "2": creador,
        "3": prioridad,
        "4": titulo,
        "5": descripcion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_slots_are_numbered_strings() {
        let vars = template_variables("Stiven", "Sistema", "Alta", "Llamar", "Hoy");
        assert_eq!(vars["1"], "Stiven");
        assert_eq!(vars["2"], "Sistema");
        assert_eq!(vars["3"], "Alta");
        assert_eq!(vars["4"], "Llamar");
        assert_eq!(vars["5"], "Hoy");
    }
}
