use crate::clients::http_client;
use crate::constants::{TASKS_ENDPOINT, TASKS_PEEK_ENDPOINT};
use crate::errors::FetchError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One high-priority task as returned by the task-source API. Every field
/// is optional on the wire; fallbacks are applied when a record is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub prioridad: Option<String>,
    #[serde(default)]
    pub asignado: Option<String>,
    #[serde(default)]
    pub creador: Option<String>,
    #[serde(default)]
    pub proyecto: Option<String>,
    #[serde(default, rename = "fechaLimite")]
    pub fecha_limite: Option<String>,
}

/// Response envelope of both task endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TaskBatch {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub tasks: Vec<PendingTask>,
}

/// Client for the external task-management API.
#[derive(Debug, Clone)]
pub struct TaskSourceClient {
    base_url: String,
    timeout: Duration,
}

impl TaskSourceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        TaskSourceClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Fetches the pending task queue. With `consume` the tasks are
    /// removed from the upstream queue; without it this is a read-only
    /// peek used for previews.
    pub async fn fetch(&self, consume: bool) -> Result<TaskBatch, FetchError> {
        let endpoint = if consume {
            TASKS_ENDPOINT
        } else {
            TASKS_PEEK_ENDPOINT
        };
        let url = format!("{}{}", self.base_url, endpoint);

        let response = http_client()
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let batch: TaskBatch = response.json().await?;
        debug!("task source returned {} task(s)", batch.count);

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_fields_default_when_missing() {
        let task: PendingTask = serde_json::from_str(r#"{"titulo": "Revisar"}"#).unwrap();
        assert_eq!(task.titulo.as_deref(), Some("Revisar"));
        assert!(task.asignado.is_none());
        assert!(task.fecha_limite.is_none());
    }

    #[test]
    fn batch_envelope_parses_with_camel_case_deadline() {
        let batch: TaskBatch = serde_json::from_str(
            r#"{"count": 1, "tasks": [{"id": "T-9", "titulo": "Llamar cliente",
                "asignado": "Edgardo Pérez", "fechaLimite": "2026-02-01"}]}"#,
        )
        .unwrap();

        assert_eq!(batch.count, 1);
        assert_eq!(batch.tasks[0].fecha_limite.as_deref(), Some("2026-02-01"));
    }

    #[test]
    fn empty_envelope_defaults_to_zero_tasks() {
        let batch: TaskBatch = serde_json::from_str("{}").unwrap();
        assert_eq!(batch.count, 0);
        assert!(batch.tasks.is_empty());
    }
}
