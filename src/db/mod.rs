mod message_repository;
mod models;
mod notification_repository;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

pub use message_repository::*;
pub use models::*;
pub use notification_repository::*;

use crate::errors::Error;

/// Pooled handle to one of the two SQLite databases: the bot's message
/// mirror (read-only here) or the service's own notification store.
#[derive(Clone, Debug)]
pub struct Database {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl Database {
    pub fn new(db_path: &str) -> Self {
        let manager = ConnectionManager::<SqliteConnection>::new(db_path);
        let pool = Pool::builder()
            .build(manager)
            .expect("Failed to create pool.");

        Database {
            pool: Arc::new(pool),
        }
    }

    pub fn get_conn(&self) -> PooledConnection<ConnectionManager<SqliteConnection>> {
        self.pool.get().expect("Failed to get connection")
    }
}

/// Creates the `task_notifications` table and its indexes if missing.
/// Ran once at startup against the notification store; the message mirror
/// is owned by the bot process and never touched.
pub fn ensure_notifications_schema(conn: &mut SqliteConnection) -> Result<(), Error> {
    conn.batch_execute(
        "CREATE TABLE IF NOT EXISTS task_notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id TEXT,
            titulo TEXT NOT NULL,
            descripcion TEXT,
            prioridad TEXT NOT NULL DEFAULT 'Alta',
            asignado TEXT NOT NULL,
            creador TEXT NOT NULL,
            proyecto TEXT,
            fecha_limite TEXT,
            enviado_a TEXT NOT NULL,
            twilio_sid TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            error_message TEXT,
            sent_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_task_notifications_task_id
            ON task_notifications (task_id);
        CREATE INDEX IF NOT EXISTS idx_task_notifications_status
            ON task_notifications (status);
        CREATE INDEX IF NOT EXISTS idx_task_notifications_enviado_a
            ON task_notifications (enviado_a);",
    )?;
    Ok(())
}
