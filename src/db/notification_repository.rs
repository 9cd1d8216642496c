use crate::core::NotificationStatus;
use crate::db::models::{NewTaskNotification, TaskNotification};
use crate::errors::Error;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

/// Repository for task notification records in the service database
pub struct NotificationRepository<'a> {
    pub conn: &'a mut SqliteConnection,
}

impl<'a> NotificationRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        NotificationRepository { conn }
    }

    /// Inserts a new `pending` record and returns it with its assigned id
    pub fn insert_pending(
        &mut self,
        record: NewTaskNotification,
    ) -> Result<TaskNotification, Error> {
        use crate::schema::task_notifications::dsl::*;

        diesel::insert_into(task_notifications)
            .values(&record)
            .execute(self.conn)?;

        let inserted = task_notifications
            .order(id.desc())
            .first::<TaskNotification>(self.conn)?;

        Ok(inserted)
    }

    /// Records a successful send: status `sent`, provider sid, send time.
    /// Clears any error left by a previous failed attempt.
    pub fn mark_sent(&mut self, notification_id: i32, sid: &str) -> Result<(), Error> {
        use crate::schema::task_notifications::dsl::*;
        let now = Utc::now().to_rfc3339();

        diesel::update(task_notifications.filter(id.eq(notification_id)))
            .set((
                status.eq(NotificationStatus::Sent.to_string()),
                twilio_sid.eq(sid),
                sent_at.eq(&now),
                error_message.eq(None::<String>),
                updated_at.eq(&now),
            ))
            .execute(self.conn)?;

        Ok(())
    }

    /// Records a failed send with the verbatim upstream error text
    pub fn mark_failed(&mut self, notification_id: i32, reason: &str) -> Result<(), Error> {
        use crate::schema::task_notifications::dsl::*;
        let now = Utc::now().to_rfc3339();

        diesel::update(task_notifications.filter(id.eq(notification_id)))
            .set((
                status.eq(NotificationStatus::Failed.to_string()),
                error_message.eq(reason),
                updated_at.eq(&now),
            ))
            .execute(self.conn)?;

        Ok(())
    }

    pub fn get(&mut self, notification_id: i32) -> Result<Option<TaskNotification>, Error> {
        use crate::schema::task_notifications::dsl::*;

        let found = task_notifications
            .filter(id.eq(notification_id))
            .first::<TaskNotification>(self.conn)
            .optional()?;

        Ok(found)
    }

    /// Lists records newest first, optionally filtered by status
    pub fn list(
        &mut self,
        filter_status: Option<&NotificationStatus>,
    ) -> Result<Vec<TaskNotification>, Error> {
        use crate::schema::task_notifications::dsl::*;

        let rows = match filter_status {
            Some(s) => task_notifications
                .filter(status.eq(s.to_string()))
                .order(created_at.desc())
                .load::<TaskNotification>(self.conn)?,
            None => task_notifications
                .order(created_at.desc())
                .load::<TaskNotification>(self.conn)?,
        };

        Ok(rows)
    }

    /// Deletes a record by id; the only deletion path, reserved for
    /// explicit operator action. Returns how many rows were removed.
    pub fn delete(&mut self, notification_id: i32) -> Result<usize, Error> {
        use crate::schema::task_notifications::dsl::*;

        let removed =
            diesel::delete(task_notifications.filter(id.eq(notification_id))).execute(self.conn)?;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_notifications_schema;

    fn setup() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        ensure_notifications_schema(&mut conn).unwrap();
        conn
    }

    fn pending(titulo: &str) -> NewTaskNotification {
        let now = Utc::now().to_rfc3339();
        NewTaskNotification {
            task_id: Some("T-1".to_string()),
            titulo: titulo.to_string(),
            descripcion: None,
            prioridad: "Alta".to_string(),
            asignado: "Stiven".to_string(),
            creador: "Sistema".to_string(),
            proyecto: None,
            fecha_limite: None,
            enviado_a: "573026444564".to_string(),
            status: NotificationStatus::Pending.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[test]
    fn insert_returns_the_row_with_its_id() {
        let mut conn = setup();
        let mut repo = NotificationRepository::new(&mut conn);

        let record = repo.insert_pending(pending("Revisar campaña")).unwrap();

        assert_eq!(record.status, "pending");
        assert_eq!(record.titulo, "Revisar campaña");
        assert!(record.twilio_sid.is_none());
        assert_eq!(repo.get(record.id).unwrap().unwrap().id, record.id);
    }

    #[test]
    fn mark_sent_sets_sid_and_clears_error() {
        let mut conn = setup();
        let mut repo = NotificationRepository::new(&mut conn);
        let record = repo.insert_pending(pending("t")).unwrap();

        repo.mark_failed(record.id, "provider down").unwrap();
        repo.mark_sent(record.id, "SM123").unwrap();

        let updated = repo.get(record.id).unwrap().unwrap();
        assert_eq!(updated.status, "sent");
        assert_eq!(updated.twilio_sid.as_deref(), Some("SM123"));
        assert!(updated.error_message.is_none());
        assert!(updated.sent_at.is_some());
    }

    #[test]
    fn mark_failed_keeps_the_verbatim_reason() {
        let mut conn = setup();
        let mut repo = NotificationRepository::new(&mut conn);
        let record = repo.insert_pending(pending("t")).unwrap();

        repo.mark_failed(record.id, "status 401: auth failed").unwrap();

        let updated = repo.get(record.id).unwrap().unwrap();
        assert_eq!(updated.status, "failed");
        assert_eq!(
            updated.error_message.as_deref(),
            Some("status 401: auth failed")
        );
    }

    #[test]
    fn list_filters_by_status() {
        let mut conn = setup();
        let mut repo = NotificationRepository::new(&mut conn);
        let a = repo.insert_pending(pending("a")).unwrap();
        let _b = repo.insert_pending(pending("b")).unwrap();
        repo.mark_failed(a.id, "boom").unwrap();

        let failed = repo.list(Some(&NotificationStatus::Failed)).unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, a.id);
        assert_eq!(repo.list(None).unwrap().len(), 2);
    }

    #[test]
    fn delete_reports_removed_rows() {
        let mut conn = setup();
        let mut repo = NotificationRepository::new(&mut conn);
        let record = repo.insert_pending(pending("t")).unwrap();

        assert_eq!(repo.delete(record.id).unwrap(), 1);
        assert_eq!(repo.delete(record.id).unwrap(), 0);
        assert!(repo.get(record.id).unwrap().is_none());
    }
}
