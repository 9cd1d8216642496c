use crate::db::models::Message;
use crate::errors::Error;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

/// Read-only repository over the bot's `messages` table.
pub struct MessageRepository<'a> {
    pub conn: &'a mut SqliteConnection,
}

impl<'a> MessageRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        MessageRepository { conn }
    }

    /// Returns the newest row of each `from` group, newest conversation
    /// first. Callers collapse these into per-contact threads with
    /// `core::index_by_contact`, since a thread's latest row can sit on
    /// either side of the conversation.
    pub fn latest_per_sender(&mut self) -> Result<Vec<Message>, Error> {
        use crate::schema::messages::dsl::*;

        let latest_ids: Vec<Option<i32>> = messages
            .group_by(from_number)
            .select(diesel::dsl::max(id))
            .load(self.conn)?;
        let latest_ids: Vec<i32> = latest_ids.into_iter().flatten().collect();

        let rows = messages
            .filter(id.eq_any(latest_ids))
            .order(timestamp.desc())
            .load::<Message>(self.conn)?;

        Ok(rows)
    }

    /// Fetches the full bidirectional thread for a contact: every row the
    /// contact sent or received, oldest first, insertion order breaking
    /// timestamp ties.
    pub fn thread(&mut self, contact: &str) -> Result<Vec<Message>, Error> {
        use crate::schema::messages::dsl::*;

        let rows = messages
            .filter(from_number.eq(contact).or(to_number.eq(contact)))
            .order((timestamp.asc(), id.asc()))
            .load::<Message>(self.conn)?;

        Ok(rows)
    }

    /// Counts every row of a contact's thread.
    pub fn count_for_contact(&mut self, contact: &str) -> Result<i64, Error> {
        use crate::schema::messages::dsl::*;

        let total = messages
            .filter(from_number.eq(contact).or(to_number.eq(contact)))
            .count()
            .get_result(self.conn)?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::connection::SimpleConnection;

    fn setup() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute(
            "CREATE TABLE messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                `from` TEXT NOT NULL,
                `to` TEXT,
                message TEXT NOT NULL,
                response TEXT,
                timestamp TEXT NOT NULL,
                message_type TEXT,
                num_media INTEGER,
                media_json TEXT,
                transcript TEXT,
                transcript_status TEXT
            );",
        )
        .unwrap();
        conn
    }

    fn insert(conn: &mut SqliteConnection, from: &str, to: Option<&str>, text: &str, ts: &str) {
        use crate::schema::messages::dsl::*;
        diesel::insert_into(messages)
            .values((
                from_number.eq(from),
                to_number.eq(to),
                message.eq(text),
                timestamp.eq(ts),
            ))
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn latest_per_sender_returns_one_row_per_from_group() {
        let mut conn = setup();
        insert(&mut conn, "whatsapp:+2000", None, "first", "2026-01-20T10:00:00Z");
        insert(&mut conn, "whatsapp:+2000", None, "second", "2026-01-20T11:00:00Z");
        insert(&mut conn, "whatsapp:+4000", None, "other", "2026-01-20T09:00:00Z");

        let mut repo = MessageRepository::new(&mut conn);
        let rows = repo.latest_per_sender().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].from_number, "whatsapp:+2000");
        assert_eq!(rows[0].message, "second");
        assert_eq!(rows[1].from_number, "whatsapp:+4000");
    }

    #[test]
    fn thread_spans_both_directions_in_order() {
        let mut conn = setup();
        insert(
            &mut conn,
            "whatsapp:+2000",
            Some("whatsapp:+1000"),
            "question",
            "2026-01-20T10:00:00Z",
        );
        insert(
            &mut conn,
            "whatsapp:+1000",
            Some("whatsapp:+2000"),
            "manual answer",
            "2026-01-20T10:05:00Z",
        );
        insert(&mut conn, "whatsapp:+4000", None, "unrelated", "2026-01-20T10:01:00Z");

        let mut repo = MessageRepository::new(&mut conn);
        let rows = repo.thread("whatsapp:+2000").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "question");
        assert_eq!(rows[1].message, "manual answer");
        assert_eq!(repo.count_for_contact("whatsapp:+2000").unwrap(), 2);
    }

    #[test]
    fn timestamp_ties_break_by_insertion_order() {
        let mut conn = setup();
        insert(&mut conn, "whatsapp:+2000", None, "a", "2026-01-20T10:00:00Z");
        insert(&mut conn, "whatsapp:+2000", None, "b", "2026-01-20T10:00:00Z");

        let mut repo = MessageRepository::new(&mut conn);
        let rows = repo.thread("whatsapp:+2000").unwrap();

        assert_eq!(rows[0].message, "a");
        assert_eq!(rows[1].message, "b");
    }
}
