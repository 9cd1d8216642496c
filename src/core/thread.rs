use crate::core::normalize_whatsapp;
use crate::db::Message;

/// Author of a thread entry, derived per read; the message row itself
/// carries no role field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadAuthor {
    /// Authored by the external WhatsApp contact
    Contact,
    /// Manual reply authored by a human operator through the relay
    Operator,
    /// Bot-generated reply attached to a row's `response` column
    Bot,
    /// Row from neither the provider sender nor the resolved contact.
    /// Legacy or inconsistent data; rendered flagged, never dropped.
    Unclassified,
}

/// One renderable line of a conversation thread.
#[derive(Debug, Clone)]
pub struct ThreadEntry {
    pub message_id: i32,
    pub author: ThreadAuthor,
    pub text: String,
    pub timestamp: String,
}

/// Normalizes an address for comparison, falling back to the trimmed raw
/// value when it does not match any phone rule. Unnormalizable rows must
/// still resolve and render.
fn canonical(value: &str) -> String {
    normalize_whatsapp(value).unwrap_or_else(|_| value.trim().to_string())
}

/// Determines which endpoint of a message row is the external contact.
///
/// If the row was sent from the provider's own number to somebody, the
/// contact is the recipient; otherwise it is the sender. This makes the
/// result invariant to which side happens to appear in `from` on the row.
pub fn resolve_contact(row: &Message, provider_sender: &str) -> String {
    let provider = canonical(provider_sender);
    let from = canonical(&row.from_number);

    match row.to_number.as_deref() {
        Some(to) if from == provider && !to.trim().is_empty() => canonical(to),
        _ => from,
    }
}

/// Classifies a row within the thread of `contact`.
pub fn classify(row: &Message, provider_sender: &str, contact: &str) -> ThreadAuthor {
    let provider = canonical(provider_sender);
    let from = canonical(&row.from_number);
    let to = row.to_number.as_deref().map(canonical);

    if from == contact {
        return ThreadAuthor::Contact;
    }

    let response_empty = row
        .response
        .as_deref()
        .map_or(true, |r| r.trim().is_empty());

    if from == provider && to.as_deref() == Some(contact) && response_empty {
        return ThreadAuthor::Operator;
    }

    ThreadAuthor::Unclassified
}

/// Assembles the renderable entries for one contact's thread.
///
/// `rows` must already be in timestamp-ascending order with id as the tie
/// breaker; the order is preserved, not re-sorted. Every row yields one
/// entry with its derived author; a non-empty `response` yields an
/// additional bot entry attached to the same row regardless of how the row
/// itself classified.
pub fn assemble(rows: &[Message], provider_sender: &str, contact: &str) -> Vec<ThreadEntry> {
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        entries.push(ThreadEntry {
            message_id: row.id,
            author: classify(row, provider_sender, contact),
            text: row.message.clone(),
            timestamp: row.timestamp.clone(),
        });

        if let Some(response) = row.response.as_deref() {
            if !response.trim().is_empty() {
                entries.push(ThreadEntry {
                    message_id: row.id,
                    author: ThreadAuthor::Bot,
                    text: response.to_string(),
                    timestamp: row.timestamp.clone(),
                });
            }
        }
    }

    entries
}

/// Collapses latest-message rows into one row per resolved contact,
/// keeping the newest row (highest id) for each.
///
/// The repository groups by the raw `from` column, so a contact whose
/// thread ends on an operator reply would otherwise surface twice: once
/// under their own number and once under the provider's.
pub fn index_by_contact(rows: Vec<Message>, provider_sender: &str) -> Vec<(String, Message)> {
    let mut index: Vec<(String, Message)> = Vec::new();

    for row in rows {
        let contact = resolve_contact(&row, provider_sender);
        match index.iter().position(|(existing, _)| *existing == contact) {
            Some(pos) => {
                if index[pos].1.id < row.id {
                    index[pos].1 = row;
                }
            }
            None => index.push((contact, row)),
        }
    }

    index
}
