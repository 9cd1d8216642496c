/// API error types and handling
pub mod errors;
/// HTTP handlers for the operator surface
pub mod handlers;
/// Routes configuration and setup
pub mod routes;
/// HTTP server implementation
pub mod server;

use crate::clients::RelayClient;
use crate::core::{Broadcaster, TaskNotifier};
use crate::db::Database;
use std::sync::Arc;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct ApiState {
    /// Bot message mirror (read-only)
    pub messages_db: Database,
    /// Service database with the notification records
    pub notifications_db: Database,
    pub notifier: Arc<TaskNotifier>,
    pub relay: Arc<RelayClient>,
    pub broadcaster: Arc<Broadcaster>,
    /// The provider's own sender address, normalized; disambiguates
    /// thread direction
    pub provider_sender: String,
    /// Default bot pause after a manual reply, in minutes
    pub pause_minutes: u32,
}
