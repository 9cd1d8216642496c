//! HTTP clients for the external collaborators: the task-source API, the
//! Twilio messaging API and the manual-reply relay.

mod relay;
mod task_source;
mod twilio;

pub use relay::*;
pub use task_source::*;
pub use twilio::*;

use once_cell::sync::Lazy;
use reqwest::Client;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Shared connection-pooling client; timeouts are applied per request
/// since each upstream has its own budget.
pub(crate) fn http_client() -> &'static Client {
    &HTTP_CLIENT
}
