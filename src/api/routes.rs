//! API routes configuration module

use crate::api::handlers::{
    broadcast, check_tasks, delete_notification, get_thread, list_notifications, list_threads,
    manual_send, peek_tasks, resend_notification, send_reply,
};
use crate::api::ApiState;
use axum::{
    routing::{delete, get, post},
    Extension, Router,
};

/// Creates and configures the API router with all routes
pub fn app(state: ApiState) -> Router {
    Router::new()
        .route("/threads", get(list_threads))
        .route("/threads/:contact", get(get_thread))
        .route("/threads/:contact/reply", post(send_reply))
        .route("/notifications", get(list_notifications))
        .route("/notifications/check", post(check_tasks))
        .route("/notifications/peek", get(peek_tasks))
        .route("/notifications/manual", post(manual_send))
        .route("/notifications/:id/resend", post(resend_notification))
        .route("/notifications/:id", delete(delete_notification))
        .route("/broadcast", post(broadcast))
        .layer(Extension(state))
}
