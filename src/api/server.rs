use crate::api::{routes, ApiState};
use std::net::SocketAddr;

/// Starts and runs the HTTP server for the operator surface
pub async fn launch_server(state: ApiState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
