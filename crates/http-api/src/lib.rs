//! CampusCard HTTP API
//!
//! Axum routes for the export downloads:
//!
//! | Route | Response |
//! |---|---|
//! | `GET /export/id-cards?tenant=..&theme=..` | zip of ID card PNGs |
//! | `GET /export/images?tenant=..` | zip of student photos |
//! | `GET /export/excel?tenant=..` | `.xlsx` workbook |
//! | `GET /students?tenant=..` | JSON records |
//! | `GET /health` | liveness |
//!
//! Export bodies are streamed while they are produced.

pub mod api;
pub mod error;
pub mod stream;

use std::net::SocketAddr;

use campuscard_common::error::CampusCardResult;

pub use api::{router, AppState, FetcherFactory};
pub use error::ApiError;

/// Bind `addr` and serve until SIGINT or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> CampusCardResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "campuscard listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
