//! Run the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;

use campuscard_common::config::AppConfig;
use campuscard_http::AppState;

pub async fn run(
    mut config: AppConfig,
    bind: Option<SocketAddr>,
    data: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(data) = data {
        config.data_file = data;
    }
    let addr = bind.unwrap_or(config.server.bind);

    println!("Records: {}", config.data_file.display());
    // Font loading reads from disk.
    let state = tokio::task::spawn_blocking(move || AppState::from_config(&config)).await??;

    println!("Serving on http://{addr}");
    campuscard_http::serve(addr, state).await?;
    Ok(())
}
