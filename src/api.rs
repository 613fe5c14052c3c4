use axum::Router;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::handler::{SharedState, recording::recording_router, system::system_router};

pub(crate) fn app_router(state: SharedState) -> Router {
    Router::new()
        .nest("/recording", recording_router())
        .nest("/system", system_router())
        .with_state(state)
}

pub(crate) async fn start_api_server(
    state: SharedState,
    cancel: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let listen = state.config.listen();
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", listen, e))?;
    log::info!("API server started on {}", listen);

    let app = app_router(state);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
        {
            log::error!("Error running API server: {}", e);
        }
    }))
}

async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
    log::info!("Shutting down API server...");
}
