use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use edunexia::logging::{init_tracing, shutdown_tracer};
use edunexia::metrics::{init_metrics, metrics_app};
use edunexia::router::init_router;
use edunexia::state::init_app_state;
use edunexia_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics()? {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], server_config.metrics_port));
        let listener = tokio::net::TcpListener::bind(metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {}", metrics_addr))?;
        info!(%metrics_addr, "Metrics server listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let state = init_app_state().await?;
    let app = init_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "Server running");
    info!("Swagger UI available at http://localhost:{}/swagger-ui", server_config.port);
    info!("Scalar UI available at http://localhost:{}/scalar", server_config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
