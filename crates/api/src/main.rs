use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::config::{GatewayMode, ServerConfig};
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_gateway::{GatewayConfig, InMemoryGateway, RestGateway, SharedGateway};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio_api=debug,folio_gateway=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, mode = ?config.gateway_mode, "Loaded server configuration");

    // --- Gateway ---
    let gateway = build_gateway(config.gateway_mode);
    match gateway.health_check().await {
        Ok(()) => tracing::info!("Gateway health check passed"),
        Err(e) => tracing::warn!(error = %e, "Gateway health check failed, serving degraded"),
    }

    // --- App state ---
    let state = AppState::new(gateway, config.clone());
    let shutdown = state.shutdown.clone();

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Abandon gateway calls still pending in mounted list views.
            shutdown.cancel();
        })
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Construct the gateway selected by `GATEWAY_MODE`.
///
/// In `memory` mode, `MEMORY_ACCOUNT_EMAIL` and `MEMORY_ACCOUNT_PASSWORD`
/// register a sign-in account so the dashboard is usable locally.
fn build_gateway(mode: GatewayMode) -> SharedGateway {
    match mode {
        GatewayMode::Rest => {
            let config = GatewayConfig::from_env();
            tracing::info!(url = %config.url, table = %config.table, "Using REST gateway");
            Arc::new(RestGateway::new(config).expect("Failed to build gateway HTTP client"))
        }
        GatewayMode::Memory => {
            let gateway = InMemoryGateway::new();
            if let (Ok(email), Ok(password)) = (
                std::env::var("MEMORY_ACCOUNT_EMAIL"),
                std::env::var("MEMORY_ACCOUNT_PASSWORD"),
            ) {
                let user = gateway.add_account(&email, &password);
                tracing::info!(user_id = %user.id, %email, "Registered in-memory account");
            }
            tracing::warn!("Using in-memory gateway; data is lost on restart");
            Arc::new(gateway)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
