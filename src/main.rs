use std::{error::Error, sync::Arc};

use task_api::{
    app_state::AppState, data_access::data_context::DataContext, map_routes, settings::Settings,
};
use tokio::{net::TcpListener, signal};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    // ── Boot ───────────────────────────────────────────────────
    let settings = Settings::load()?;
    let data_context = DataContext::new(&settings.database_path)?;

    if data_context.ensure_default_user(&settings)? {
        info!(username = %settings.default_admin_username, "created default admin user");
    }

    // ── Router ─────────────────────────────────────────────────
    let addr = format!("{}:{}", settings.tcp_socket_binding, settings.tcp_socket_port);
    let state = Arc::new(AppState::new(data_context, settings));
    let app = map_routes(state);

    // ── Start ──────────────────────────────────────────────────
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "server running");
    info!("  Tasks: http://{addr}/api/tasks");
    info!("  Login: POST http://{addr}/api/auth/login");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(not(feature = "profile-console"))]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[cfg(feature = "profile-console")]
fn init_tracing() {
    console_subscriber::init();
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
