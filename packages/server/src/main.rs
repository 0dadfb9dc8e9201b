use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::notify::FormspreeNotifier;
use server::payments::StripeGateway;
use server::state::AppState;
use server::{build_router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    if config.server.seed_demo {
        seed::seed_demo_data(&db).await?;
    }

    let payments = Arc::new(StripeGateway::from_config(&config.payments)?);
    let notifier = Arc::new(FormspreeNotifier::from_config(&config.notify)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        payments,
        notifier,
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
