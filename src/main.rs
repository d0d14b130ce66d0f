use anyhow::Context;
use northwind_api::middleware::install_panic_hook;
use northwind_api::server::build_server;
use northwind_api::telemetry::{bootstrap_dispatch, build_dispatch};
use northwind_api::{AppState, Settings};
use std::net::TcpListener;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, Dispatch};

async fn run(settings: Settings, dispatch: Dispatch) -> anyhow::Result<()> {
    let (state, db) = AppState::connect(&settings)
        .await
        .context("Failed to initialize the database")?;

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Northwind service starting");

    let server = build_server(
        listener,
        state,
        dispatch,
        settings.allowed_origins(),
        settings.server_workers as usize,
    )?;

    let result = server.await;
    db.close().await;
    info!("Server stopped, database connections closed");

    result.context("Server failed")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Settings pick the log level and format, so loading them logs through a
    // fixed bootstrap dispatch.
    let settings = tracing::dispatcher::with_default(&bootstrap_dispatch(), || {
        info!("Starting Northwind backend service");
        Settings::load().map_err(|e| {
            error!(error = %e, "Failed to load configuration");
            e
        })
    })?;

    let dispatch = build_dispatch(&settings.log_level, &settings.log_format);
    install_panic_hook();

    let scope = dispatch.clone();
    async move {
        let result = run(settings, dispatch).await;
        if let Err(e) = &result {
            error!(error = ?e, "Northwind service terminated");
        }
        result
    }
    .with_subscriber(scope)
    .await
}
