//! accesslog server
//!
//! - `POST /user` records `name` with a server-side timestamp
//! - `GET /user?name=...` lists recorded timestamps (`--sqlite` only)
//! - `GET /hello`, `GET /metrics`, `GET /healthz`

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use accesslog_core::error::{AccessLogError, Result};
use accesslog_server::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(config::Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "accesslog-server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: config::Args) -> Result<()> {
    let cfg = config::from_args(args)?;
    let listen = cfg.listen_addr()?;

    tracing::info!(
        %listen,
        backend = cfg.backend.as_str(),
        sqlite_db = %cfg.storage.sqlite_db.display(),
        server_log = %cfg.storage.server_log.display(),
        "accesslog-server starting"
    );

    let state = app_state::AppState::new(cfg).await?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| AccessLogError::Startup(format!("bind {listen}: {e}")))?;

    tracing::info!(%listen, "ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AccessLogError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
