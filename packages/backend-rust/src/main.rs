use reframe_backend::config::Config;
use reframe_backend::host;
use reframe_backend::logging::init_tracing;
use reframe_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = init_tracing(&config);

    let state = match AppState::start(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to start personalizers");
            std::process::exit(1);
        }
    };

    tracing::info!("reframe-backend reading commands from stdin");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    if let Err(e) = host::run(&state, stdin, stdout, shutdown_signal()).await {
        tracing::error!(error = %e, "command loop error");
    }

    tracing::info!("Command loop stopped, initiating graceful shutdown sequence");

    state.shutdown().await;

    tracing::info!("Graceful shutdown complete");
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
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
}
