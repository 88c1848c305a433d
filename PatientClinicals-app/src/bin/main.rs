use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::signal;
use tracing::{info, warn};

use patient_clinicals_app::{logging, shell, App, AppConfig};
use patient_clinicals_data::HttpPatientApi;

/// Entry point of the patient clinicals terminal client
///
/// Reads configuration, sets up tracing, connects the HTTP client and runs
/// the shell on stdin/stdout until `quit`, end of input or Ctrl+C.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let config = AppConfig::from_env().context("Invalid configuration")?;
    logging::init(&config.log_filter);

    info!("Starting patient clinicals client against {}", config.base_url);

    let api = HttpPatientApi::new(&config.base_url, config.request_timeout)
        .context("Failed to create the patient services client")?;

    let mut app = App::new(Arc::new(api));
    app.open("/").await;

    shell::run(&mut app, tokio::io::stdin(), tokio::io::stdout(), shutdown_signal())
        .await
        .context("Terminal I/O failed")?;

    info!("Client shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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

    info!("Shutting down client...");
}
