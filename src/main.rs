use anyhow::Result;
use fleetpulse::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

const LOG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    let once = std::env::args().skip(1).any(|a| a == "--once");

    if once {
        // One pass: report JSON on stdout, logs on stderr.
        let report = report_worker::run_one_tick(&app_config).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        samples_path = %app_config.input.samples_path,
        "fleetpulse starting"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = report_worker::spawn(app_config, shutdown_rx);

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;

    Ok(())
}
