/**
 * livecount Server Entry Point
 *
 * Loads `.env`, initializes tracing, builds the app from the environment
 * and serves it until Ctrl-C. On shutdown open streams are ended, the
 * batch writer flushes what is left, and the writer report is logged.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use livecount::backend::server::create_app;
    use livecount::shared::AppConfig;
    use tracing_subscriber::EnvFilter;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("[Server] Starting livecount");

    let config = AppConfig::from_env()?;
    let addr = config.addr;
    let app = create_app(config).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Server] Listening on http://{}", listener.local_addr()?);

    let trigger = app.shutdown_handle();
    axum::serve(listener, app.router.clone())
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[Server] Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            trigger.trigger();
        })
        .await?;

    let report = app.shutdown().await;
    tracing::info!(
        "[Server] Writer report: {} batches committed, {} failed",
        report.batches_committed,
        report.batches_failed
    );

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin livecount-server --features ssr");
    std::process::exit(1);
}
