use std::time::Duration;

use sacco_portal::config::Config;
use sacco_portal::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How often idle sessions are swept from the store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sacco_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        version = sacco_portal::VERSION,
        backend = %config.api_base_url,
        "Starting {} portal on {}",
        config.org_name,
        config.address()
    );

    let host = config.host.clone();
    let port = config.port;
    let idle_timeout = config.session_idle_timeout;
    let (state, app) = server::build_app(config)?;

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_idle(idle_timeout);
            if purged > 0 {
                tracing::debug!(purged, "Idle sessions removed");
            }
        }
    });

    let (bound_port, handle) = server::serve(app, &host, port).await?;
    tracing::info!("Listening on http://{}:{}", host, bound_port);

    handle.await?;
    Ok(())
}
