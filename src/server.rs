use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::cache::cache_invalidation_middleware;
use crate::config::Config;
use crate::error_pages::{error_page_middleware, fallback_handler};
use crate::handlers;
use crate::state::AppState;
use crate::xsrf::xsrf_middleware;

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the backend client, loads the JS manifest, and assembles the full
/// middleware stack. Returns the shared state and a ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let static_path = config.static_path.clone();
    let state = AppState::new(config)?;
    tracing::info!(
        backend = state.api.base_url(),
        "Application state initialised"
    );

    let app = Router::new()
        .merge(handlers::routes())
        .fallback(fallback_handler)
        .nest_service("/static", ServeDir::new(&static_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cache_invalidation_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            xsrf_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_page_middleware,
        ))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the port actually bound (tests pass 0 for an OS-assigned port)
/// and a [`JoinHandle`] that resolves once the server has shut down after
/// Ctrl-C or SIGTERM.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind((host, port)).await?;
    let bound_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        match result {
            Ok(()) => tracing::info!("Server stopped"),
            Err(e) => tracing::error!("Server error: {}", e),
        }
    });

    Ok((bound_port, handle))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
