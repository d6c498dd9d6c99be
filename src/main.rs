use std::net::SocketAddr;
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ticketera::{app, config::Config, AppState};

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&config.app.rust_log));
    if config.app.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    info!(
        environment = %config.app.environment,
        api = %config.api.base_url,
        credentials = ?config.api.credentials,
        "Starting Ticketera BFF"
    );

    let state = AppState::new(config.clone())?;
    let shutdown = CancellationToken::new();

    // --- Background: удаление простаивающих сессий ---
    let idle = Duration::from_secs(config.app.session_idle_seconds);
    let state_for_bg = state.clone();
    let stop = shutdown.clone();
    task::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = tokio::time::sleep(EVICTION_INTERVAL) => {
                    let evicted = state_for_bg.sessions.evict_idle(idle).await;
                    if evicted > 0 {
                        info!(evicted, "idle sessions evicted");
                    }
                }
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
