mod api;
mod middleware;

use anyhow::Context;
use storefront_client::CommerceClient;
use storefront_core::{AppConfig, Environment};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storefront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    require_credentials(&config)?;

    let client = CommerceClient::from_config(&config).context("failed to build catalog client")?;
    if !client.has_credentials() {
        tracing::warn!("no API credentials configured; upstream requests are anonymous");
    }
    let app = build_app(AppState::new(client, &config), rate_limit_state(&config));

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        upstream = %config.api_base_url,
        "starting storefront proxy"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The proxy exists to keep the credential server-side, so production
/// refuses to start without one.
fn require_credentials(config: &AppConfig) -> anyhow::Result<()> {
    if config.env == Environment::Production && config.credentials.is_none() {
        anyhow::bail!(
            "STOREFRONT_CONSUMER_KEY and STOREFRONT_CONSUMER_SECRET are required in production"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
