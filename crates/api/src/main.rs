use std::sync::Arc;

use anyhow::Context;

use solidgate_api::app::{build_app, services};
use solidgate_infra::config::{GatewaySettings, load_config_file};

const CONFIG_ENV: &str = "SOLIDGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "solidgate.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    solidgate_observability::init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| {
        tracing::warn!("{CONFIG_ENV} not set; using {DEFAULT_CONFIG_PATH}");
        DEFAULT_CONFIG_PATH.to_string()
    });

    let config = load_config_file(&path).with_context(|| format!("loading {path}"))?;
    let settings = GatewaySettings::from_config(&config).context("reading server settings")?;
    let services = services::build_services(&config).context("building gateway services")?;

    let app = build_app(Arc::new(services), &settings);

    let listener = tokio::net::TcpListener::bind(settings.listen)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
