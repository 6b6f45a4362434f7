use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use mms_relay::carrier::{GatewayResolver, create_lookup};
use mms_relay::config::RelayConfig;
use mms_relay::mailer::SmtpMailer;
use mms_relay::relay::TextRelay;
use mms_relay::routes::relay_routes;
use mms_relay::tables::{CarrierGatewayTable, MessageTemplateTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().context("Invalid configuration")?;

    // ── Static tables ────────────────────────────────────────────────────
    let templates = match &config.templates_path {
        Some(path) => MessageTemplateTable::from_json_file(path)
            .with_context(|| format!("Loading message templates from {}", path.display()))?,
        None => MessageTemplateTable::builtin(),
    };
    let gateways = match &config.gateways_path {
        Some(path) => CarrierGatewayTable::from_json_file(path)
            .with_context(|| format!("Loading carrier gateways from {}", path.display()))?,
        None => CarrierGatewayTable::builtin(),
    };
    tracing::info!(
        message_types = ?templates.message_types(),
        carriers = gateways.len(),
        "Lookup tables loaded"
    );

    // ── Collaborators ────────────────────────────────────────────────────
    let lookup = create_lookup(&config.lookup)?;
    let mailer = SmtpMailer::new(&config.smtp)?;
    tracing::info!(
        smtp = %format!("{}:{}", config.smtp.host, config.smtp.port),
        from = %config.smtp.from_address,
        "Mail relay configured"
    );

    let relay = TextRelay::new(
        Arc::new(templates),
        GatewayResolver::new(lookup, Arc::new(gateways)),
        Arc::new(mailer),
    );
    let app = relay_routes(Arc::new(relay));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("MMS relay listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
