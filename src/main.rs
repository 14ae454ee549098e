//! Aegis Bank - service entry point
//!
//! Wiring order: config, logging, collaborators (rates, notifications),
//! service graph, gateway.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use aegis_bank::config::AppConfig;
use aegis_bank::fx::{FixedRateSource, FxCache, RateSource};
use aegis_bank::gateway;
use aegis_bank::gateway::state::AppState;
use aegis_bank::logging::init_logging;
use aegis_bank::money::Currency;
use aegis_bank::notify::{ChannelSink, Notification};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Static rate table from config, wrapped in the TTL cache.
fn build_rates(config: &AppConfig) -> Arc<dyn RateSource> {
    let mut source = FixedRateSource::new();
    for entry in &config.fx.rates {
        match entry.rate.parse::<Decimal>() {
            Ok(rate) => {
                source = source.with_rate(
                    Currency::new(entry.from.clone()),
                    Currency::new(entry.to.clone()),
                    rate,
                );
            }
            Err(_) => warn!(from = %entry.from, to = %entry.to, "skipping unparsable rate"),
        }
    }
    Arc::new(FxCache::new(Arc::new(source), config.fx.cache_ttl_secs))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);
    info!("starting aegis_bank (env={})", env);

    let rates = build_rates(&config);

    // Delivery collaborator: events drain to the log here; a real
    // deployment hangs email/push delivery off this receiver.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Notification>();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Notification::StatusChange {
                    entity_id,
                    old_status,
                    new_status,
                } => info!(%entity_id, %old_status, %new_status, "status change"),
                Notification::OtpIssued { owner_id, .. } => {
                    info!(owner_id, "otp code issued (delivery elided from logs)")
                }
                Notification::CodeRequested {
                    owner_id,
                    code_type,
                } => info!(owner_id, %code_type, "transfer code requested"),
            }
        }
    });
    let sink = Arc::new(ChannelSink::new(tx));

    let state = AppState::assemble(&config.preauth, rates, sink);
    gateway::serve(state, &config.gateway).await
}
