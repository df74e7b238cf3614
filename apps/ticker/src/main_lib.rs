use std::sync::Arc;

use cryptoview_market_feed::provider::{default_fx_provider, market_providers_by_ids};
use cryptoview_market_feed::{Feed, FeedEvent, FeedEventBus, StatusKind};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::format::format_coin;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_feed(config: &Config, bus: FeedEventBus) -> anyhow::Result<Arc<Feed>> {
    let providers = market_providers_by_ids(&config.providers, config.http_timeout)?;
    let fx = default_fx_provider(config.http_timeout);
    let feed = Feed::new(providers, fx, Arc::new(bus), config.feed_config())?;
    tracing::info!(
        "Market providers: {} (display currency {})",
        config.providers.join(" -> "),
        config.fiat
    );
    Ok(Arc::new(feed))
}

/// Print every market update as a table and log status changes.
pub async fn print_events(mut events: broadcast::Receiver<FeedEvent>) {
    loop {
        match events.recv().await {
            Ok(FeedEvent::MarketUpdate(coins)) => {
                println!();
                for coin in &coins {
                    println!("{}", format_coin(coin));
                }
            }
            Ok(FeedEvent::Status(status)) => match status.kind {
                StatusKind::Error => tracing::error!("Feed status: {}", status),
                StatusKind::Warning => tracing::warn!("Feed status: {}", status),
                StatusKind::Loading | StatusKind::Ok => tracing::info!("Feed status: {}", status),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Printer lagging, skipped {} event(s)", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
