mod config;
mod format;
mod main_lib;

use config::Config;
use cryptoview_market_feed::FeedEventBus;
use main_lib::{build_feed, init_tracing, print_events};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let bus = FeedEventBus::default();
    let events = bus.subscribe();
    let feed = build_feed(&config, bus)?;

    let printer = tokio::spawn(print_events(events));
    feed.start()?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    feed.stop().await;
    printer.abort();
    Ok(())
}
