//! Delivery of feed output to consumers.
//!
//! The feed calls a [`FeedListener`] from its worker task. Listeners must
//! return quickly; [`FeedEventBus`] is the stock implementation that hands
//! events to any number of async subscribers over a broadcast channel.

use tokio::sync::broadcast;

use crate::feed::status::StatusEvent;
use crate::models::Coin;

/// Default capacity of the event bus.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Receives market updates and status changes from a running feed.
pub trait FeedListener: Send + Sync {
    /// A freshly projected coin list, in display order.
    fn on_market_update(&self, _coins: Vec<Coin>) {}

    fn on_status(&self, _status: StatusEvent) {}
}

/// Listener that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl FeedListener for NoopListener {}

/// Event envelope carried by [`FeedEventBus`].
#[derive(Clone, Debug)]
pub enum FeedEvent {
    MarketUpdate(Vec<Coin>),
    Status(StatusEvent),
}

/// Broadcast bus that fans feed events out to subscribers.
#[derive(Clone)]
pub struct FeedEventBus {
    sender: broadcast::Sender<FeedEvent>,
}

impl FeedEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: FeedEvent) {
        // No subscribers and lagging subscribers are both fine here.
        let _ = self.sender.send(event);
    }
}

impl Default for FeedEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl FeedListener for FeedEventBus {
    fn on_market_update(&self, coins: Vec<Coin>) {
        self.publish(FeedEvent::MarketUpdate(coins));
    }

    fn on_status(&self, status: StatusEvent) {
        self.publish(FeedEvent::Status(status));
    }
}
