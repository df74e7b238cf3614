//! The aggregating market feed.
//!
//! A [`Feed`] owns an ordered chain of market providers and one FX provider.
//! Once started, a single background task polls them on two timers:
//!
//! ```text
//!  market tick ──> first available provider ──ok──> merge + project ──> listener
//!                        │ fail                                  (OK / fallback_active)
//!                        v
//!                  record cooldown, try next ──all failed──> cached coins (warning)
//!                                                          or no_data (error)
//!
//!  fx tick ──> fx provider ──ok──> replace rates (no event)
//! ```
//!
//! All shared state sits behind one `RwLock` that is never held across an
//! `.await`, so [`Feed::set_fiat`] can be called from any thread while the
//! worker is mid-fetch.

mod config;
mod diagnostics;
mod events;
mod health;
mod projection;
mod status;


pub use config::{
    FeedConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_FX_POLL_INTERVAL, DEFAULT_MARKET_POLL_INTERVAL,
};
pub use diagnostics::{AttemptOutcome, CycleReport, ProviderAttempt};
pub use events::{FeedEvent, FeedEventBus, FeedListener, NoopListener, DEFAULT_EVENT_CAPACITY};
pub use health::{failure_cooldown, ProviderHealth, ProviderHealthSnapshot, MAX_COOLDOWN};
pub use projection::{format_update_time, project};
pub use status::{StatusCode, StatusEvent, StatusKind};

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::errors::{FeedError, ProviderError};
use crate::models::{Coin, FiatCurrency, FxSnapshot, MarketSnapshot};
use crate::provider::{FxProvider, MarketProvider};

/// Mutable feed state, guarded as a whole.
#[derive(Debug)]
struct FeedState {
    currency: FiatCurrency,
    market: Option<MarketSnapshot>,
    fx: FxSnapshot,
    health: ProviderHealth,
}

struct Inner {
    market_providers: Vec<Arc<dyn MarketProvider>>,
    fx_provider: Arc<dyn FxProvider>,
    listener: Arc<dyn FeedListener>,
    config: FeedConfig,
    state: RwLock<FeedState>,
}

struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Multi-provider price feed with fallback, cooldowns and FX conversion.
pub struct Feed {
    inner: Arc<Inner>,
    worker: Mutex<Option<Worker>>,
}

impl Feed {
    /// Build a feed. Providers are tried in the order given.
    pub fn new(
        market_providers: Vec<Arc<dyn MarketProvider>>,
        fx_provider: Arc<dyn FxProvider>,
        listener: Arc<dyn FeedListener>,
        config: FeedConfig,
    ) -> Result<Self, FeedError> {
        if market_providers.is_empty() {
            return Err(FeedError::NoMarketProviders);
        }
        let config = config.normalized();
        let state = FeedState {
            currency: config.initial_currency,
            market: None,
            fx: FxSnapshot::usd_only(),
            health: ProviderHealth::new(),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                market_providers,
                fx_provider,
                listener,
                config,
                state: RwLock::new(state),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Start the background worker.
    ///
    /// Emits a LOADING status right away, then runs one FX and one market
    /// cycle before settling on the poll intervals. Calling `start` on a
    /// running feed does nothing.
    pub fn start(&self) -> Result<(), FeedError> {
        let mut worker = self.lock_worker();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            debug!("Feed already running");
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

        self.inner.listener.on_status(StatusEvent::loading());

        let (stop_tx, stop_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move { inner.run(stop_rx).await });
        *worker = Some(Worker { stop_tx, handle });

        info!(
            "Feed started with {} market provider(s), fx via {}",
            self.inner.market_providers.len(),
            self.inner.fx_provider.id()
        );
        Ok(())
    }

    /// Stop the worker and wait until it has exited.
    ///
    /// An in-flight fetch is allowed to finish (bounded by the fetch
    /// timeout). Calling `stop` on a stopped feed does nothing.
    pub async fn stop(&self) {
        let worker = self.lock_worker().take();
        let Some(worker) = worker else {
            return;
        };
        let _ = worker.stop_tx.send(true);
        if let Err(err) = worker.handle.await {
            warn!("Feed worker ended abnormally: {}", err);
        }
        info!("Feed stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Switch the display currency and re-emit the cached coins converted.
    ///
    /// Never touches the network. An unsupported code leaves the feed as it
    /// was.
    pub fn set_fiat(&self, code: &str) -> Result<(), FeedError> {
        let currency: FiatCurrency = code.parse()?;
        self.set_currency(currency);
        Ok(())
    }

    pub fn set_currency(&self, currency: FiatCurrency) {
        let coins = {
            let mut state = self.inner.write_state();
            state.currency = currency;
            projection::project(state.market.as_ref(), &state.fx, currency)
        };
        debug!("Display currency set to {}", currency);
        if let Some(coins) = coins {
            self.inner.listener.on_market_update(coins);
        }
    }

    pub fn current_fiat(&self) -> FiatCurrency {
        self.inner.read_state().currency
    }

    pub fn last_market(&self) -> Option<MarketSnapshot> {
        self.inner.read_state().market.clone()
    }

    pub fn last_fx(&self) -> FxSnapshot {
        self.inner.read_state().fx.clone()
    }

    /// Cached coins projected into the current currency.
    pub fn coins(&self) -> Option<Vec<Coin>> {
        let state = self.inner.read_state();
        projection::project(state.market.as_ref(), &state.fx, state.currency)
    }

    /// Cooldown state of every provider that has failed at least once.
    pub fn health(&self) -> Vec<ProviderHealthSnapshot> {
        self.inner.read_state().health.snapshot(Instant::now())
    }

    /// Run one market cycle immediately, outside the schedule.
    pub async fn refresh_market(&self) -> CycleReport {
        self.inner.run_market_cycle().await
    }

    /// Run one FX cycle immediately. Returns whether the rates were replaced.
    pub async fn refresh_fx(&self) -> bool {
        self.inner.run_fx_cycle().await
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(|poisoned| {
            warn!("Feed worker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        if let Some(worker) = self.lock_worker().take() {
            let _ = worker.stop_tx.send(true);
        }
    }
}

impl Inner {
    fn read_state(&self) -> RwLockReadGuard<'_, FeedState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Feed state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, FeedState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Feed state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        self.run_fx_cycle().await;
        self.run_market_cycle().await;

        let start = Instant::now();
        let market_every = self.config.market_poll_interval;
        let fx_every = self.config.fx_poll_interval;

        let mut market_tick = interval_at(start + market_every, market_every);
        market_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut fx_tick = interval_at(start + fx_every, fx_every);
        fx_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = fx_tick.tick() => {
                    self.run_fx_cycle().await;
                }
                _ = market_tick.tick() => {
                    self.run_market_cycle().await;
                }
            }
        }
        debug!("Feed worker exiting");
    }

    /// Walk the provider chain once.
    async fn run_market_cycle(&self) -> CycleReport {
        let mut report = CycleReport::new();
        let mut failures: Vec<ProviderError> = Vec::new();

        for (priority, provider) in self.market_providers.iter().enumerate() {
            let id = provider.id();
            let remaining = self
                .read_state()
                .health
                .cooldown_remaining(id, Instant::now());
            if let Some(remaining) = remaining {
                debug!("Skipping {}: cooling down for {:?}", id, remaining);
                report.record_skip(id, remaining);
                continue;
            }

            debug!("Fetching market data from {}", id);
            match self.fetch_market(provider.as_ref()).await {
                Ok(snapshot) => {
                    report.record_success(id, snapshot.len());
                    debug!("Market cycle: {}", report.summary());
                    self.apply_market_success(priority, id, snapshot);
                    return report;
                }
                Err(err) => {
                    let cooldown =
                        self.write_state()
                            .health
                            .record_failure(id, &err, Instant::now());
                    warn!("Provider {} failed ({}): {}", id, err.kind, err);
                    report.record_failure(id, err.kind, err.to_string(), cooldown);
                    failures.push(err);
                }
            }
        }

        debug!("Market cycle: {}", report.summary());
        if failures.is_empty() {
            info!("All market providers cooling down, waiting for the next window");
            self.listener.on_status(StatusEvent::loading());
        } else {
            self.apply_market_failure(failures);
        }
        report
    }

    async fn fetch_market(&self, provider: &dyn MarketProvider) -> Result<MarketSnapshot, ProviderError> {
        let deadline = self.config.fetch_timeout;
        let snapshot = tokio::time::timeout(deadline, provider.fetch_usd())
            .await
            .map_err(|_| {
                ProviderError::network(
                    provider.id(),
                    format!("fetch timed out after {}s", deadline.as_secs_f64()),
                )
            })??;
        if snapshot.is_empty() {
            return Err(ProviderError::other(provider.id(), "empty result set"));
        }
        Ok(snapshot)
    }

    fn apply_market_success(&self, priority: usize, provider: &str, mut snapshot: MarketSnapshot) {
        let coins = {
            let mut state = self.write_state();
            state.health.record_success(provider);
            if let Some(previous) = state.market.as_ref() {
                let patched = snapshot.backfill_changes(previous);
                if patched > 0 {
                    debug!("Back-filled 24h change for {} coin(s)", patched);
                }
            }
            state.market = Some(snapshot);
            projection::project(state.market.as_ref(), &state.fx, state.currency)
        };

        if let Some(coins) = coins {
            self.listener.on_market_update(coins);
        }
        if priority == 0 {
            self.listener.on_status(StatusEvent::ok(provider));
        } else {
            info!("Serving market data from fallback provider {}", provider);
            self.listener.on_status(
                StatusEvent::warning(StatusCode::FallbackActive).with_provider(provider),
            );
        }
    }

    fn apply_market_failure(&self, failures: Vec<ProviderError>) {
        let rate_limited = failures.iter().any(ProviderError::is_rate_limit);
        let last_provider = failures.last().map(|err| err.provider.clone());

        let cached = {
            let state = self.read_state();
            state
                .market
                .as_ref()
                .map(|market| projection::project(Some(market), &state.fx, state.currency))
        };

        match cached {
            Some(coins) => {
                let code = if rate_limited {
                    StatusCode::RateLimited
                } else {
                    StatusCode::OfflineCached
                };
                warn!(
                    "All {} attempted provider(s) failed, serving cached data ({})",
                    failures.len(),
                    code
                );
                if let Some(coins) = coins {
                    self.listener.on_market_update(coins);
                }
                let mut status = StatusEvent::warning(code);
                status.provider = last_provider;
                self.listener.on_status(status);
            }
            None => {
                let Some(err) = FeedError::combine(failures) else {
                    return;
                };
                warn!("No market data available: {}", err);
                let mut status = StatusEvent::error(StatusCode::NoData, err);
                status.provider = last_provider;
                self.listener.on_status(status);
            }
        }
    }

    /// Refresh exchange rates. Failures keep the previous snapshot.
    async fn run_fx_cycle(&self) -> bool {
        let provider = self.fx_provider.as_ref();
        let deadline = self.config.fetch_timeout;
        let result = match tokio::time::timeout(deadline, provider.fetch_rates()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::network(
                provider.id(),
                format!("fetch timed out after {}s", deadline.as_secs_f64()),
            )),
        };

        match result {
            Ok(mut fx) if !fx.rates.is_empty() => {
                fx.pin_base();
                debug!(
                    "FX rates updated from {} ({} currencies)",
                    provider.id(),
                    fx.rates.len()
                );
                self.write_state().fx = fx;
                true
            }
            Ok(_) => {
                warn!("FX provider {} returned no rates, keeping previous", provider.id());
                false
            }
            Err(err) => {
                warn!("FX refresh failed, keeping previous rates: {}", err);
                false
            }
        }
    }
}
