//! Long-poll notifier
//!
//! A poll computes the channel digest right away. When it differs from the
//! client's last digest the snapshot is returned; otherwise the call waits
//! for a committed change (watch signal) or the re-check interval, whichever
//! comes first, until the deadline.

use super::fingerprint::{kitchen_digest, stock_digest};
use crate::orders::manager::ManagerResult;
use crate::orders::{OrdersManager, views};
use parking_lot::RwLock;
use serde::Serialize;
use shared::order::{KitchenBoard, StockBoard};
use shared::util::now_millis;
use shared::{PollResult, SyncChannel};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Poll timing settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollTimings {
    /// Used when the client supplies no timeout
    pub default_timeout: Duration,
    /// Upper bound for client-supplied timeouts
    pub max_timeout: Duration,
    pub kitchen_recheck: Duration,
    pub stock_recheck: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(25),
            max_timeout: Duration::from_secs(30),
            kitchen_recheck: Duration::from_millis(500),
            stock_recheck: Duration::from_millis(1000),
        }
    }
}

impl PollTimings {
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_timeout)
            .min(self.max_timeout)
    }

    pub fn recheck(&self, channel: SyncChannel) -> Duration {
        match channel {
            SyncChannel::Kitchen => self.kitchen_recheck,
            SyncChannel::Stock => self.stock_recheck,
        }
    }
}

/// Last digest computed for a channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastDigest {
    pub digest: String,
    pub computed_at: i64,
}

/// Change-detection notifier for kitchen and stock dashboards
#[derive(Debug)]
pub struct Notifier {
    manager: Arc<OrdersManager>,
    timings: PollTimings,
    last_seen: RwLock<BTreeMap<SyncChannel, LastDigest>>,
}

impl Notifier {
    pub fn new(manager: Arc<OrdersManager>, timings: PollTimings) -> Self {
        Self {
            manager,
            timings,
            last_seen: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn timings(&self) -> &PollTimings {
        &self.timings
    }

    /// Wait for the kitchen board to differ from `last_digest`
    pub async fn poll_kitchen(
        &self,
        last_digest: Option<&str>,
        timeout: Option<Duration>,
    ) -> ManagerResult<PollResult<KitchenBoard>> {
        self.poll(
            SyncChannel::Kitchen,
            last_digest,
            timeout,
            |manager| {
                let orders = manager.get_active_orders()?;
                Ok((kitchen_digest(&orders), orders))
            },
            |orders| views::kitchen_board(&orders, now_millis()),
        )
        .await
    }

    /// Wait for stock levels to differ from `last_digest`
    pub async fn poll_stock(
        &self,
        last_digest: Option<&str>,
        timeout: Option<Duration>,
    ) -> ManagerResult<PollResult<StockBoard>> {
        self.poll(
            SyncChannel::Stock,
            last_digest,
            timeout,
            |manager| {
                let products = manager.products()?;
                Ok((stock_digest(&products), products))
            },
            |products| {
                // Recent orders are display-only, not part of the digest
                let orders = self.manager.get_active_orders().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to load recent orders for stock board");
                    Vec::new()
                });
                views::stock_board(&products, &orders, now_millis())
            },
        )
        .await
    }

    async fn poll<D, T>(
        &self,
        channel: SyncChannel,
        last_digest: Option<&str>,
        timeout: Option<Duration>,
        load: impl Fn(&OrdersManager) -> ManagerResult<(String, D)>,
        render: impl FnOnce(D) -> T,
    ) -> ManagerResult<PollResult<T>> {
        let timeout = self.timings.effective_timeout(timeout);
        let recheck = self.timings.recheck(channel);
        let deadline = Instant::now() + timeout;
        let mut rx = self.manager.watch_channel(channel);

        loop {
            let version = *rx.borrow_and_update();
            let (digest, data) = load(&self.manager)?;
            self.remember(channel, &digest);

            if last_digest != Some(digest.as_str()) {
                tracing::debug!(%channel, version, "Poll returned change");
                return Ok(PollResult::changed(digest, version, render(data)));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(PollResult::unchanged(digest, version));
            }

            // Commit signal or re-check tick, whichever first
            if let Ok(Err(_)) = tokio::time::timeout(recheck.min(remaining), rx.changed()).await {
                tokio::time::sleep(recheck.min(remaining)).await;
            }
        }
    }

    fn remember(&self, channel: SyncChannel, digest: &str) {
        let mut last_seen = self.last_seen.write();
        last_seen.insert(
            channel,
            LastDigest {
                digest: digest.to_string(),
                computed_at: now_millis(),
            },
        );
    }

    /// Last digest computed per channel
    pub fn last_digests(&self) -> BTreeMap<SyncChannel, LastDigest> {
        self.last_seen.read().clone()
    }
}
