//! Request de-duplication guard
//!
//! Rejects a repeat of the same action by the same actor inside a cooldown
//! window. Keys are `actor:action[:hash8]`, where `hash8` is the first 8 hex
//! characters of SHA-256 over the JSON payload.
//!
//! This only protects against double submits. Stock and state consistency
//! come from the command transaction.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GuardError {
    #[error("Repeated request, retry after {} ms", retry_after.as_millis())]
    TooSoon { retry_after: Duration },
}

/// Cooldown tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardTier {
    Default,
    /// Create order, serve, pay, refund
    Critical,
    /// Add items, create invoice
    Form,
}

impl GuardTier {
    /// Tier for a command action name
    pub fn for_action(action: &str) -> Self {
        match action {
            "create_order" | "serve_order" | "pay_invoice" | "refund_invoice" => Self::Critical,
            "add_items" | "create_invoice" => Self::Form,
            _ => Self::Default,
        }
    }
}

/// Cooldown settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardCooldowns {
    pub default: Duration,
    pub critical: Duration,
    pub form: Duration,
    /// Records older than this are dropped by `sweep`
    pub retention: Duration,
}

impl Default for GuardCooldowns {
    fn default() -> Self {
        Self {
            default: Duration::from_millis(500),
            critical: Duration::from_millis(2000),
            form: Duration::from_millis(1000),
            retention: Duration::from_secs(300),
        }
    }
}

impl GuardCooldowns {
    pub fn for_tier(&self, tier: GuardTier) -> Duration {
        match tier {
            GuardTier::Default => self.default,
            GuardTier::Critical => self.critical,
            GuardTier::Form => self.form,
        }
    }
}

/// Build a guard key
pub fn guard_key<P: Serialize + ?Sized>(actor_id: i64, action: &str, payload: Option<&P>) -> String {
    let hash8 = payload
        .and_then(|p| serde_json::to_vec(p).ok())
        .map(|bytes| {
            let digest = hex::encode(Sha256::digest(&bytes));
            digest[..8].to_string()
        });
    match hash8 {
        Some(h) => format!("{}:{}:{}", actor_id, action, h),
        None => format!("{}:{}", actor_id, action),
    }
}

/// Per-actor cooldown tracker
#[derive(Debug, Default)]
pub struct RequestGuard {
    records: DashMap<String, Instant>,
    cooldowns: GuardCooldowns,
}

impl RequestGuard {
    pub fn new(cooldowns: GuardCooldowns) -> Self {
        Self {
            records: DashMap::new(),
            cooldowns,
        }
    }

    /// Reject when `key` was recorded within the tier's cooldown, otherwise
    /// record it now
    pub fn check_and_record(&self, key: &str, tier: GuardTier) -> Result<(), GuardError> {
        let cooldown = self.cooldowns.for_tier(tier);
        match self.records.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let elapsed = entry.get().elapsed();
                if elapsed < cooldown {
                    return Err(GuardError::TooSoon {
                        retry_after: cooldown - elapsed,
                    });
                }
                entry.insert(Instant::now());
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
            }
        }
        Ok(())
    }

    pub fn clear(&self, key: &str) {
        self.records.remove(key);
    }

    /// Run `f` under the guard; a failed `f` clears the record so the actor
    /// can retry right away
    pub fn guarded<P, T, E>(
        &self,
        actor_id: i64,
        action: &str,
        payload: Option<&P>,
        tier: GuardTier,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        P: Serialize + ?Sized,
        E: From<GuardError>,
    {
        let key = guard_key(actor_id, action, payload);
        if let Err(e) = self.check_and_record(&key, tier) {
            tracing::debug!(key = %key, "Request rejected by guard");
            return Err(e.into());
        }
        let result = f();
        if result.is_err() {
            self.clear(&key);
        }
        result
    }

    /// Remove every record of an actor
    pub fn clear_actor(&self, actor_id: i64) {
        let prefix = format!("{}:", actor_id);
        self.records.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Drop records older than the retention window, returns how many
    pub fn sweep(&self) -> usize {
        let before = self.records.len();
        let retention = self.cooldowns.retention;
        self.records.retain(|_, at| at.elapsed() < retention);
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RequestGuard {
        RequestGuard::new(GuardCooldowns {
            default: Duration::from_millis(50),
            critical: Duration::from_secs(10),
            form: Duration::from_secs(10),
            retention: Duration::from_millis(30),
        })
    }

    #[test]
    fn test_key_format() {
        assert_eq!(guard_key::<()>(7, "serve_order", None), "7:serve_order");
        let key = guard_key(7, "pay_invoice", Some(&serde_json::json!({"amount": "10"})));
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 8);
        assert_eq!(
            key,
            guard_key(7, "pay_invoice", Some(&serde_json::json!({"amount": "10"})))
        );
        assert_ne!(
            key,
            guard_key(7, "pay_invoice", Some(&serde_json::json!({"amount": "11"})))
        );
    }

    #[test]
    fn test_repeat_within_cooldown_is_rejected() {
        let guard = guard();
        guard.check_and_record("1:serve_order", GuardTier::Critical).unwrap();
        match guard.check_and_record("1:serve_order", GuardTier::Critical) {
            Err(GuardError::TooSoon { retry_after }) => {
                assert!(retry_after > Duration::from_secs(9));
            }
            other => panic!("expected TooSoon, got {:?}", other),
        }
        // Another actor is independent
        guard.check_and_record("2:serve_order", GuardTier::Critical).unwrap();
    }

    #[test]
    fn test_default_cooldown_expires() {
        let guard = guard();
        guard.check_and_record("1:mark_item_ready", GuardTier::Default).unwrap();
        std::thread::sleep(Duration::from_millis(60));
        guard.check_and_record("1:mark_item_ready", GuardTier::Default).unwrap();
    }

    #[derive(Debug, PartialEq)]
    enum TestError {
        Guard(GuardError),
        Failed,
    }

    impl From<GuardError> for TestError {
        fn from(e: GuardError) -> Self {
            TestError::Guard(e)
        }
    }

    #[test]
    fn test_failure_clears_record() {
        let guard = guard();
        let failed: Result<(), TestError> =
            guard.guarded::<(), _, _>(1, "pay_invoice", None, GuardTier::Critical, || {
                Err(TestError::Failed)
            });
        assert_eq!(failed, Err(TestError::Failed));

        let ok: Result<u32, TestError> =
            guard.guarded::<(), _, _>(1, "pay_invoice", None, GuardTier::Critical, || Ok(5));
        assert_eq!(ok, Ok(5));

        let blocked: Result<u32, TestError> =
            guard.guarded::<(), _, _>(1, "pay_invoice", None, GuardTier::Critical, || Ok(6));
        assert!(matches!(blocked, Err(TestError::Guard(GuardError::TooSoon { .. }))));
    }

    #[test]
    fn test_clear_actor_and_sweep() {
        let guard = guard();
        guard.check_and_record("1:serve_order", GuardTier::Critical).unwrap();
        guard.check_and_record("1:add_items", GuardTier::Form).unwrap();
        guard.check_and_record("12:serve_order", GuardTier::Critical).unwrap();

        guard.clear_actor(1);
        assert_eq!(guard.len(), 1);

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(guard.sweep(), 1);
        assert!(guard.is_empty());
    }

    #[test]
    fn test_tiers_for_actions() {
        assert_eq!(GuardTier::for_action("pay_invoice"), GuardTier::Critical);
        assert_eq!(GuardTier::for_action("add_items"), GuardTier::Form);
        assert_eq!(GuardTier::for_action("mark_item_ready"), GuardTier::Default);
    }
}
