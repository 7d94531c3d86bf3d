//! Change detection for polling dashboards

pub mod fingerprint;
pub mod notifier;

pub use fingerprint::{kitchen_digest, stock_digest};
pub use notifier::{LastDigest, Notifier, PollTimings};
