//! Long-poll synchronization types
//!
//! Dashboards poll a channel with the digest they last observed. The server
//! answers immediately when the digest differs, otherwise it waits until the
//! channel changes or the timeout elapses.

use serde::{Deserialize, Serialize};

/// Audience channel for change detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SyncChannel {
    /// Orders and line items visible to the kitchen
    Kitchen,
    /// Product stock levels visible to waiters
    Stock,
}

impl SyncChannel {
    pub const ALL: [SyncChannel; 2] = [SyncChannel::Kitchen, SyncChannel::Stock];

    pub fn name(&self) -> &'static str {
        match self {
            SyncChannel::Kitchen => "kitchen",
            SyncChannel::Stock => "stock",
        }
    }
}

impl std::fmt::Display for SyncChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a poll call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollResult<T> {
    pub changed: bool,
    pub digest: String,
    /// Channel version at the time the digest was computed
    pub version: u64,
    /// Present only when `changed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<T>,
}

impl<T> PollResult<T> {
    pub fn changed(digest: String, version: u64, snapshot: T) -> Self {
        Self {
            changed: true,
            digest,
            version,
            snapshot: Some(snapshot),
        }
    }

    pub fn unchanged(digest: String, version: u64) -> Self {
        Self {
            changed: false,
            digest,
            version,
            snapshot: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_has_no_snapshot() {
        let result: PollResult<Vec<u8>> = PollResult::unchanged("abc".to_string(), 3);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["changed"], false);
        assert!(json.get("snapshot").is_none());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(SyncChannel::Kitchen.to_string(), "kitchen");
        assert_eq!(
            serde_json::to_string(&SyncChannel::Stock).unwrap(),
            "\"stock\""
        );
    }
}
