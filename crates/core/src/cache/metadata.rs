use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Last successful refresh of one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshEntry {
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Contents of the shared metadata file, keyed by uppercased ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshMetadata {
    #[serde(default)]
    pub last_updated: BTreeMap<String, RefreshEntry>,
}

impl RefreshMetadata {
    /// Initial metadata: the default ticker with a refresh at epoch 0.
    pub fn initial(default_ticker: &str) -> Self {
        let mut last_updated = BTreeMap::new();
        last_updated.insert(default_ticker.to_string(), RefreshEntry { timestamp: 0 });
        Self { last_updated }
    }

    pub fn timestamp(&self, key: &str) -> Option<i64> {
        self.last_updated.get(key).map(|entry| entry.timestamp)
    }

    pub fn set_timestamp(&mut self, key: &str, timestamp: i64) {
        self.last_updated
            .insert(key.to_string(), RefreshEntry { timestamp });
    }
}
