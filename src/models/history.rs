use serde::{Deserialize, Serialize};

use crate::vibe::VibeDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Local `HH:MM` at creation.
    pub time: String,
    pub vibe_name: String,
    pub trigger_text: String,
    /// Independent copy of the vibe at creation time.
    pub snapshot: VibeDescriptor,
}
