mod history;
mod preferences;
mod session;

pub use history::HistoryEntry;
pub use preferences::{FeatureFlag, FeatureFlags, ToolHint, ToolHints};
pub use session::SessionMetric;
