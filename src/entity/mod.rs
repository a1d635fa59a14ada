mod category;
mod prompt;

pub use category::{Category, UNCATEGORIZED};
pub use prompt::{Prompt, PromptDraft};

use chrono::Utc;
use uuid::Uuid;

/// Milliseconds since the Unix epoch, the unit of every stored timestamp.
pub type Timestamp = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Fresh opaque identifier for a new entity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
