pub mod io;

use crate::session::EditMode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub edit_mode: EditMode,
    /// Editor command for external edits, used when neither `$VISUAL`
    /// nor `$EDITOR` is set.
    pub editor: Option<String>,
    pub log_filter: String,
    pub enforce_foreign_keys: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            edit_mode: EditMode::default(),
            editor: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            enforce_foreign_keys: true,
        }
    }
}
