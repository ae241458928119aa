use serde::{Deserialize, Serialize};

/// General notes that do not belong to a single domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Warning { message: String },

    DebugLog { message: String },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
