//! One-shot flash messages shown on the next rendered page.

use serde::{Deserialize, Serialize};

/// Severity of a flash message.
///
/// Serialized in lowercase so templates can use it directly as a CSS
/// class suffix (`flash-success`, `flash-danger`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// The requested operation completed.
    Success,
    /// Neutral information.
    Info,
    /// The request was rejected or failed.
    Danger,
}

/// A message queued for display on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity of the message.
    pub level: FlashLevel,
    /// Human-readable text.
    pub message: String,
}

impl Flash {
    /// Create a success flash.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// Create an informational flash.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    /// Create an error flash.
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_serializes_lowercase() {
        let flash = Flash::danger("Please login first");
        let value = serde_json::to_value(&flash).unwrap_or_default();
        assert_eq!(value["level"], "danger");
        assert_eq!(value["message"], "Please login first");
    }
}
