//! Output Budget - Response Size Limits
//!
//! Keeps a single tool result from flooding the client's context. An
//! oversized result is replaced by a small JSON notice instead of being cut
//! mid-document.

use serde_json::json;
use tracing::warn;

use super::SecurityError;

/// Default budget: 1 MiB of serialized output.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Output budget for limiting response sizes
#[derive(Debug, Clone, Copy)]
pub struct OutputBudget {
    max_bytes: usize,
}

impl OutputBudget {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check if response size is within budget
    pub fn check_size(&self, size: usize) -> Result<(), SecurityError> {
        if size > self.max_bytes {
            Err(SecurityError::OutputTooLarge {
                size,
                max: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Return `content` unchanged when it fits, otherwise a truncation notice.
    ///
    /// Returns (content, was_truncated)
    pub fn enforce(&self, content: String) -> (String, bool) {
        match self.check_size(content.len()) {
            Ok(()) => (content, false),
            Err(err) => {
                warn!("{}", err);
                let notice = json!({
                    "truncated": true,
                    "max_bytes": self.max_bytes,
                    "original_bytes": content.len(),
                    "message": "Response exceeded size limit. Add a LIMIT or filters.",
                });
                (notice.to_string(), true)
            }
        }
    }
}

impl Default for OutputBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESPONSE_BYTES)
    }
}
