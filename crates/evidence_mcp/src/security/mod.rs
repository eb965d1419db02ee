//! Response size limits.

mod output_budget;

pub use output_budget::{OutputBudget, DEFAULT_MAX_RESPONSE_BYTES};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Output too large: {size} bytes exceeds limit of {max} bytes")]
    OutputTooLarge { size: usize, max: usize },
}
