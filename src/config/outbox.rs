//! Outbox dispatcher configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Outbox dispatcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    /// How often the dispatcher runs, in seconds
    #[serde(default = "default_interval")]
    pub interval_in_seconds: u64,

    /// Maximum messages claimed per run
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl OutboxConfig {
    /// Validate outbox configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_in_seconds == 0 {
            return Err(ValidationError::InvalidOutboxInterval);
        }
        if self.batch_size == 0 {
            return Err(ValidationError::InvalidOutboxBatchSize);
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            interval_in_seconds: default_interval(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_interval() -> u64 {
    10
}

fn default_batch_size() -> u32 {
    20
}
