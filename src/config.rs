use std::thread;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CrossingError;

/// Tunables for an obstruction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingConfig {
    /// Absolute coordinate tolerance. Derived from the data's coordinate
    /// scale when unset.
    pub epsilon: Option<f64>,

    /// Worker pool size. Uses every available compute unit when unset.
    pub threads: Option<usize>,

    /// Query the spatial index for candidates instead of scanning every footprint.
    pub use_index: bool,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self { epsilon: None, threads: None, use_index: true }
    }
}

impl CrossingConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_index(mut self, use_index: bool) -> Self {
        self.use_index = use_index;
        self
    }

    /// Check the configuration before any work starts.
    pub fn validate(&self) -> Result<(), CrossingError> {
        if let Some(eps) = self.epsilon {
            if !eps.is_finite() || eps < 0.0 {
                return Err(CrossingError::InvalidConfig(format!("epsilon must be finite and >= 0, got {eps}")));
            }
        }
        if self.threads == Some(0) {
            return Err(CrossingError::InvalidConfig("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Worker count to build the pool with, clamped to the available
    /// compute units. `None` leaves sizing to rayon's global pool.
    pub fn effective_threads(&self) -> Option<usize> {
        let requested = self.threads?;
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        if requested > available {
            warn!(requested, available, "clamping worker threads to available compute units");
            return Some(available);
        }
        Some(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_index_and_derived_tolerance() {
        let config = CrossingConfig::default();
        assert!(config.use_index);
        assert_eq!(config.epsilon, None);
        assert_eq!(config.threads, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_negative_epsilon() {
        let config = CrossingConfig::default().with_epsilon(-1.0);
        assert!(matches!(config.validate(), Err(CrossingError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_nan_epsilon() {
        let config = CrossingConfig::default().with_epsilon(f64::NAN);
        assert!(matches!(config.validate(), Err(CrossingError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_threads() {
        let config = CrossingConfig::default().with_threads(0);
        assert!(matches!(config.validate(), Err(CrossingError::InvalidConfig(_))));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: CrossingConfig = serde_json::from_str(r#"{"threads": 4}"#).unwrap();
        assert_eq!(config, CrossingConfig::default().with_threads(4));
    }

    #[test]
    fn thread_count_is_clamped_to_available_parallelism() {
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(CrossingConfig::default().effective_threads(), None);
        assert_eq!(CrossingConfig::default().with_threads(1).effective_threads(), Some(1));
        assert_eq!(CrossingConfig::default().with_threads(usize::MAX).effective_threads(), Some(available));
    }
}
