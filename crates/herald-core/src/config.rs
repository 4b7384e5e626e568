// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Optional settings for an [`EventAggregator`](crate::EventAggregator).
//!
//! An aggregator needs no configuration; [`AggregatorConfig::default`] is what
//! [`EventAggregator::new`](crate::EventAggregator::new) uses. Hosts that keep
//! their settings in TOML can load them with [`AggregatorConfig::from_toml_str`]:
//!
//! ```toml
//! log_target = "ui-events"
//! ```

use crate::error::ConfigError;
use crate::sink::DEFAULT_LOG_TARGET;
use serde::{Deserialize, Serialize};

/// Settings applied when an aggregator is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Target used by the default [`LogSink`](crate::LogSink).
    pub log_target: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }
}

impl AggregatorConfig {
    /// Parses a configuration from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AggregatorConfig::default();
        assert_eq!(config.log_target, "event-aggregator");
    }

    #[test]
    fn empty_document_keeps_defaults() {
        let config = AggregatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AggregatorConfig::default());
    }

    #[test]
    fn log_target_is_read() {
        let config = AggregatorConfig::from_toml_str("log_target = \"bus\"\n").unwrap();
        assert_eq!(
            config,
            AggregatorConfig {
                log_target: "bus".into(),
            }
        );
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = AggregatorConfig::from_toml_str("log_target = 5").unwrap_err();
        assert!(err.to_string().starts_with("invalid aggregator config"));
    }
}
