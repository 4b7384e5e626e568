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

//! The reporting contract for failures that happen during dispatch.

use crate::error::DispatchError;

/// Log target used by [`LogSink`] unless configured otherwise.
pub const DEFAULT_LOG_TARGET: &str = "event-aggregator";

/// Receives every [`DispatchError`] raised while an aggregator dispatches.
///
/// The sink is injected when the aggregator is built and is the only place a
/// subscriber failure is reported.
pub trait ErrorSink: Send + Sync {
    /// Reports one failed dispatch.
    fn error(&self, err: &DispatchError);
}

/// Reports dispatch failures through the `log` facade at `error` level.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    /// Creates a sink logging under the given target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The log target this sink writes to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TARGET)
    }
}

impl ErrorSink for LogSink {
    fn error(&self, err: &DispatchError) {
        log::error!(target: self.target.as_str(), "[{}] {err}", err.as_label());
    }
}

impl<F> ErrorSink for F
where
    F: Fn(&DispatchError) + Send + Sync,
{
    fn error(&self, err: &DispatchError) {
        self(err)
    }
}
