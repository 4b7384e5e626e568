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

//! In-memory record of dispatch failures.

use herald_core::{Channel, DispatchError, ErrorSink};
use std::sync::{Arc, RwLock};

/// One dispatch failure as seen by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    /// Stable label of the failure kind (see [`DispatchError::as_label`]).
    pub label: &'static str,
    /// Channel the failing subscriber was registered on.
    pub channel: Channel,
    /// Rendered error message.
    pub message: String,
}

impl From<&DispatchError> for RecordedFailure {
    fn from(err: &DispatchError) -> Self {
        Self {
            label: err.as_label(),
            channel: err.channel().clone(),
            message: err.to_string(),
        }
    }
}

/// An [`ErrorSink`] keeping every failure it receives, optionally forwarding
/// each one to another sink as well.
///
/// Cloning is cheap and clones share the same record, so one clone can be
/// handed to the aggregator while another is kept for inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    failures: Arc<RwLock<Vec<RecordedFailure>>>,
    forward: Option<Arc<dyn ErrorSink>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording sink that also forwards every failure to `next`.
    pub fn forwarding_to(next: Arc<dyn ErrorSink>) -> Self {
        Self {
            failures: Arc::default(),
            forward: Some(next),
        }
    }

    /// A copy of the failures recorded so far, oldest first.
    pub fn failures(&self) -> Vec<RecordedFailure> {
        match self.failures.read() {
            Ok(failures) => failures.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of failures recorded so far.
    pub fn len(&self) -> usize {
        self.failures.read().map_or(0, |failures| failures.len())
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets all recorded failures.
    pub fn clear(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }
}

impl ErrorSink for RecordingSink {
    fn error(&self, err: &DispatchError) {
        match self.failures.write() {
            Ok(mut failures) => failures.push(err.into()),
            Err(_) => log::warn!("[RecordingSink] Record poisoned, dropping: {err}"),
        }
        if let Some(next) = &self.forward {
            next.error(err);
        }
    }
}

impl std::fmt::Debug for RecordingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSink")
            .field("failures", &self.len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::EventAggregator;

    #[test]
    fn records_failures_from_an_aggregator() {
        let sink = RecordingSink::new();
        let events = EventAggregator::with_sink(sink.clone());
        events.subscribe("save", |_, _| anyhow::bail!("disk full"));

        events.publish("save", &());
        events.publish("save", &());

        let failures = sink.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].label, "subscriber_failed");
        assert_eq!(failures[0].channel, Channel::Named("save".into()));
        assert_eq!(failures[0].message, "subscriber for event 'save' failed: disk full");
    }

    #[test]
    fn clear_empties_the_record() {
        let sink = RecordingSink::new();
        let events = EventAggregator::with_sink(sink.clone());
        events.subscribe("tick", |_, _| panic!("tick handler"));

        events.publish("tick", &1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.failures()[0].label, "subscriber_panicked");

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn forwards_to_next_sink() {
        let downstream = RecordingSink::new();
        let sink = RecordingSink::forwarding_to(Arc::new(downstream.clone()));
        let events = EventAggregator::with_sink(sink.clone());
        events.subscribe("tick", |_, _| anyhow::bail!("nope"));

        events.publish("tick", &1);

        assert_eq!(sink.len(), 1);
        assert_eq!(downstream.failures(), sink.failures());
    }
}
