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

use super::handler::Handler;
use super::registry::{EntryId, MessageEntry, NamedCallback, NamedEntry, Registry, Slot};
use super::subscription::Subscription;
use super::CallbackResult;
use crate::config::AggregatorConfig;
use crate::error::{Channel, DispatchError};
use crate::sink::{ErrorSink, LogSink};
use std::any::{type_name, Any};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// State shared by every clone of an aggregator and referenced weakly by its
/// subscriptions.
pub(super) struct Shared {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    sink: Arc<dyn ErrorSink>,
    config: AggregatorConfig,
}

impl Shared {
    /// Locks the subscriber collections. A poisoned lock is recovered: the
    /// collections are only mutated by single push/remove calls.
    pub(super) fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> EntryId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// A process-local publish/subscribe hub.
///
/// Cloning is cheap and every clone addresses the same subscribers, which is
/// how a host and the code that created it share one aggregator.
///
/// Named events deliver `(data, event_name)` to callbacks registered with
/// [`subscribe`](Self::subscribe). Typed messages deliver the message to
/// callbacks registered with [`subscribe_message`](Self::subscribe_message)
/// for exactly that type.
#[derive(Clone)]
pub struct EventAggregator {
    shared: Arc<Shared>,
}

impl EventAggregator {
    /// Creates an aggregator with the default configuration, reporting
    /// dispatch failures through the `log` facade.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building an aggregator with a custom sink or configuration.
    pub fn builder() -> EventAggregatorBuilder {
        EventAggregatorBuilder::default()
    }

    /// Creates an aggregator reporting dispatch failures to `sink`.
    pub fn with_sink(sink: impl ErrorSink + 'static) -> Self {
        Self::builder().sink(sink).build()
    }

    /// The configuration this aggregator was built with.
    pub fn config(&self) -> &AggregatorConfig {
        &self.shared.config
    }

    // --- Named events ---

    /// Registers `callback` for the named event `event`.
    ///
    /// The callback receives the published data and the event name. Each call
    /// adds a new entry, even for a callback that is already registered.
    pub fn subscribe<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&(dyn Any + 'static), &str) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.shared.next_id();
        self.push_named(event, id, Arc::new(callback))
    }

    /// Registers `callback` for at most one delivery of the named event.
    ///
    /// The subscription is disposed before the callback runs, so a callback
    /// that publishes the same event again does not see it a second time.
    /// Disposing the returned handle before any publish cancels the callback.
    pub fn subscribe_once<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: FnOnce(&(dyn Any + 'static), &str) -> CallbackResult + Send + 'static,
    {
        let id = self.shared.next_id();
        let own = Subscription::new(&self.shared, Slot::Named(event.to_owned()), id);
        let pending = Mutex::new(Some(callback));

        self.push_named(
            event,
            id,
            Arc::new(move |data: &(dyn Any + 'static), name: &str| {
                own.dispose();
                match take_once(&pending) {
                    Some(callback) => callback(data, name),
                    None => Ok(()),
                }
            }),
        )
    }

    /// Publishes `data` to every callback registered for `event`.
    ///
    /// Callbacks run synchronously, most recently subscribed first. Failures
    /// are reported to the sink and end the dispatch; they never reach the
    /// caller.
    pub fn publish<T: Any>(&self, event: &str, data: &T) {
        self.publish_dyn(event, data);
    }

    /// Publishes a named event that carries no data (callbacks receive `()`).
    pub fn publish_signal(&self, event: &str) {
        self.publish_dyn(event, &());
    }

    /// Type-erased form of [`publish`](Self::publish).
    pub fn publish_dyn(&self, event: &str, data: &(dyn Any + 'static)) {
        let Some(receivers) = self.shared.registry().snapshot_named(event) else {
            log::trace!("No subscribers for event '{event}'.");
            return;
        };
        log::trace!(
            "Publishing event '{event}' to {} subscriber(s).",
            receivers.len()
        );
        self.dispatch(
            &receivers,
            || Channel::Named(event.to_owned()),
            |entry| (entry.callback)(data, event),
        );
    }

    // --- Typed messages ---

    /// Registers `callback` for messages of type `M`.
    pub fn subscribe_message<M, F>(&self, callback: F) -> Subscription
    where
        M: Any,
        F: Fn(&M) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.shared.next_id();
        self.push_message(id, Handler::new::<M, F>(callback))
    }

    /// Registers `callback` for at most one message of type `M`.
    pub fn subscribe_message_once<M, F>(&self, callback: F) -> Subscription
    where
        M: Any,
        F: FnOnce(&M) -> CallbackResult + Send + 'static,
    {
        let id = self.shared.next_id();
        let own = Subscription::new(&self.shared, Slot::Message, id);
        let pending = Mutex::new(Some(callback));

        self.push_message(
            id,
            Handler::new::<M, _>(move |message: &M| {
                own.dispose();
                match take_once(&pending) {
                    Some(callback) => callback(message),
                    None => Ok(()),
                }
            }),
        )
    }

    /// Publishes `message` to every handler registered for its type.
    ///
    /// All typed handlers share one sequence; those registered for another
    /// type are skipped. Same ordering and failure rules as
    /// [`publish`](Self::publish).
    pub fn publish_message<M: Any>(&self, message: &M) {
        let receivers = self.shared.registry().snapshot_messages();
        log::trace!(
            "Publishing message {} against {} handler(s).",
            type_name::<M>(),
            receivers.len()
        );
        self.dispatch(
            &receivers,
            || Channel::Message(type_name::<M>()),
            |entry| entry.handler.handle(message),
        );
    }

    // --- Introspection ---

    /// Number of callbacks currently registered for `event`.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.shared.registry().named_len(event)
    }

    /// Returns `true` if at least one callback is registered for `event`.
    pub fn has_subscribers(&self, event: &str) -> bool {
        self.subscriber_count(event) > 0
    }

    /// Number of typed-message handlers, across all message types.
    pub fn message_handler_count(&self) -> usize {
        self.shared.registry().message_len()
    }

    // --- Internals ---

    fn push_named(&self, event: &str, id: EntryId, callback: NamedCallback) -> Subscription {
        self.shared
            .registry()
            .push_named(event, NamedEntry { id, callback });
        log::debug!("Subscribed to event '{event}' (entry {id}).");
        Subscription::new(&self.shared, Slot::Named(event.to_owned()), id)
    }

    fn push_message(&self, id: EntryId, handler: Handler) -> Subscription {
        log::debug!(
            "Subscribed to message {:?} (entry {id}).",
            handler.message_type()
        );
        self.shared
            .registry()
            .push_message(MessageEntry { id, handler });
        Subscription::new(&self.shared, Slot::Message, id)
    }

    /// Runs `call` for each receiver from last to first, stopping at the
    /// first failure and handing it to the sink. Panics are caught and
    /// reported like returned errors.
    fn dispatch<E>(
        &self,
        receivers: &[E],
        channel: impl Fn() -> Channel,
        call: impl Fn(&E) -> CallbackResult,
    ) {
        for receiver in receivers.iter().rev() {
            let failure = match panic::catch_unwind(AssertUnwindSafe(|| call(receiver))) {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => DispatchError::callback(channel(), error),
                Err(payload) => DispatchError::panicked(channel(), &*payload),
            };
            self.shared.sink.error(&failure);
            return;
        }
    }
}

impl Default for EventAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (named_events, message_handlers) = {
            let registry = self.shared.registry();
            (registry.named_event_count(), registry.message_len())
        };
        f.debug_struct("EventAggregator")
            .field("named_events", &named_events)
            .field("message_handlers", &message_handlers)
            .field("config", &self.shared.config)
            .finish()
    }
}

fn take_once<F>(pending: &Mutex<Option<F>>) -> Option<F> {
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// Builder for an [`EventAggregator`] with an injected sink or configuration.
#[derive(Default)]
pub struct EventAggregatorBuilder {
    config: AggregatorConfig,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl EventAggregatorBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the sink receiving dispatch failures.
    #[must_use]
    pub fn sink(self, sink: impl ErrorSink + 'static) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    /// Sets a sink that is shared with other owners.
    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the aggregator. Without an explicit sink, failures are logged
    /// under the configured log target.
    pub fn build(self) -> EventAggregator {
        let sink: Arc<dyn ErrorSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(LogSink::new(self.config.log_target.clone())),
        };
        log::debug!("EventAggregator initialized.");
        EventAggregator {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::default()),
                next_id: AtomicU64::new(0),
                sink,
                config: self.config,
            }),
        }
    }
}

impl fmt::Debug for EventAggregatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAggregatorBuilder")
            .field("config", &self.config)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}
