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

//! Lets an arbitrary host type expose the aggregator API.
//!
//! A host owns an [`EventAggregator`] field and implements [`SupportsEvents`]
//! to get `subscribe`, `subscribe_once` and `publish` (and their typed-message
//! variants) forwarded to it. Hosts that can have an aggregator installed
//! after construction also implement [`EmbedEvents`], which is what
//! [`include_events_in`] needs.
//!
//! ```rust
//! use herald_core::{include_events_in, EmbedEvents, EventAggregator, SupportsEvents};
//!
//! #[derive(Default)]
//! struct Shell {
//!     events: EventAggregator,
//! }
//!
//! impl SupportsEvents for Shell {
//!     fn events(&self) -> &EventAggregator {
//!         &self.events
//!     }
//! }
//!
//! impl EmbedEvents for Shell {
//!     fn embed_events(&mut self, aggregator: EventAggregator) {
//!         self.events = aggregator;
//!     }
//! }
//!
//! let mut shell = Shell::default();
//! let events = include_events_in(&mut shell);
//! shell.subscribe("opened", |_, _| Ok(()));
//! assert_eq!(events.subscriber_count("opened"), 1);
//! ```

use crate::aggregator::{CallbackResult, EventAggregator, Subscription};
use std::any::Any;

/// A host that forwards the aggregator API to an owned [`EventAggregator`].
pub trait SupportsEvents {
    /// The aggregator calls are forwarded to.
    fn events(&self) -> &EventAggregator;

    /// See [`EventAggregator::subscribe`].
    fn subscribe<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&(dyn Any + 'static), &str) -> CallbackResult + Send + Sync + 'static,
    {
        self.events().subscribe(event, callback)
    }

    /// See [`EventAggregator::subscribe_once`].
    fn subscribe_once<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: FnOnce(&(dyn Any + 'static), &str) -> CallbackResult + Send + 'static,
    {
        self.events().subscribe_once(event, callback)
    }

    /// See [`EventAggregator::publish`].
    fn publish<T: Any>(&self, event: &str, data: &T) {
        self.events().publish(event, data);
    }

    /// See [`EventAggregator::subscribe_message`].
    fn subscribe_message<M, F>(&self, callback: F) -> Subscription
    where
        M: Any,
        F: Fn(&M) -> CallbackResult + Send + Sync + 'static,
    {
        self.events().subscribe_message::<M, F>(callback)
    }

    /// See [`EventAggregator::subscribe_message_once`].
    fn subscribe_message_once<M, F>(&self, callback: F) -> Subscription
    where
        M: Any,
        F: FnOnce(&M) -> CallbackResult + Send + 'static,
    {
        self.events().subscribe_message_once::<M, F>(callback)
    }

    /// See [`EventAggregator::publish_message`].
    fn publish_message<M: Any>(&self, message: &M) {
        self.events().publish_message(message);
    }
}

/// A host whose aggregator can be installed after construction.
pub trait EmbedEvents: SupportsEvents {
    /// Installs `aggregator`, replacing any previously installed one.
    fn embed_events(&mut self, aggregator: EventAggregator);
}

/// Creates a fresh aggregator, installs it into `host` and returns a handle to
/// that same aggregator for the caller's own use.
pub fn include_events_in<H: EmbedEvents>(host: &mut H) -> EventAggregator {
    let aggregator = EventAggregator::new();
    host.embed_events(aggregator.clone());
    aggregator
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Widget {
        events: EventAggregator,
    }

    impl SupportsEvents for Widget {
        fn events(&self) -> &EventAggregator {
            &self.events
        }
    }

    impl EmbedEvents for Widget {
        fn embed_events(&mut self, aggregator: EventAggregator) {
            self.events = aggregator;
        }
    }

    struct Resized(u32);

    #[test]
    fn host_and_returned_handle_share_one_aggregator() {
        let mut widget = Widget::default();
        let events = include_events_in(&mut widget);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        widget.subscribe("clicked", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        events.publish("clicked", &());
        widget.publish("clicked", &());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn embedding_replaces_previous_aggregator() {
        let mut widget = Widget::default();
        let old = widget.events.clone();
        old.subscribe("clicked", |_, _| Ok(()));

        let new = include_events_in(&mut widget);

        assert_eq!(widget.events().subscriber_count("clicked"), 0);
        assert_eq!(new.subscriber_count("clicked"), 0);
        assert_eq!(old.subscriber_count("clicked"), 1);
    }

    #[test]
    fn forwarded_once_and_typed_methods() {
        let mut widget = Widget::default();
        let events = include_events_in(&mut widget);
        let width = Arc::new(AtomicUsize::new(0));

        let store = Arc::clone(&width);
        widget.subscribe_message(move |resized: &Resized| {
            store.store(resized.0 as usize, Ordering::SeqCst);
            Ok(())
        });
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        widget.subscribe_message_once(move |_: &Resized| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        widget.subscribe_once("closed", |_, _| Ok(()));

        widget.publish_message(&Resized(640));
        events.publish_message(&Resized(800));
        widget.publish("closed", &());

        assert_eq!(width.load(Ordering::SeqCst), 800);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(events.subscriber_count("closed"), 0);
    }
}
