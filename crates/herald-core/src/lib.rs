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

//! # Herald Core
//!
//! A process-local event aggregator. Components talk to each other through an
//! [`EventAggregator`] instead of holding references to one another.
//!
//! Two addressing modes are supported:
//!
//! - **named events**, keyed by a string, whose callbacks receive
//!   `(data, event_name)`;
//! - **typed messages**, keyed by the Rust type of the published value, whose
//!   callbacks receive the message itself.
//!
//! Delivery is synchronous on the publisher's call stack, from the most
//! recently subscribed callback to the oldest one.
//!
//! ```rust
//! use herald_core::EventAggregator;
//! use std::sync::{Arc, Mutex};
//!
//! let events = EventAggregator::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let recorder = Arc::clone(&seen);
//! let sub = events.subscribe("tick", move |data, _name| {
//!     if let Some(n) = data.downcast_ref::<i32>() {
//!         recorder.lock().unwrap().push(*n);
//!     }
//!     Ok(())
//! });
//!
//! events.publish("tick", &5);
//! sub.dispose();
//! events.publish("tick", &6);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![5]);
//! ```

#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
pub mod container;
pub mod error;
pub mod host;
pub mod sink;

pub use aggregator::{
    CallbackResult, EventAggregator, EventAggregatorBuilder, Handler, MessageType, Subscription,
};
pub use config::AggregatorConfig;
pub use container::{configure, AppContainer, Container, ServiceContainer};
pub use error::{Channel, ConfigError, DispatchError};
pub use host::{include_events_in, EmbedEvents, SupportsEvents};
pub use sink::{ErrorSink, LogSink, DEFAULT_LOG_TARGET};
