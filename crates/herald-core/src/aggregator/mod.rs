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

//! The dispatch and subscription engine.
//!
//! ## Rules
//! - **Reverse order**: within one publish call, the most recently subscribed
//!   callback runs first.
//! - **Snapshot before iterate**: the receivers of a publish call are fixed
//!   before the first callback runs. Subscribing or disposing from inside a
//!   callback only affects later publishes.
//! - **Abort on first failure**: the first callback that fails (returns `Err`
//!   or panics) is reported to the [`ErrorSink`](crate::ErrorSink) and the
//!   remaining receivers of that publish call are skipped.
//! - **Synchronous**: callbacks run on the publisher's call stack. The internal
//!   lock is never held while a callback runs.

mod bus;
mod handler;
mod registry;
mod subscription;

pub use self::bus::{EventAggregator, EventAggregatorBuilder};
pub use self::handler::{Handler, MessageType};
pub use self::subscription::Subscription;

/// What a subscriber callback returns. `Err` aborts the current dispatch.
pub type CallbackResult = anyhow::Result<()>;
