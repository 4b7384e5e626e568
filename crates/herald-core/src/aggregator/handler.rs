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

//! Typed-message subscriptions.

use super::CallbackResult;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// The tag a typed-message subscription is keyed by.
///
/// Two tags are equal when they were built for the same concrete type.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Returns the tag of `M`.
    #[must_use]
    pub fn of<M: Any>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// The [`TypeId`] of the tagged type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, for diagnostics only.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `message` is a value of the tagged type.
    #[must_use]
    pub fn matches(&self, message: &(dyn Any + 'static)) -> bool {
        Any::type_id(message) == self.id
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type ErasedCallback = Arc<dyn Fn(&(dyn Any + 'static)) -> CallbackResult + Send + Sync>;

/// One typed-message subscription: a [`MessageType`] paired with a callback.
///
/// Handlers for every message type live in one shared sequence; the tag is
/// checked when a message is published, not when the handler is stored.
#[derive(Clone)]
pub struct Handler {
    message_type: MessageType,
    callback: ErasedCallback,
}

impl Handler {
    /// Builds a handler invoking `callback` for values of `M`.
    pub fn new<M, F>(callback: F) -> Self
    where
        M: Any,
        F: Fn(&M) -> CallbackResult + Send + Sync + 'static,
    {
        Self {
            message_type: MessageType::of::<M>(),
            callback: Arc::new(move |message: &(dyn Any + 'static)| {
                match message.downcast_ref::<M>() {
                    Some(message) => callback(message),
                    None => Ok(()),
                }
            }),
        }
    }

    /// The tag this handler is registered for.
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Invokes the callback if `message` has the registered type; otherwise
    /// does nothing and returns `Ok(())`.
    pub fn handle(&self, message: &(dyn Any + 'static)) -> CallbackResult {
        if self.message_type.matches(message) {
            (self.callback)(message)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ping(u32);
    struct Pong;

    #[test]
    fn tags_compare_by_type() {
        assert_eq!(MessageType::of::<Ping>(), MessageType::of::<Ping>());
        assert_ne!(MessageType::of::<Ping>(), MessageType::of::<Pong>());
        assert!(MessageType::of::<Ping>().name().ends_with("Ping"));
    }

    #[test]
    fn matches_only_exact_type() {
        let tag = MessageType::of::<Ping>();
        assert!(tag.matches(&Ping(1)));
        assert!(!tag.matches(&Pong));
        assert!(!tag.matches(&1_u32));
    }

    #[test]
    fn handle_filters_by_tag() {
        let total = Arc::new(AtomicUsize::new(0));
        let sum = Arc::clone(&total);
        let handler = Handler::new(move |ping: &Ping| {
            sum.fetch_add(ping.0 as usize, Ordering::SeqCst);
            Ok(())
        });

        handler.handle(&Ping(3)).unwrap();
        handler.handle(&Pong).unwrap();
        handler.handle(&Ping(4)).unwrap();

        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert_eq!(handler.message_type(), MessageType::of::<Ping>());
    }

    #[test]
    fn handle_returns_callback_error() {
        let handler = Handler::new(|_: &Pong| anyhow::bail!("rejected"));
        assert!(handler.handle(&Ping(0)).is_ok());
        assert_eq!(handler.handle(&Pong).unwrap_err().to_string(), "rejected");
    }
}
