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

//! Storage for the two subscriber collections of an aggregator.

use super::handler::Handler;
use super::CallbackResult;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

pub(super) type NamedCallback =
    Arc<dyn Fn(&(dyn Any + 'static), &str) -> CallbackResult + Send + Sync>;

/// Unique per aggregator; lets a subscription find its own entry again.
pub(super) type EntryId = u64;

#[derive(Clone)]
pub(super) struct NamedEntry {
    pub(super) id: EntryId,
    pub(super) callback: NamedCallback,
}

#[derive(Clone)]
pub(super) struct MessageEntry {
    pub(super) id: EntryId,
    pub(super) handler: Handler,
}

/// An entry taken out of the registry by [`Registry::remove`].
///
/// It must be dropped only after the registry lock is released: dropping the
/// last reference to a callback runs the destructors of whatever it captured.
pub(super) enum Removed {
    Named(NamedEntry),
    Message(MessageEntry),
}

impl Removed {
    pub(super) fn id(&self) -> EntryId {
        match self {
            Removed::Named(entry) => entry.id,
            Removed::Message(entry) => entry.id,
        }
    }
}

/// Which collection an entry was appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Slot {
    Named(String),
    Message,
}

#[derive(Default)]
pub(super) struct Registry {
    event_lookup: HashMap<String, Vec<NamedEntry>>,
    message_handlers: Vec<MessageEntry>,
}

impl Registry {
    pub(super) fn push_named(&mut self, name: &str, entry: NamedEntry) {
        // The sequence for a name is created lazily and kept once created.
        self.event_lookup
            .entry(name.to_owned())
            .or_default()
            .push(entry);
    }

    pub(super) fn push_message(&mut self, entry: MessageEntry) {
        self.message_handlers.push(entry);
    }

    /// Copies the callbacks stored under `name`, or `None` if the name was
    /// never subscribed to.
    pub(super) fn snapshot_named(&self, name: &str) -> Option<Vec<NamedEntry>> {
        self.event_lookup.get(name).cloned()
    }

    pub(super) fn snapshot_messages(&self) -> Vec<MessageEntry> {
        self.message_handlers.clone()
    }

    /// Takes the entry `id` out of `slot`. Returns `None` if it was already gone.
    #[must_use]
    pub(super) fn remove(&mut self, slot: &Slot, id: EntryId) -> Option<Removed> {
        match slot {
            Slot::Named(name) => self
                .event_lookup
                .get_mut(name)
                .and_then(|entries| remove_by_id(entries, id, |e| e.id))
                .map(Removed::Named),
            Slot::Message => {
                remove_by_id(&mut self.message_handlers, id, |e| e.id).map(Removed::Message)
            }
        }
    }

    pub(super) fn contains(&self, slot: &Slot, id: EntryId) -> bool {
        match slot {
            Slot::Named(name) => self
                .event_lookup
                .get(name)
                .is_some_and(|entries| entries.iter().any(|e| e.id == id)),
            Slot::Message => self.message_handlers.iter().any(|e| e.id == id),
        }
    }

    pub(super) fn named_len(&self, name: &str) -> usize {
        self.event_lookup.get(name).map_or(0, Vec::len)
    }

    pub(super) fn message_len(&self) -> usize {
        self.message_handlers.len()
    }

    pub(super) fn named_event_count(&self) -> usize {
        self.event_lookup.len()
    }
}

fn remove_by_id<T>(
    entries: &mut Vec<T>,
    id: EntryId,
    id_of: impl Fn(&T) -> EntryId,
) -> Option<T> {
    let index = entries.iter().position(|e| id_of(e) == id)?;
    Some(entries.remove(index))
}
