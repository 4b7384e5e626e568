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

use super::bus::Shared;
use super::registry::{EntryId, Slot};
use std::fmt;
use std::sync::{Arc, Weak};

/// Handle to one registered callback.
///
/// [`dispose`](Subscription::dispose) removes exactly the entry this handle was
/// created for, even when other entries were registered with identical
/// arguments. Dropping the handle does *not* unsubscribe.
///
/// The handle only holds a weak reference to its aggregator, so it never keeps
/// the aggregator alive.
#[derive(Clone)]
pub struct Subscription {
    shared: Weak<Shared>,
    slot: Slot,
    id: EntryId,
}

impl Subscription {
    pub(super) fn new(shared: &Arc<Shared>, slot: Slot, id: EntryId) -> Self {
        Self {
            shared: Arc::downgrade(shared),
            slot,
            id,
        }
    }

    /// Removes the callback from its aggregator.
    ///
    /// Calling it again, after a one-shot callback fired, or after the
    /// aggregator was dropped does nothing.
    pub fn dispose(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let removed = shared.registry().remove(&self.slot, self.id);
        if let Some(entry) = &removed {
            log::debug!("Disposed subscription {:?} (entry {}).", self.slot, entry.id());
        }
        // Dropped outside the lock: captured state may call back into the aggregator.
        drop(removed);
    }

    /// Returns `true` while the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let registry = shared.registry();
        registry.contains(&self.slot, self.id)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("slot", &self.slot)
            .field("id", &self.id)
            .finish()
    }
}
