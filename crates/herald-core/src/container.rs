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

//! Registration of the aggregator with a host's dependency container.
//!
//! # Design
//!
//! The aggregator does not depend on any particular framework. A framework
//! plugs in by implementing [`Container`]: it names its root host and accepts
//! singleton instances keyed by type. [`configure`] then embeds an aggregator
//! into the root host and registers it, so other services resolve the same
//! instance the host forwards to.
//!
//! [`ServiceContainer`] is a ready-made singleton store and [`AppContainer`]
//! pairs one with a root host.

use crate::aggregator::EventAggregator;
use crate::host::{include_events_in, EmbedEvents};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// The registration surface a host framework exposes to [`configure`].
pub trait Container {
    /// The root object the aggregator API is embedded into.
    type Host: EmbedEvents;

    /// Returns the root host.
    fn host_mut(&mut self) -> &mut Self::Host;

    /// Registers `instance` as the singleton for type `T`.
    fn register_instance<T: Send + Sync + 'static>(&mut self, instance: T);
}

/// Embeds a fresh aggregator into the container's root host and registers it
/// as the singleton [`EventAggregator`]. Returns a handle to that aggregator.
pub fn configure<C: Container>(container: &mut C) -> EventAggregator {
    let aggregator = include_events_in(container.host_mut());
    container.register_instance(aggregator.clone());
    log::debug!(
        "Registered EventAggregator with {}.",
        type_name::<C::Host>()
    );
    aggregator
}

/// Singleton instances keyed by [`TypeId`].
///
/// Instances are shared: [`resolve`](ServiceContainer::resolve) hands out
/// `Arc`s to the registered value.
#[derive(Default)]
pub struct ServiceContainer {
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instance` as the singleton for `T`, replacing any earlier one.
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, instance: T) {
        if self
            .instances
            .insert(TypeId::of::<T>(), Arc::new(instance))
            .is_some()
        {
            log::debug!("Replaced registered instance of {}.", type_name::<T>());
        }
    }

    /// Returns the singleton registered for `T`.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// Returns `true` if a singleton is registered for `T`.
    #[must_use]
    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered singletons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// A root host together with the services registered around it.
pub struct AppContainer<H> {
    host: H,
    services: ServiceContainer,
}

impl<H> AppContainer<H> {
    /// Wraps `host` with an empty [`ServiceContainer`].
    pub fn new(host: H) -> Self {
        Self {
            host,
            services: ServiceContainer::new(),
        }
    }

    /// The root host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The registered services.
    pub fn services(&self) -> &ServiceContainer {
        &self.services
    }

    /// Mutable access to the registered services.
    pub fn services_mut(&mut self) -> &mut ServiceContainer {
        &mut self.services
    }

    /// Splits the container back into its host and services.
    pub fn into_parts(self) -> (H, ServiceContainer) {
        (self.host, self.services)
    }
}

impl<H: EmbedEvents> Container for AppContainer<H> {
    type Host = H;

    fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn register_instance<T: Send + Sync + 'static>(&mut self, instance: T) {
        self.services.register_instance(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SupportsEvents;

    struct Clock {
        hz: u32,
    }

    #[derive(Default)]
    struct Root {
        events: EventAggregator,
    }

    impl SupportsEvents for Root {
        fn events(&self) -> &EventAggregator {
            &self.events
        }
    }

    impl EmbedEvents for Root {
        fn embed_events(&mut self, aggregator: EventAggregator) {
            self.events = aggregator;
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut services = ServiceContainer::new();
        assert!(services.is_empty());
        assert!(services.resolve::<Clock>().is_none());

        services.register_instance(Clock { hz: 60 });

        assert!(services.has::<Clock>());
        assert_eq!(services.resolve::<Clock>().map(|c| c.hz), Some(60));
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn registering_again_replaces() {
        let mut services = ServiceContainer::new();
        services.register_instance(Clock { hz: 30 });
        services.register_instance(Clock { hz: 144 });

        assert_eq!(services.len(), 1);
        assert_eq!(services.resolve::<Clock>().map(|c| c.hz), Some(144));
    }

    #[test]
    fn configure_registers_the_embedded_aggregator() {
        let mut container = AppContainer::new(Root::default());

        let returned = configure(&mut container);

        let resolved = container
            .services()
            .resolve::<EventAggregator>()
            .expect("aggregator should be registered");
        resolved.subscribe("boot", |_, _| Ok(()));
        assert_eq!(returned.subscriber_count("boot"), 1);
        assert_eq!(container.host().events().subscriber_count("boot"), 1);
    }
}
