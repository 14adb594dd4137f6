// Application assembly
//
// Components, subscriptions, load hooks and schedules are declared here; `build`
// freezes them into a dispatcher and a server.

use crate::component::{Component, ComponentId};
use crate::dashboard::{DashboardConfig, DashboardServer, EventBroadcaster};
use crate::dispatcher::Dispatcher;
use crate::event::EventKey;
use crate::registry::ComponentRegistry;
use crate::scheduler::Scheduler;
use crate::subscription::{Callback, SubscriptionTable, SubscriptionTableBuilder};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct App {
    config: DashboardConfig,
    registry: ComponentRegistry,
    broadcaster: EventBroadcaster,
    subscriptions: SubscriptionTableBuilder,
    schedules: Vec<Scheduler>,
    next_id: u32,
}

impl App {
    pub fn new(config: DashboardConfig) -> Self {
        let broadcaster = EventBroadcaster::new(config.broadcast_capacity);
        Self {
            config,
            registry: ComponentRegistry::new(),
            broadcaster,
            subscriptions: SubscriptionTable::builder(),
            schedules: Vec::new(),
            next_id: 1,
        }
    }

    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.broadcaster
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Create and register a component; ids are handed out in insertion order
    pub fn add<C, F>(&mut self, build: F) -> Result<Arc<C>>
    where
        C: Component + 'static,
        F: FnOnce(ComponentId, EventBroadcaster) -> C,
    {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        let component = Arc::new(build(id, self.broadcaster.clone()));
        self.registry.register(component.clone())?;
        Ok(component)
    }

    /// Run `callback` whenever any of `sources` fires, with one argument per source
    pub fn subscribe<C>(
        &mut self,
        name: impl Into<String>,
        sources: impl IntoIterator<Item = EventKey>,
        callback: C,
    ) -> &mut Self
    where
        C: Callback + 'static,
    {
        self.subscriptions.subscribe(name, sources, callback);
        self
    }

    /// Run `callback` when a client initializes
    pub fn load<C>(&mut self, name: impl Into<String>, callback: C) -> &mut Self
    where
        C: Callback + 'static,
    {
        self.subscriptions.on_load(name, callback);
        self
    }

    pub fn schedule<C>(&mut self, name: impl Into<String>, period: Duration, task: C) -> &mut Self
    where
        C: Callback + 'static,
    {
        self.schedules.push(Scheduler::new(name, period, task));
        self
    }

    pub fn build(self) -> Result<DashboardServer> {
        let table = self.subscriptions.build(&self.registry)?;
        info!(
            components = self.registry.len(),
            subscriptions = table.subscriptions().len(),
            load_hooks = table.load_hooks().len(),
            schedules = self.schedules.len(),
            "Application assembled"
        );
        let dispatcher = Dispatcher::new(self.registry, Arc::new(table));
        Ok(DashboardServer::new(self.config, dispatcher, self.broadcaster).with_schedules(self.schedules))
    }
}
