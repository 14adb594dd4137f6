// Event dispatcher
//
// Resolves every value the subscriptions of a trigger event need, then runs them.
// The trigger's own value comes from its payload, every other one from a getter.

use crate::event::{EventKey, EventPayload};
use crate::registry::ComponentRegistry;
use crate::subscription::SubscriptionTable;
use crate::{KickboardError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Outcome of one dispatch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Getters invoked to resolve non-trigger sources
    pub getters_called: usize,
    /// Callbacks that ran to completion
    pub callbacks_invoked: usize,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: ComponentRegistry,
    table: Arc<SubscriptionTable>,
}

impl Dispatcher {
    pub fn new(registry: ComponentRegistry, table: Arc<SubscriptionTable>) -> Self {
        Self { registry, table }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn table(&self) -> &SubscriptionTable {
        &self.table
    }

    /// Run every subscription triggered by `event`
    #[tracing::instrument(skip_all, fields(event = %event))]
    pub async fn dispatch(&self, event: &EventKey, payload: EventPayload) -> Result<DispatchReport> {
        let Some(plan) = self.table.plan(event) else {
            debug!(target: "dispatcher", event = %event, "No subscription for event");
            return Ok(DispatchReport::default());
        };

        let mut values: HashMap<&EventKey, Value> = HashMap::with_capacity(plan.required.len() + 1);
        for source in &plan.required {
            values.insert(source, self.resolve(source).await?);
        }
        let getters_called = values.len();

        values.insert(event, self.decode(event, payload).await?);

        let mut callbacks_invoked = 0;
        let mut first_error = None;
        for index in &plan.subscriptions {
            let Some(sub) = self.table.subscription(*index) else {
                continue;
            };
            let args = sub
                .sources
                .iter()
                .map(|source| values.get(source).cloned().unwrap_or(Value::Null))
                .collect();

            match sub.callback.call(args).await {
                Ok(()) => callbacks_invoked += 1,
                Err(e) => {
                    warn!(
                        target: "dispatcher",
                        event = %event,
                        subscription = %sub.name,
                        error = %e,
                        "Callback failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        debug!(
            target: "dispatcher",
            event = %event,
            getters_called,
            callbacks_invoked,
            "Dispatch complete"
        );
        Ok(DispatchReport {
            getters_called,
            callbacks_invoked,
        })
    }

    /// Run the load hooks; returns how many ran
    pub async fn initialize(&self) -> Result<usize> {
        let mut first_error = None;
        let mut ran = 0;
        for hook in self.table.load_hooks() {
            match hook.callback.call(Vec::new()).await {
                Ok(()) => ran += 1,
                Err(e) => {
                    warn!(target: "dispatcher", hook = %hook.name, error = %e, "Load hook failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(ran),
        }
    }

    /// Dispatch on its own task; failures stay inside the task
    pub fn spawn(&self, event: EventKey, payload: EventPayload) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.dispatch(&event, payload).await {
                error!(
                    target: "dispatcher",
                    component = %event.component,
                    event = %event.name,
                    error = %e,
                    "Dispatch failed"
                );
            }
        })
    }

    pub fn spawn_initialize(&self) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.initialize().await {
                error!(target: "dispatcher", error = %e, "Initialization failed");
            }
        })
    }

    async fn resolve(&self, source: &EventKey) -> Result<Value> {
        let component = self
            .registry
            .get(source.component)
            .ok_or(KickboardError::UnknownComponent(source.component))?;
        let getter = component
            .getter()
            .ok_or_else(|| KickboardError::GetterNotDefined {
                kind: component.kind(),
                component: source.component,
                event: source.name.clone(),
            })?;
        getter.get().await
    }

    async fn decode(&self, event: &EventKey, payload: EventPayload) -> Result<Value> {
        let component = self
            .registry
            .get(event.component)
            .ok_or(KickboardError::UnknownComponent(event.component))?;
        let raw = payload.unpack().map_err(|source| KickboardError::Decode {
            component: event.component,
            event: event.name.clone(),
            source,
        })?;
        match component.decoder() {
            Some(decoder) => decoder.decode(&event.name, raw).await,
            None => Ok(raw),
        }
    }
}
