// Subscription table
//
// Maps every trigger event to the subscriptions it re-runs and to the set of
// other events whose current value those subscriptions need. Built once.

use crate::event::EventKey;
use crate::registry::ComponentRegistry;
use crate::{KickboardError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// User function invoked with one value per declared source event
#[async_trait]
pub trait Callback: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<()>;
}

#[async_trait]
impl<F, Fut> Callback for F
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<()> {
        (self)(args).await
    }
}

/// A callback bound to an ordered list of source events
///
/// Every source is also a trigger: a change to any of them re-runs the callback.
#[derive(Clone)]
pub struct Subscription {
    pub name: String,
    pub sources: Vec<EventKey>,
    pub callback: Arc<dyn Callback>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .finish()
    }
}

/// Argument-less callback run when a client initializes
#[derive(Clone)]
pub struct LoadHook {
    pub name: String,
    pub callback: Arc<dyn Callback>,
}

/// What a single trigger event needs
#[derive(Clone, Debug, Default)]
pub struct ResolutionPlan {
    /// Indexes into the table's subscriptions, in declaration order
    pub subscriptions: Vec<usize>,
    /// Deduplicated sources of those subscriptions, trigger excluded
    pub required: BTreeSet<EventKey>,
}

#[derive(Default)]
pub struct SubscriptionTableBuilder {
    subscriptions: Vec<Subscription>,
    load_hooks: Vec<LoadHook>,
}

impl SubscriptionTableBuilder {
    pub fn subscribe<C>(
        &mut self,
        name: impl Into<String>,
        sources: impl IntoIterator<Item = EventKey>,
        callback: C,
    ) -> &mut Self
    where
        C: Callback + 'static,
    {
        self.subscriptions.push(Subscription {
            name: name.into(),
            sources: sources.into_iter().collect(),
            callback: Arc::new(callback),
        });
        self
    }

    pub fn on_load<C>(&mut self, name: impl Into<String>, callback: C) -> &mut Self
    where
        C: Callback + 'static,
    {
        self.load_hooks.push(LoadHook {
            name: name.into(),
            callback: Arc::new(callback),
        });
        self
    }

    /// Validate against the registry and index subscriptions by trigger
    pub fn build(self, registry: &ComponentRegistry) -> Result<SubscriptionTable> {
        let mut plans: HashMap<EventKey, ResolutionPlan> = HashMap::new();

        for (index, sub) in self.subscriptions.iter().enumerate() {
            if sub.sources.is_empty() {
                return Err(KickboardError::EmptySubscription(sub.name.clone()));
            }
            for source in &sub.sources {
                if !registry.contains(source.component) {
                    return Err(KickboardError::UnknownComponent(source.component));
                }
            }

            let triggers: BTreeSet<&EventKey> = sub.sources.iter().collect();
            for trigger in triggers {
                let plan = plans.entry(trigger.clone()).or_default();
                plan.subscriptions.push(index);
                plan.required.extend(
                    sub.sources
                        .iter()
                        .filter(|source| *source != trigger)
                        .cloned(),
                );
            }
        }

        for (trigger, plan) in &plans {
            debug!(
                target: "dispatcher",
                event = %trigger,
                subscriptions = plan.subscriptions.len(),
                required = plan.required.len(),
                "Indexed trigger"
            );
        }

        Ok(SubscriptionTable {
            subscriptions: self.subscriptions,
            load_hooks: self.load_hooks,
            plans,
        })
    }
}

/// Immutable subscription table shared by all dispatches
pub struct SubscriptionTable {
    subscriptions: Vec<Subscription>,
    load_hooks: Vec<LoadHook>,
    plans: HashMap<EventKey, ResolutionPlan>,
}

impl SubscriptionTable {
    pub fn builder() -> SubscriptionTableBuilder {
        SubscriptionTableBuilder::default()
    }

    pub fn plan(&self, trigger: &EventKey) -> Option<&ResolutionPlan> {
        self.plans.get(trigger)
    }

    pub fn subscription(&self, index: usize) -> Option<&Subscription> {
        self.subscriptions.get(index)
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn load_hooks(&self) -> &[LoadHook] {
        &self.load_hooks
    }

    /// All events that trigger at least one subscription
    pub fn triggers(&self) -> BTreeSet<&EventKey> {
        self.plans.keys().collect()
    }
}
