// Component capabilities
//
// A component is a UI element living in the browser with a server-side handle.
// It may expose a getter (last-known value) and a decoder (inbound payload -> value).

use crate::event::EventKey;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Process-unique component identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the component's current value
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self) -> Result<Value>;
}

/// Converts the payload of an inbound event into the value handed to callbacks
#[async_trait]
pub trait Decoder: Send + Sync {
    /// `event` is the event name without the component prefix (e.g. "change")
    async fn decode(&self, event: &str, raw: Value) -> Result<Value>;
}

/// The core trait for all registered components
pub trait Component: Send + Sync {
    fn id(&self) -> ComponentId;

    /// Short type name used in diagnostics (e.g. "Dropdown")
    fn kind(&self) -> &'static str;

    fn getter(&self) -> Option<&dyn Getter> {
        None
    }

    fn decoder(&self) -> Option<&dyn Decoder> {
        None
    }

    /// Construction properties sent to the browser in the component manifest
    fn props(&self) -> Value {
        Value::Null
    }

    /// Event key for `name` emitted by this component
    fn event(&self, name: &str) -> EventKey {
        EventKey::new(self.id(), name)
    }
}
