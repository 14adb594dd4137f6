use crate::component::ComponentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KickboardError {
    #[error("{kind} component {component} has no getter associated with event \"on_{event}\"")]
    GetterNotDefined {
        kind: &'static str,
        component: ComponentId,
        event: String,
    },

    #[error("Failed to decode payload of event {component}#{event}: {source}")]
    Decode {
        component: ComponentId,
        event: String,
        #[source]
        source: rmp_serde::decode::Error,
    },

    #[error("Component not registered: {0}")]
    UnknownComponent(ComponentId),

    #[error("Component already registered: {0}")]
    DuplicateComponent(ComponentId),

    #[error("Subscription {0} declares no source events")]
    EmptySubscription(String),

    #[error("Invalid event identifier: {0}")]
    InvalidEvent(String),

    #[error("Malformed client frame: {0}")]
    MalformedFrame(String),

    #[error("Callback {subscription} failed: {reason}")]
    Callback {
        subscription: String,
        reason: String,
    },

    #[error("Port {port} is unavailable on host {host}, aborting")]
    PortUnavailable { host: String, port: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl KickboardError {
    /// Build a callback failure from any displayable error
    pub fn callback(subscription: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Callback {
            subscription: subscription.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KickboardError>;
