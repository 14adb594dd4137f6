use crate::component::{Component, ComponentId};
use crate::dashboard::EventBroadcaster;
use crate::event::ServerMessage;
use serde_json::{json, Value};

/// Static or pushed markdown text
pub struct Markdown {
    id: ComponentId,
    initial: String,
    broadcaster: EventBroadcaster,
}

impl Markdown {
    pub fn new(id: ComponentId, broadcaster: EventBroadcaster, initial: impl Into<String>) -> Self {
        Self {
            id,
            initial: initial.into(),
            broadcaster,
        }
    }

    /// Replace the rendered text on every client
    pub fn do_text(&self, text: impl Into<String>) -> usize {
        self.broadcaster
            .broadcast(ServerMessage::new(self.id, "text", Value::String(text.into())))
    }
}

impl Component for Markdown {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "Markdown"
    }

    fn props(&self) -> Value {
        json!({ "initial": self.initial })
    }
}
