use crate::component::{Component, ComponentId, Decoder, Getter};
use crate::dashboard::EventBroadcaster;
use crate::event::{EventKey, ServerMessage};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// Plotly chart
///
/// Figures are pushed as plain JSON (`{"data": [...], "layout": {...}}`); the browser renders them.
pub struct Plotly {
    id: ComponentId,
    broadcaster: EventBroadcaster,
    layout: RwLock<Value>,
}

impl Plotly {
    pub fn new(id: ComponentId, broadcaster: EventBroadcaster) -> Self {
        Self {
            id,
            broadcaster,
            layout: RwLock::new(Value::Null),
        }
    }

    /// Pan/zoom of the chart; payload holds the changed layout fields
    pub fn on_relayout(&self) -> EventKey {
        self.event("relayout")
    }

    pub fn on_click(&self) -> EventKey {
        self.event("click")
    }

    /// Replace the whole figure on every client
    pub fn do_all(&self, figure: Value) -> usize {
        self.broadcaster
            .broadcast(ServerMessage::new(self.id, "all", figure))
    }

    /// Replace only the layout on every client
    pub fn do_layout(&self, layout: Value) -> usize {
        self.broadcaster
            .broadcast(ServerMessage::new(self.id, "layout", layout))
    }
}

#[async_trait]
impl Getter for Plotly {
    async fn get(&self) -> Result<Value> {
        Ok(self.layout.read().await.clone())
    }
}

#[async_trait]
impl Decoder for Plotly {
    async fn decode(&self, event: &str, raw: Value) -> Result<Value> {
        if event == "relayout" {
            debug!(target: "dashboard", component = %self.id, "Recording relayout");
            *self.layout.write().await = raw.clone();
        }
        Ok(raw)
    }
}

impl Component for Plotly {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "Plotly"
    }

    fn getter(&self) -> Option<&dyn Getter> {
        Some(self)
    }

    fn decoder(&self) -> Option<&dyn Decoder> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn relayout_updates_last_known_layout() {
        let plot = Plotly::new(ComponentId(5), EventBroadcaster::new(4));
        let layout = json!({"xaxis.autorange": true});

        plot.decode("relayout", layout.clone()).await.unwrap();
        assert_eq!(plot.get().await.unwrap(), layout);

        // clicks pass through without touching the layout
        plot.decode("click", json!({"points": []})).await.unwrap();
        assert_eq!(plot.get().await.unwrap(), layout);
    }

    #[tokio::test]
    async fn do_all_reaches_subscribers() {
        let broadcaster = EventBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();
        let plot = Plotly::new(ComponentId(4), broadcaster);

        assert_eq!(plot.do_all(json!({"data": []})), 1);
        let message = rx.try_recv().unwrap();
        assert_eq!(message.event, "4#all");
        assert_eq!(message.data, json!({"data": []}));
    }

    #[tokio::test]
    async fn do_layout_pushes_layout_action() {
        let broadcaster = EventBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();
        let plot = Plotly::new(ComponentId(4), broadcaster);

        assert_eq!(plot.do_layout(json!({"barmode": "group"})), 1);
        let message = rx.try_recv().unwrap();
        assert_eq!(message.event, "4#layout");
        assert_eq!(message.data["barmode"], "group");
    }

    #[test]
    fn event_keys_are_scoped_to_the_chart() {
        let plot = Plotly::new(ComponentId(7), EventBroadcaster::new(4));
        assert_eq!(plot.on_click().to_string(), "7#click");
        assert_eq!(plot.on_relayout().to_string(), "7#relayout");
    }
}
