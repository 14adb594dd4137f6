use crate::component::{Component, ComponentId, Decoder, Getter};
use crate::event::EventKey;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

/// Select box with one or many choices
///
/// The browser sends the selection as a list of `{value, label}` objects
/// (a single object, or null, when nothing or one item is selected).
pub struct Dropdown {
    id: ComponentId,
    labels: Vec<String>,
    values: Vec<String>,
    multi: bool,
    selection: RwLock<Value>,
}

impl Dropdown {
    pub fn new(id: ComponentId, labels: Vec<String>, values: Vec<String>, multi: bool) -> Self {
        Self {
            id,
            labels,
            values,
            multi,
            selection: RwLock::new(Value::Null),
        }
    }

    pub fn on_change(&self) -> EventKey {
        self.event("change")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Extract the selected values from a decoded selection
    pub fn selected_values(selection: &Value) -> Vec<String> {
        fn item_value(item: &Value) -> Option<String> {
            match item {
                Value::Object(map) => map.get("value").and_then(item_value),
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            }
        }

        match selection {
            Value::Array(items) => items.iter().filter_map(item_value).collect(),
            other => item_value(other).into_iter().collect(),
        }
    }
}

#[async_trait]
impl Getter for Dropdown {
    async fn get(&self) -> Result<Value> {
        Ok(self.selection.read().await.clone())
    }
}

#[async_trait]
impl Decoder for Dropdown {
    async fn decode(&self, _event: &str, raw: Value) -> Result<Value> {
        *self.selection.write().await = raw.clone();
        Ok(raw)
    }
}

impl Component for Dropdown {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "Dropdown"
    }

    fn getter(&self) -> Option<&dyn Getter> {
        Some(self)
    }

    fn decoder(&self) -> Option<&dyn Decoder> {
        Some(self)
    }

    fn props(&self) -> Value {
        let options: Vec<Value> = self
            .labels
            .iter()
            .zip(&self.values)
            .map(|(label, value)| json!({ "label": label, "value": value }))
            .collect();
        json!({ "options": options, "multi": self.multi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropdown() -> Dropdown {
        let cats = vec!["art".to_string(), "games".to_string()];
        Dropdown::new(ComponentId(3), cats.clone(), cats, true)
    }

    #[tokio::test]
    async fn getter_is_null_until_first_change() {
        let dd = dropdown();
        assert_eq!(dd.get().await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn decode_records_last_selection() {
        let dd = dropdown();
        let selection = json!([{"value": "art", "label": "art"}]);
        let decoded = dd.decode("change", selection.clone()).await.unwrap();

        assert_eq!(decoded, selection);
        assert_eq!(dd.get().await.unwrap(), selection);
    }

    #[test]
    fn selected_values_accepts_lists_objects_and_null() {
        let list = json!([{"value": "art", "label": "Art"}, {"value": "games", "label": "Games"}]);
        assert_eq!(Dropdown::selected_values(&list), vec!["art", "games"]);

        let single = json!({"value": "food", "label": "Food"});
        assert_eq!(Dropdown::selected_values(&single), vec!["food"]);

        assert!(Dropdown::selected_values(&Value::Null).is_empty());
    }

    #[test]
    fn props_pair_labels_with_values() {
        let props = dropdown().props();
        assert_eq!(props["multi"], json!(true));
        assert_eq!(props["options"][1], json!({"label": "games", "value": "games"}));
        assert_eq!(dropdown().on_change().to_string(), "3#change");
    }
}
