use crate::component::{Component, ComponentId};
use crate::{KickboardError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// A registry of the components making up one dashboard
///
/// Written while the application is assembled, read by the dispatcher afterwards.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: Arc<DashMap<ComponentId, Arc<dyn Component>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under its own id
    pub fn register(&self, component: Arc<dyn Component>) -> Result<ComponentId> {
        let id = component.id();
        if self.components.contains_key(&id) {
            return Err(KickboardError::DuplicateComponent(id));
        }
        info!(target: "registry", component = %id, kind = component.kind(), "Registering component");
        self.components.insert(id, component);
        Ok(id)
    }

    /// Get a component by id
    pub fn get(&self, id: ComponentId) -> Option<Arc<dyn Component>> {
        self.components.get(&id).map(|c| c.clone())
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<_> = self.components.iter().map(|c| *c.key()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label(ComponentId);

    impl Component for Label {
        fn id(&self) -> ComponentId {
            self.0
        }

        fn kind(&self) -> &'static str {
            "Label"
        }
    }

    #[test]
    fn register_rejects_duplicate_ids() {
        let registry = ComponentRegistry::new();
        registry.register(Arc::new(Label(ComponentId(1)))).unwrap();
        let err = registry
            .register(Arc::new(Label(ComponentId(1))))
            .unwrap_err();
        assert!(matches!(err, KickboardError::DuplicateComponent(ComponentId(1))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ids_are_sorted() {
        let registry = ComponentRegistry::new();
        for id in [5, 2, 9] {
            registry.register(Arc::new(Label(ComponentId(id)))).unwrap();
        }
        assert_eq!(
            registry.ids(),
            vec![ComponentId(2), ComponentId(5), ComponentId(9)]
        );
        assert!(registry.contains(ComponentId(5)));
        assert!(registry.get(ComponentId(3)).is_none());
    }
}
