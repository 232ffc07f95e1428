use indexmap::IndexMap;
use tracing::warn;

use crate::error::SchemaError;
use crate::widget::Widget;

/// Id-keyed table of every widget in one form, accordion children included.
///
/// Iteration follows parse order, which is also the tie breaker for
/// [`WidgetRegistry::layout_order`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetRegistry {
    widgets: IndexMap<String, Widget>,
}

impl WidgetRegistry {
    /// Builds a registry; a widget repeating an earlier id is dropped.
    pub fn from_widgets(widgets: impl IntoIterator<Item = Widget>) -> Self {
        let mut registry = WidgetRegistry::default();
        for widget in widgets {
            if registry.widgets.contains_key(widget.id()) {
                let err = SchemaError::DuplicateId {
                    id: widget.id().to_string(),
                };
                warn!(error = %err, name = %widget.property_name(), "skipping schema element");
                continue;
            }
            registry.widgets.insert(widget.id().to_string(), widget);
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widgets in parse order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.widgets.values_mut()
    }

    /// Widgets sorted by priority; equal priorities keep parse order.
    pub fn layout_order(&self) -> Vec<&Widget> {
        let mut ordered: Vec<&Widget> = self.widgets.values().collect();
        ordered.sort_by_key(|widget| widget.priority());
        ordered
    }
}
