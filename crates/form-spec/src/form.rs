use serde_json::Value;
use tracing::debug;

use crate::accordion::{Layout, compose};
use crate::error::{FormError, PopulateError, SerializationError};
use crate::parse::parse_schema;
use crate::registry::WidgetRegistry;
use crate::serialize::{self, FormData};
use crate::visibility::{VisibilityMap, resolve_visibility};
use crate::widget::Widget;

/// One form instance built from one schema document.
///
/// Owns its registry and layout; generating a new form replaces both
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    registry: WidgetRegistry,
    layout: Layout,
}

impl Form {
    /// Parses `schema`, groups accordion children and applies the initial
    /// visibility rules.
    pub fn generate(schema: &str) -> Self {
        Self::from_widgets(parse_schema(schema))
    }

    pub fn from_widgets(widgets: impl IntoIterator<Item = Widget>) -> Self {
        let registry = WidgetRegistry::from_widgets(widgets);
        let layout = compose(&registry);
        let mut form = Form { registry, layout };
        form.reconcile();
        debug!(widgets = form.registry.len(), "form generated");
        form
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.registry.get(id)
    }

    /// Visibility as currently applied to the widgets.
    pub fn visibility(&self) -> VisibilityMap {
        self.registry
            .iter()
            .map(|widget| (widget.id().to_string(), widget.is_visible()))
            .collect()
    }

    /// Recomputes visibility from scratch and applies it. Returns the ids
    /// whose visibility changed, in parse order.
    pub fn reconcile(&mut self) -> Vec<String> {
        let resolved = resolve_visibility(&self.registry);
        let mut changed = Vec::new();
        for widget in self.registry.iter_mut() {
            let visible = resolved.get(widget.id()).copied().unwrap_or(true);
            if widget.is_visible() != visible {
                widget.set_visible(visible);
                changed.push(widget.id().to_string());
            }
        }
        changed
    }

    /// Sets a widget value. Rule sources trigger a full reconciliation; the
    /// returned ids are the widgets whose visibility changed.
    pub fn set_value(&mut self, id: &str, value: Option<String>) -> Result<Vec<String>, FormError> {
        let widget = self
            .registry
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownWidget(id.to_string()))?;
        widget.set_value(value);
        if widget.rules().is_some() {
            Ok(self.reconcile())
        } else {
            Ok(Vec::new())
        }
    }

    pub fn save(&self) -> Result<FormData, SerializationError> {
        serialize::save(&self.registry)
    }

    /// Loads a flat JSON object of values, then reconciles. Returns the number
    /// of widgets updated.
    pub fn populate(&mut self, data: &str) -> Result<usize, PopulateError> {
        let updated = serialize::populate(&mut self.registry, data)?;
        self.reconcile();
        Ok(updated)
    }

    pub fn populate_value(&mut self, data: &Value) -> Result<usize, PopulateError> {
        let updated = serialize::populate_value(&mut self.registry, data)?;
        self.reconcile();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> String {
        json!([
            {
                "name": "Has pets", "id": "pets", "type": "Checkbox", "priority": 0,
                "toggles": { "on": ["pet_name"] }
            },
            { "name": "Pet name", "id": "pet_name", "type": "StringTextView", "priority": 1 }
        ])
        .to_string()
    }

    #[test]
    fn initial_visibility_follows_defaults() {
        let form = Form::generate(&schema());
        assert!(!form.widget("pet_name").unwrap().is_visible());
    }

    #[test]
    fn changing_a_rule_source_reports_changes() {
        let mut form = Form::generate(&schema());
        let changed = form.set_value("pets", Some("true".into())).unwrap();
        assert_eq!(changed, ["pet_name"]);
        assert!(form.visibility()["pet_name"]);
        assert!(form.reconcile().is_empty());
    }

    #[test]
    fn plain_widgets_do_not_reconcile() {
        let mut form = Form::generate(&schema());
        let changed = form.set_value("pet_name", Some("Rex".into())).unwrap();
        assert!(changed.is_empty());
        assert_eq!(form.widget("pet_name").unwrap().value(), Some("Rex"));
    }

    #[test]
    fn unknown_widget_is_an_error() {
        let mut form = Form::generate(&schema());
        assert!(matches!(
            form.set_value("ghost", None),
            Err(FormError::UnknownWidget(id)) if id == "ghost"
        ));
    }

    #[test]
    fn populate_reconciles() {
        let mut form = Form::generate(&schema());
        assert_eq!(form.populate(r#"{"pets": "on"}"#).unwrap(), 1);
        assert!(form.widget("pet_name").unwrap().is_visible());
    }
}
