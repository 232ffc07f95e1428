use indexmap::IndexMap;
use tracing::trace;

use crate::error::{FormError, SerializationError};
use crate::form::Form;
use crate::serialize::FormData;
use crate::widget::Widget;

/// What the engine needs from whatever draws the widgets.
pub trait WidgetSurface {
    type Handle: Clone;

    /// Creates the on-screen counterpart of `widget`, inside `parent` when the
    /// widget belongs to an accordion.
    fn create_widget(&mut self, widget: &Widget, parent: Option<&Self::Handle>) -> Self::Handle;

    fn set_visibility(&mut self, handle: &Self::Handle, visible: bool);

    /// Asks the surface to report edits of this widget as
    /// [`ChangeEvent`]s carrying `widget_id`.
    fn attach_change_listener(&mut self, handle: &Self::Handle, widget_id: &str);

    fn current_value(&self, handle: &Self::Handle) -> Option<String>;
}

/// Raised by a surface when the user edits a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub widget_id: String,
}

impl ChangeEvent {
    pub fn new(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
        }
    }
}

/// A form mounted on a surface.
///
/// Values are loaded with [`Form::populate`] before mounting; afterwards the
/// surface is the source of values and the session only pushes visibility.
pub struct FormSession<S: WidgetSurface> {
    form: Form,
    surface: S,
    handles: IndexMap<String, S::Handle>,
}

impl<S: WidgetSurface> FormSession<S> {
    /// Creates every reachable widget (parents before their children),
    /// attaches listeners to data carrying widgets and pushes the current
    /// visibility.
    pub fn mount(form: Form, mut surface: S) -> Self {
        let mut handles = IndexMap::new();
        let mut pending: Vec<(String, Option<S::Handle>)> = form
            .layout()
            .top_level()
            .iter()
            .rev()
            .map(|id| (id.clone(), None))
            .collect();

        while let Some((id, parent)) = pending.pop() {
            let Some(widget) = form.widget(&id) else {
                continue;
            };
            let handle = surface.create_widget(widget, parent.as_ref());
            if widget.is_serializable() {
                surface.attach_change_listener(&handle, &id);
            }
            for child in form.layout().children(&id).iter().rev() {
                pending.push((child.clone(), Some(handle.clone())));
            }
            handles.insert(id, handle);
        }

        for (id, handle) in &handles {
            if let Some(widget) = form.widget(id) {
                surface.set_visibility(handle, widget.is_visible());
            }
        }

        Self {
            form,
            surface,
            handles,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn handle(&self, id: &str) -> Option<&S::Handle> {
        self.handles.get(id)
    }

    /// Reads the edited value back from the surface, updates the model and
    /// pushes any visibility changes. Returns the changed ids.
    pub fn handle_change(&mut self, event: &ChangeEvent) -> Result<Vec<String>, FormError> {
        let handle = self
            .handles
            .get(&event.widget_id)
            .ok_or_else(|| FormError::UnknownWidget(event.widget_id.clone()))?;
        let value = self.surface.current_value(handle);
        let changed = self.form.set_value(&event.widget_id, value)?;
        for id in &changed {
            if let (Some(handle), Some(widget)) = (self.handles.get(id), self.form.widget(id)) {
                trace!(widget = %id, visible = widget.is_visible(), "pushing visibility");
                self.surface.set_visibility(handle, widget.is_visible());
            }
        }
        Ok(changed)
    }

    pub fn save(&self) -> Result<FormData, SerializationError> {
        self.form.save()
    }

    pub fn into_parts(self) -> (Form, S) {
        (self.form, self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingSurface {
        created: Vec<(String, Option<usize>)>,
        visible: HashMap<usize, bool>,
        listeners: Vec<String>,
        values: HashMap<usize, String>,
    }

    impl WidgetSurface for RecordingSurface {
        type Handle = usize;

        fn create_widget(&mut self, widget: &Widget, parent: Option<&usize>) -> usize {
            self.created.push((widget.id().to_string(), parent.copied()));
            self.created.len() - 1
        }

        fn set_visibility(&mut self, handle: &usize, visible: bool) {
            self.visible.insert(*handle, visible);
        }

        fn attach_change_listener(&mut self, _handle: &usize, widget_id: &str) {
            self.listeners.push(widget_id.to_string());
        }

        fn current_value(&self, handle: &usize) -> Option<String> {
            self.values.get(handle).cloned()
        }
    }

    const SCHEMA: &str = r#"[
        {"name": "Extras", "id": "extras", "type": "Accordion", "priority": 0, "children": ["notes"]},
        {"name": "Ship", "id": "ship", "type": "Checkbox", "priority": 1,
         "toggles": {"true": {"show": ["address"]}, "false": {"hide": ["address"]}}},
        {"name": "Address", "id": "address", "type": "StringTextView", "priority": 2},
        {"name": "Notes", "id": "notes", "type": "StringTextView", "priority": 3}
    ]"#;

    #[test]
    fn mount_creates_parents_before_children() {
        let session = FormSession::mount(Form::generate(SCHEMA), RecordingSurface::default());
        let surface = session.surface();
        let order: Vec<_> = surface.created.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["extras", "notes", "ship", "address"]);
        assert_eq!(surface.created[1].1, Some(0));
        assert_eq!(surface.listeners, ["notes", "ship", "address"]);
        let address = *session.handle("address").unwrap();
        assert!(!surface.visible[&address]);
    }

    #[test]
    fn change_events_push_visibility() {
        let mut session = FormSession::mount(Form::generate(SCHEMA), RecordingSurface::default());
        let ship = *session.handle("ship").unwrap();
        let address = *session.handle("address").unwrap();
        session.surface_mut().values.insert(ship, "true".into());

        let changed = session.handle_change(&ChangeEvent::new("ship")).unwrap();
        assert_eq!(changed, ["address"]);
        assert!(session.surface().visible[&address]);
        assert_eq!(session.save().unwrap().get("Ship"), Some(Some("true")));
    }

    #[test]
    fn events_for_unknown_widgets_fail() {
        let mut session = FormSession::mount(Form::generate(SCHEMA), RecordingSurface::default());
        assert!(session.handle_change(&ChangeEvent::new("ghost")).is_err());
    }
}
