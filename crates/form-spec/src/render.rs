use serde_json::{Map, Value, json};

use crate::form::Form;
use crate::spec::WidgetType;
use crate::widget::{Widget, WidgetKind};

/// Counters exposed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub visible: usize,
    pub total: usize,
}

/// Describes one placed widget. Accordion children are nested.
#[derive(Debug, Clone)]
pub struct RenderWidget {
    pub id: String,
    pub name: String,
    pub kind: WidgetType,
    pub value: Option<String>,
    pub hint: Option<String>,
    /// Own visibility combined with the visibility of enclosing accordions.
    pub visible: bool,
    pub choices: Vec<String>,
    pub options: Option<Map<String, Value>>,
    pub children: Vec<RenderWidget>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub progress: RenderProgress,
    pub widgets: Vec<RenderWidget>,
}

/// Build the renderer payload from the current state of a form.
pub fn build_render_payload(form: &Form) -> RenderPayload {
    let widgets: Vec<RenderWidget> = form
        .layout()
        .top_level()
        .iter()
        .filter_map(|id| describe(form, id, true))
        .collect();

    let mut progress = RenderProgress {
        visible: 0,
        total: 0,
    };
    count(&widgets, &mut progress);

    RenderPayload { progress, widgets }
}

fn describe(form: &Form, id: &str, parent_visible: bool) -> Option<RenderWidget> {
    let widget = form.widget(id)?;
    let visible = parent_visible && widget.is_visible();
    let children = form
        .layout()
        .children(id)
        .iter()
        .filter_map(|child| describe(form, child, visible))
        .collect();

    Some(RenderWidget {
        id: widget.id().to_string(),
        name: widget.property_name().to_string(),
        kind: widget.widget_type(),
        value: widget.value().map(str::to_string),
        hint: widget.hint().map(str::to_string),
        visible,
        choices: choices(widget),
        options: passthrough_options(widget),
        children,
    })
}

fn choices(widget: &Widget) -> Vec<String> {
    match widget.kind() {
        WidgetKind::Spinner { options, .. } => {
            options.iter().map(|option| option.label.clone()).collect()
        }
        _ => Vec::new(),
    }
}

fn passthrough_options(widget: &Widget) -> Option<Map<String, Value>> {
    match widget.kind() {
        WidgetKind::AutoCompleteText { options } | WidgetKind::Label { options } => {
            options.clone()
        }
        _ => None,
    }
}

fn count(widgets: &[RenderWidget], progress: &mut RenderProgress) {
    for widget in widgets {
        progress.total += 1;
        if widget.visible {
            progress.visible += 1;
        }
        count(&widget.children, progress);
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    json!({
        "progress": {
            "visible": payload.progress.visible,
            "total": payload.progress.total,
        },
        "widgets": payload.widgets.iter().map(widget_json).collect::<Vec<_>>(),
    })
}

fn widget_json(widget: &RenderWidget) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(widget.id.clone()));
    map.insert("name".into(), Value::String(widget.name.clone()));
    map.insert("type".into(), Value::String(widget.kind.as_str().to_string()));
    map.insert(
        "value".into(),
        widget
            .value
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    if let Some(hint) = &widget.hint {
        map.insert("hint".into(), Value::String(hint.clone()));
    }
    map.insert("visible".into(), Value::Bool(widget.visible));
    if !widget.choices.is_empty() {
        map.insert(
            "choices".into(),
            Value::Array(
                widget
                    .choices
                    .iter()
                    .map(|choice| Value::String(choice.clone()))
                    .collect(),
            ),
        );
    }
    if let Some(options) = &widget.options {
        map.insert("options".into(), Value::Object(options.clone()));
    }
    if matches!(widget.kind, WidgetType::Accordion) {
        map.insert(
            "children".into(),
            Value::Array(widget.children.iter().map(widget_json).collect()),
        );
    }
    Value::Object(map)
}

/// Render the payload as human-friendly text. Hidden widgets are listed
/// with a marker so the effect of the rules stays readable.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Widgets: {} visible of {}",
        payload.progress.visible, payload.progress.total
    ));
    for widget in &payload.widgets {
        push_text(widget, 0, &mut lines);
    }
    lines.join("\n")
}

fn push_text(widget: &RenderWidget, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut entry = format!(
        "{} - {} [{}] ({})",
        indent,
        widget.name,
        widget.id,
        widget.kind.as_str()
    );
    if let Some(value) = &widget.value {
        entry.push_str(&format!(" = {}", value));
    }
    if !widget.visible {
        entry.push_str(" [hidden]");
    }
    lines.push(entry);
    if let Some(hint) = &widget.hint {
        lines.push(format!("{}     hint: {}", indent, hint));
    }
    if !widget.choices.is_empty() {
        lines.push(format!("{}     choices: {}", indent, widget.choices.join(", ")));
    }
    for child in &widget.children {
        push_text(child, depth + 1, lines);
    }
}
