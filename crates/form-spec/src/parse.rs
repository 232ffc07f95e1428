use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::rules::RuleTable;
use crate::spec::widget::{ElementHeader, META_NAME};
use crate::spec::{RuleEntrySpec, WidgetSpec, WidgetType};
use crate::widget::{SpinnerOption, Widget, WidgetKind};

/// Parses a schema document into widgets, in document order.
///
/// Never fails: a document that is not a JSON array yields no widgets, and an
/// invalid element is logged and skipped without affecting its siblings.
pub fn parse_schema(json: &str) -> Vec<Widget> {
    let elements = match parse_document(json) {
        Ok(elements) => elements,
        Err(err) => {
            warn!(error = %err, "discarding schema document");
            return Vec::new();
        }
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match parse_element(index, element) {
            Ok(widget) => widget,
            Err(err) => {
                warn!(error = %err, "skipping schema element");
                None
            }
        })
        .collect()
}

fn parse_document(json: &str) -> Result<Vec<Value>, SchemaError> {
    match serde_json::from_str(json).map_err(SchemaError::Json)? {
        Value::Array(elements) => Ok(elements),
        _ => Err(SchemaError::NotAnArray),
    }
}

/// Parses one element. `Ok(None)` marks an element that is dropped on
/// purpose: `meta` entries, unknown types and spinners without options.
///
/// Rule, option and children fields are only read for the widget types that
/// use them; a malformed value there is logged and ignored.
pub fn parse_element(index: usize, element: &Value) -> Result<Option<Widget>, SchemaError> {
    if element.get("name").and_then(Value::as_str) == Some(META_NAME) {
        debug!(index, "skipping meta entry");
        return Ok(None);
    }

    let header =
        ElementHeader::deserialize(element).map_err(|_| SchemaError::MissingHeader { index })?;
    match header.kind {
        WidgetType::Unknown => {
            debug!(index, name = %header.name, "unrecognized widget type");
            return Ok(None);
        }
        WidgetType::Spinner if !element.get("options").is_some_and(Value::is_object) => {
            debug!(index, name = %header.name, "spinner without options");
            return Ok(None);
        }
        _ => {}
    }

    let spec =
        WidgetSpec::deserialize(element).map_err(|source| SchemaError::InvalidElement {
            index,
            name: header.name.clone(),
            source,
        })?;
    build_widget(index, spec)
}

fn build_widget(index: usize, spec: WidgetSpec) -> Result<Option<Widget>, SchemaError> {
    let kind = match spec.kind {
        WidgetType::Checkbox => WidgetKind::Checkbox {
            toggles: rule_entries(index, "toggles", spec.toggles.as_ref())
                .as_ref()
                .map(RuleTable::for_checkbox),
        },
        WidgetType::Spinner => WidgetKind::Spinner {
            options: option_map(index, spec.options.as_ref())
                .as_ref()
                .map(SpinnerOption::from_map)
                .unwrap_or_default(),
            actions: rule_entries(index, "hideOnClick", spec.hide_on_click.as_ref())
                .as_ref()
                .map(RuleTable::for_spinner),
        },
        WidgetType::IntegerTextView => WidgetKind::IntegerText,
        WidgetType::StringTextView => WidgetKind::StringText,
        WidgetType::AutoCompleteTextView => WidgetKind::AutoCompleteText {
            options: option_map(index, spec.options.as_ref()),
        },
        WidgetType::Label => WidgetKind::Label {
            options: option_map(index, spec.options.as_ref()),
        },
        WidgetType::Accordion => WidgetKind::Accordion {
            children: child_ids(index, spec.children.as_ref()).ok_or(
                SchemaError::MissingChildren {
                    index,
                    name: spec.name.clone(),
                },
            )?,
        },
        WidgetType::Unknown => return Ok(None),
    };

    let mut widget = Widget::new(spec.id, spec.name, spec.priority, kind);
    if let Some(default) = spec.default {
        widget = widget.with_value(default.to_string());
    }
    if let Some(hint) = spec.hint {
        widget = widget.with_hint(hint);
    }
    Ok(Some(widget))
}

/// Reads a rule object entry by entry, dropping entries that are neither an
/// id list nor a `{show, hide}` pair.
fn rule_entries(
    index: usize,
    field: &str,
    raw: Option<&Value>,
) -> Option<BTreeMap<String, RuleEntrySpec>> {
    let Value::Object(entries) = raw? else {
        warn!(index, field, "ignoring rules that are not an object");
        return None;
    };
    let mut parsed = BTreeMap::new();
    for (label, entry) in entries {
        match RuleEntrySpec::deserialize(entry) {
            Ok(rule) => {
                parsed.insert(label.clone(), rule);
            }
            Err(err) => {
                warn!(index, field, label = %label, error = %err, "ignoring malformed rule")
            }
        }
    }
    Some(parsed)
}

fn option_map(index: usize, raw: Option<&Value>) -> Option<Map<String, Value>> {
    match raw? {
        Value::Object(options) => Some(options.clone()),
        _ => {
            warn!(index, "ignoring options that are not an object");
            None
        }
    }
}

fn child_ids(index: usize, raw: Option<&Value>) -> Option<Vec<String>> {
    let Value::Array(children) = raw? else {
        return None;
    };
    Some(
        children
            .iter()
            .filter_map(|child| {
                let id = child.as_str();
                if id.is_none() {
                    debug!(index, "skipping accordion child that is not a string");
                }
                id.map(str::to_string)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Vec<Widget> {
        parse_schema(&value.to_string())
    }

    #[test]
    fn invalid_document_yields_nothing() {
        assert!(parse_schema("[{").is_empty());
        assert!(parse(json!({ "name": "x" })).is_empty());
    }

    #[test]
    fn meta_entries_are_skipped_regardless_of_type() {
        let widgets = parse(json!([
            { "name": "meta", "type": "StringTextView", "id": "m", "priority": 0 },
            { "name": "meta", "type": "Bogus" },
            { "name": "Title", "type": "StringTextView", "id": "t", "priority": 1 }
        ]));
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].id(), "t");
    }

    #[test]
    fn meta_entry_needs_only_a_name() {
        let widgets = parse(json!([
            { "name": "meta" },
            { "name": "Title", "type": "StringTextView", "id": "t", "priority": 1 }
        ]));
        assert_eq!(widgets.len(), 1);
        assert!(matches!(parse_element(0, &json!({ "name": "meta" })), Ok(None)));
    }

    #[test]
    fn malformed_or_foreign_rules_keep_the_widget() {
        let widgets = parse(json!([
            { "name": "Agree", "type": "Checkbox", "id": "agree", "priority": 0, "toggles": "none" },
            { "name": "Note", "type": "StringTextView", "id": "note", "priority": 1, "hideOnClick": 5 },
            {
                "name": "Pets", "type": "Checkbox", "id": "pets", "priority": 2,
                "toggles": { "on": ["a"], "off": 7 }
            },
            {
                "name": "Intro", "type": "Label", "id": "intro", "priority": 3,
                "options": "plain", "children": {}
            }
        ]));
        let ids: Vec<_> = widgets.iter().map(|widget| widget.id()).collect();
        assert_eq!(ids, ["agree", "note", "pets", "intro"]);
        assert!(widgets[0].rules().is_none());
        assert!(widgets[1].rules().is_none());

        let pets = widgets[2].rules().unwrap();
        assert_eq!(pets.entry("true").unwrap().show, vec!["a"]);
        assert_eq!(pets.entry("false").unwrap().hide, vec!["a"]);
        assert!(pets.entry("false").unwrap().show.is_empty());
    }

    #[test]
    fn spinner_without_options_is_dropped() {
        let widgets = parse(json!([
            { "name": "Size", "type": "Spinner", "id": "size", "priority": 0 },
            { "name": "Size", "type": "Spinner", "id": "size2", "priority": 0, "options": ["s"] }
        ]));
        assert!(widgets.is_empty());
    }

    #[test]
    fn broken_element_does_not_stop_siblings() {
        let widgets = parse(json!([
            { "name": "No id", "type": "StringTextView", "priority": 0 },
            { "name": "No priority", "type": "StringTextView", "id": "np" },
            "not an object",
            { "name": "Unknown", "type": "Slider", "id": "s", "priority": 0 },
            { "name": "Group", "type": "Accordion", "id": "g", "priority": 0 },
            { "name": "Ok", "type": "IntegerTextView", "id": "ok", "priority": 3 }
        ]));
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].id(), "ok");
        assert_eq!(widgets[0].priority(), 3);
    }

    #[test]
    fn defaults_and_hints_are_read() {
        let widgets = parse(json!([
            { "name": "Age", "type": "IntegerTextView", "id": "age", "priority": 0, "default": 42 },
            { "name": "Agree", "type": "Checkbox", "id": "agree", "priority": 1, "default": true },
            { "name": "Note", "type": "StringTextView", "id": "note", "priority": 2, "hint": "optional" },
            { "name": "Empty", "type": "StringTextView", "id": "empty", "priority": 3, "default": "" }
        ]));
        assert_eq!(widgets[0].value(), Some("42"));
        assert!(widgets[1].is_checked());
        assert_eq!(widgets[2].value(), None);
        assert_eq!(widgets[2].hint(), Some("optional"));
        assert_eq!(widgets[3].value(), Some(""));
    }

    #[test]
    fn rule_tables_attach_to_their_widget_types() {
        let widgets = parse(json!([
            {
                "name": "Pets", "type": "Checkbox", "id": "pets", "priority": 0,
                "toggles": { "true": { "show": ["pet_name"], "hide": ["why_not"] } }
            },
            {
                "name": "Kind", "type": "Spinner", "id": "kind", "priority": 1,
                "options": { "Dog": "dog", "None": "none" },
                "hideOnClick": { "None": ["pet_name"] }
            },
            {
                "name": "Group", "type": "Accordion", "id": "g", "priority": 2,
                "children": ["pet_name", "later"]
            }
        ]));
        assert_eq!(widgets.len(), 3);
        assert!(widgets[0].rules().unwrap().entry("true").is_some());
        assert_eq!(widgets[1].rules().unwrap().entry("None").unwrap().hide, vec!["pet_name"]);
        assert_eq!(widgets[2].children().unwrap(), ["pet_name", "later"]);
    }
}
