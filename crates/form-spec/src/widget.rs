use serde_json::{Map, Value};

use crate::rules::{CHECKED, RuleEntry, RuleTable, UNCHECKED, checkbox_state};
use crate::spec::WidgetType;

/// One selectable spinner entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinnerOption {
    pub label: String,
    pub value: String,
}

impl SpinnerOption {
    /// Builds the option list from a spinner `options` object, keeping
    /// declaration order. Non-scalar values fall back to the label.
    pub fn from_map(options: &Map<String, Value>) -> Vec<Self> {
        options
            .iter()
            .map(|(label, value)| SpinnerOption {
                label: label.clone(),
                value: crate::spec::Scalar::from_value(value)
                    .map(|scalar| scalar.to_string())
                    .unwrap_or_else(|| label.clone()),
            })
            .collect()
    }
}

/// Variant data of a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Checkbox {
        toggles: Option<RuleTable>,
    },
    Spinner {
        options: Vec<SpinnerOption>,
        actions: Option<RuleTable>,
    },
    IntegerText,
    StringText,
    AutoCompleteText {
        options: Option<Map<String, Value>>,
    },
    Label {
        options: Option<Map<String, Value>>,
    },
    Accordion {
        children: Vec<String>,
    },
}

/// Model of one form field, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    id: String,
    property_name: String,
    priority: i64,
    value: Option<String>,
    hint: Option<String>,
    visible: bool,
    kind: WidgetKind,
}

impl Widget {
    pub fn new(
        id: impl Into<String>,
        property_name: impl Into<String>,
        priority: i64,
        kind: WidgetKind,
    ) -> Self {
        Self {
            id: id.into(),
            property_name: property_name.into(),
            priority,
            value: None,
            hint: None,
            visible: true,
            kind,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub(crate) fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn widget_type(&self) -> WidgetType {
        match self.kind {
            WidgetKind::Checkbox { .. } => WidgetType::Checkbox,
            WidgetKind::Spinner { .. } => WidgetType::Spinner,
            WidgetKind::IntegerText => WidgetType::IntegerTextView,
            WidgetKind::StringText => WidgetType::StringTextView,
            WidgetKind::AutoCompleteText { .. } => WidgetType::AutoCompleteTextView,
            WidgetKind::Label { .. } => WidgetType::Label,
            WidgetKind::Accordion { .. } => WidgetType::Accordion,
        }
    }

    /// Rule table when this widget controls others.
    pub fn rules(&self) -> Option<&RuleTable> {
        match &self.kind {
            WidgetKind::Checkbox { toggles } => toggles.as_ref(),
            WidgetKind::Spinner { actions, .. } => actions.as_ref(),
            _ => None,
        }
    }

    /// Ids claimed when this widget is an accordion.
    pub fn children(&self) -> Option<&[String]> {
        match &self.kind {
            WidgetKind::Accordion { children } => Some(children),
            _ => None,
        }
    }

    /// Labels and accordions carry no user data and are left out of saves.
    pub fn is_serializable(&self) -> bool {
        !matches!(
            self.kind,
            WidgetKind::Label { .. } | WidgetKind::Accordion { .. }
        )
    }

    /// Currently selected spinner option. An unset value selects the first
    /// option.
    pub fn selected_option(&self) -> Option<&SpinnerOption> {
        let WidgetKind::Spinner { options, .. } = &self.kind else {
            return None;
        };
        match self.value.as_deref() {
            None => options.first(),
            Some(value) => options
                .iter()
                .find(|option| option.value == value)
                .or_else(|| options.iter().find(|option| option.label == value)),
        }
    }

    /// Checkbox state; unset or unreadable values count as unchecked.
    pub fn is_checked(&self) -> bool {
        self.value
            .as_deref()
            .and_then(checkbox_state)
            .unwrap_or(false)
    }

    /// The rule table key matching the current value.
    pub fn trigger(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Checkbox { .. } => {
                Some(if self.is_checked() { CHECKED } else { UNCHECKED })
            }
            WidgetKind::Spinner { .. } => self
                .selected_option()
                .map(|option| option.label.as_str())
                .or(self.value.as_deref()),
            _ => None,
        }
    }

    /// Rule entry in effect for the current value, if any.
    pub fn active_rule(&self) -> Option<&RuleEntry> {
        let rules = self.rules()?;
        let trigger = self.trigger()?;
        rules.entry(trigger).or_else(|| {
            self.selected_option()
                .and_then(|option| rules.entry(&option.value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spinner(value: Option<&str>) -> Widget {
        let options = json!({ "Red": "r", "Green": "g" });
        let widget = Widget::new(
            "color",
            "Color",
            1,
            WidgetKind::Spinner {
                options: SpinnerOption::from_map(options.as_object().unwrap()),
                actions: None,
            },
        );
        match value {
            Some(value) => widget.with_value(value),
            None => widget,
        }
    }

    #[test]
    fn spinner_without_value_selects_first_option() {
        assert_eq!(spinner(None).trigger(), Some("Red"));
    }

    #[test]
    fn spinner_matches_value_then_label() {
        assert_eq!(spinner(Some("g")).trigger(), Some("Green"));
        assert_eq!(spinner(Some("Green")).trigger(), Some("Green"));
        assert_eq!(spinner(Some("blue")).trigger(), Some("blue"));
    }

    #[test]
    fn checkbox_trigger_follows_value() {
        let checkbox = Widget::new("c", "C", 0, WidgetKind::Checkbox { toggles: None });
        assert_eq!(checkbox.trigger(), Some(UNCHECKED));
        assert_eq!(checkbox.with_value("on").trigger(), Some(CHECKED));
    }

    #[test]
    fn labels_and_accordions_are_not_saved() {
        let label = Widget::new("l", "L", 0, WidgetKind::Label { options: None });
        let group = Widget::new("g", "G", 0, WidgetKind::Accordion { children: vec![] });
        let text = Widget::new("t", "T", 0, WidgetKind::StringText);
        assert!(!label.is_serializable());
        assert!(!group.is_serializable());
        assert!(text.is_serializable());
    }
}
