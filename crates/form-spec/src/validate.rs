use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::form::Form;
use crate::widget::{Widget, WidgetKind};

/// Problem with one widget value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub widget_id: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

#[allow(clippy::expect_used)] // literal pattern
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-+]?\d+\s*$").expect("integer pattern compiles"));

/// Checks the values of visible, data carrying widgets. Unset values pass.
pub fn validate(form: &Form) -> ValidationResult {
    let errors: Vec<ValidationError> = form
        .registry()
        .iter()
        .filter(|widget| widget.is_visible() && widget.is_serializable())
        .filter_map(validate_widget)
        .collect();

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn validate_widget(widget: &Widget) -> Option<ValidationError> {
    let value = widget.value()?;
    match widget.kind() {
        WidgetKind::IntegerText if !value.is_empty() && !INTEGER.is_match(value) => {
            Some(base_error(widget, "value is not an integer", "not_integer"))
        }
        WidgetKind::Spinner { .. } if widget.selected_option().is_none() => Some(base_error(
            widget,
            "value is not one of the options",
            "unknown_option",
        )),
        _ => None,
    }
}

fn base_error(widget: &Widget, message: &str, code: &str) -> ValidationError {
    ValidationError {
        widget_id: widget.id().to_string(),
        message: message.into(),
        code: code.into(),
    }
}
