pub mod rule;
pub mod widget;

pub use rule::RuleEntrySpec;
pub use widget::{Scalar, WidgetSpec, WidgetType};

/// JSON Schema describing a schema document (an array of widget elements).
pub fn document_schema() -> serde_json::Value {
    schemars::schema_for!(Vec<WidgetSpec>).to_value()
}
