use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::spec::rule::RuleEntrySpec;

/// Name reserved for non-field entries in a schema document.
pub const META_NAME: &str = "meta";

/// Widget variants understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WidgetType {
    Checkbox,
    Spinner,
    IntegerTextView,
    StringTextView,
    AutoCompleteTextView,
    Label,
    Accordion,
    /// Any type string not listed above. Such elements are dropped.
    #[serde(other)]
    #[schemars(skip)]
    Unknown,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Checkbox => "Checkbox",
            WidgetType::Spinner => "Spinner",
            WidgetType::IntegerTextView => "IntegerTextView",
            WidgetType::StringTextView => "StringTextView",
            WidgetType::AutoCompleteTextView => "AutoCompleteTextView",
            WidgetType::Label => "Label",
            WidgetType::Accordion => "Accordion",
            WidgetType::Unknown => "Unknown",
        }
    }
}

/// Scalar accepted where the document expects a string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// Reads a scalar out of an arbitrary JSON value. Arrays, objects and
    /// null are not scalars.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Scalar::Text(text.clone())),
            Value::Bool(flag) => Some(Scalar::Bool(*flag)),
            Value::Number(num) => num
                .as_i64()
                .map(Scalar::Integer)
                .or_else(|| num.as_f64().map(Scalar::Float)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

/// The two fields every non-meta element must carry before anything else is
/// read.
#[derive(Debug, Deserialize)]
pub(crate) struct ElementHeader {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WidgetType,
}

/// One element of the schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WidgetSpec {
    /// Display name, also the key used when saving.
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetType,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Spinner choices (label to stored value); passed through untouched for
    /// other widget types. Read leniently: a non-object value is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Map<String, Value>>")]
    pub options: Option<Value>,
    /// Checkbox rules keyed by checkbox state. Ignored on other types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<BTreeMap<String, RuleEntrySpec>>")]
    pub toggles: Option<Value>,
    /// Spinner rules keyed by option label. Ignored on other types.
    #[serde(
        default,
        rename = "hideOnClick",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<BTreeMap<String, RuleEntrySpec>>")]
    pub hide_on_click: Option<Value>,
    /// Accordion children ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<String>>")]
    pub children: Option<Value>,
}
