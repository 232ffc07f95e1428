use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A rule entry as written in `toggles` or `hideOnClick`.
///
/// The compact array form is interpreted per widget type, see
/// [`crate::rules::RuleTable::for_checkbox`] and
/// [`crate::rules::RuleTable::for_spinner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleEntrySpec {
    Targets(Vec<String>),
    Split {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        show: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        hide: Vec<String>,
    },
}
