use std::collections::BTreeMap;

use crate::spec::RuleEntrySpec;

/// Trigger label of a checked checkbox.
pub const CHECKED: &str = "true";
/// Trigger label of an unchecked checkbox.
pub const UNCHECKED: &str = "false";

/// Reads a checkbox state out of a value or rule label.
pub fn checkbox_state(label: &str) -> Option<bool> {
    match label.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "checked" | "yes" | "1" => Some(true),
        "false" | "off" | "unchecked" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn state_label(state: bool) -> &'static str {
    if state { CHECKED } else { UNCHECKED }
}

/// Targets affected when a trigger matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEntry {
    pub show: Vec<String>,
    pub hide: Vec<String>,
}

impl RuleEntry {
    fn add_show(&mut self, ids: &[String]) {
        extend_unique(&mut self.show, ids);
    }

    fn add_hide(&mut self, ids: &[String]) {
        extend_unique(&mut self.hide, ids);
    }
}

fn extend_unique(target: &mut Vec<String>, ids: &[String]) {
    for id in ids {
        if !target.contains(id) {
            target.push(id.clone());
        }
    }
}

/// Trigger value to show/hide targets, attached to a controlling widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    entries: BTreeMap<String, RuleEntry>,
}

impl RuleTable {
    /// Compiles checkbox `toggles`.
    ///
    /// Labels are normalized to [`CHECKED`]/[`UNCHECKED`]. A compact array
    /// listed under one state is shown in that state and hidden in the other.
    pub fn for_checkbox(raw: &BTreeMap<String, RuleEntrySpec>) -> Self {
        let mut table = RuleTable::default();
        for (label, spec) in raw {
            let state = checkbox_state(label);
            let key = state.map(state_label).unwrap_or(label.as_str());
            match spec {
                RuleEntrySpec::Split { show, hide } => {
                    let entry = table.entry_mut(key);
                    entry.add_show(show);
                    entry.add_hide(hide);
                }
                RuleEntrySpec::Targets(ids) => {
                    table.entry_mut(key).add_show(ids);
                    if let Some(state) = state {
                        table.entry_mut(state_label(!state)).add_hide(ids);
                    }
                }
            }
        }
        table
    }

    /// Compiles spinner `hideOnClick`. A compact array lists the ids hidden
    /// while that option is selected.
    pub fn for_spinner(raw: &BTreeMap<String, RuleEntrySpec>) -> Self {
        let mut table = RuleTable::default();
        for (label, spec) in raw {
            let entry = table.entry_mut(label);
            match spec {
                RuleEntrySpec::Split { show, hide } => {
                    entry.add_show(show);
                    entry.add_hide(hide);
                }
                RuleEntrySpec::Targets(ids) => entry.add_hide(ids),
            }
        }
        table
    }

    fn entry_mut(&mut self, key: &str) -> &mut RuleEntry {
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn entry(&self, trigger: &str) -> Option<&RuleEntry> {
        self.entries.get(trigger)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleEntry)> {
        self.entries
            .iter()
            .map(|(trigger, entry)| (trigger.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn checkbox_compact_form_mirrors_states() {
        let raw = BTreeMap::from([
            ("on".to_string(), RuleEntrySpec::Targets(ids(&["a"]))),
            ("off".to_string(), RuleEntrySpec::Targets(ids(&["b"]))),
        ]);
        let table = RuleTable::for_checkbox(&raw);

        let checked = table.entry(CHECKED).unwrap();
        assert_eq!(checked.show, ids(&["a"]));
        assert_eq!(checked.hide, ids(&["b"]));
        let unchecked = table.entry(UNCHECKED).unwrap();
        assert_eq!(unchecked.show, ids(&["b"]));
        assert_eq!(unchecked.hide, ids(&["a"]));
    }

    #[test]
    fn checkbox_split_form_is_kept_as_written() {
        let raw = BTreeMap::from([(
            "true".to_string(),
            RuleEntrySpec::Split {
                show: ids(&["a"]),
                hide: ids(&["b"]),
            },
        )]);
        let table = RuleTable::for_checkbox(&raw);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entry(CHECKED).unwrap().hide, ids(&["b"]));
        assert!(table.entry(UNCHECKED).is_none());
    }

    #[test]
    fn spinner_compact_form_hides_targets() {
        let raw = BTreeMap::from([(
            "None".to_string(),
            RuleEntrySpec::Targets(ids(&["x", "y"])),
        )]);
        let table = RuleTable::for_spinner(&raw);
        let entry = table.entry("None").unwrap();
        assert!(entry.show.is_empty());
        assert_eq!(entry.hide, ids(&["x", "y"]));
    }

    #[test]
    fn checkbox_labels_normalize() {
        assert_eq!(checkbox_state(" Checked "), Some(true));
        assert_eq!(checkbox_state("0"), Some(false));
        assert_eq!(checkbox_state("maybe"), None);
    }
}
