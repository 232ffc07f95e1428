use std::collections::HashSet;

use tracing::trace;

use crate::registry::WidgetRegistry;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Computes the visibility of every widget from current values and rules.
///
/// Every widget starts visible. Rule sources are then walked from the bottom
/// of the form to the top; the first (lowest) rule to touch a target decides
/// it, so a rule placed closer to its target beats one further up. Within a
/// single rule a target listed under both `show` and `hide` stays visible.
/// Targets missing from the registry are ignored.
pub fn resolve_visibility(registry: &WidgetRegistry) -> VisibilityMap {
    let mut map: VisibilityMap = registry
        .iter()
        .map(|widget| (widget.id().to_string(), true))
        .collect();
    let mut decided: HashSet<&str> = HashSet::new();

    for widget in registry.layout_order().into_iter().rev() {
        let Some(rule) = widget.active_rule() else {
            continue;
        };
        trace!(source = widget.id(), trigger = ?widget.trigger(), "applying rule");

        let mut exempt: HashSet<&str> = HashSet::new();
        for target in rule.show.iter().filter(|id| registry.contains(id)) {
            exempt.insert(target);
            if decided.insert(target) {
                map.insert(target.clone(), true);
            }
        }
        for target in rule.hide.iter().filter(|id| registry.contains(id)) {
            if exempt.contains(target.as_str()) {
                continue;
            }
            if decided.insert(target) {
                map.insert(target.clone(), false);
            }
        }
    }

    map
}
