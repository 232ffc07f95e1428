use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::registry::WidgetRegistry;

/// How the widgets of a form are placed: directly on the form, or inside an
/// accordion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    top_level: Vec<String>,
    groups: IndexMap<String, Vec<String>>,
}

impl Layout {
    /// Ids placed directly on the form, in layout order.
    pub fn top_level(&self) -> &[String] {
        &self.top_level
    }

    /// Resolved children of an accordion, in declared order.
    pub fn children(&self, accordion_id: &str) -> &[String] {
        self.groups
            .get(accordion_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(id, children)| (id.as_str(), children.as_slice()))
    }

    /// Whether some accordion owns the widget.
    pub fn is_child(&self, id: &str) -> bool {
        self.groups
            .values()
            .any(|children| children.iter().any(|child| child == id))
    }
}

/// Splits the registry into top-level widgets and accordion children.
///
/// The first accordion (in parse order) to list a widget owns it; unknown
/// ids, self references and claims that would close a cycle are skipped.
/// The registry is only read.
pub fn compose(registry: &WidgetRegistry) -> Layout {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut groups = IndexMap::new();

    for widget in registry.iter() {
        let Some(children) = widget.children() else {
            continue;
        };
        let accordion = widget.id();
        let mut resolved = Vec::new();
        for child in children {
            if !registry.contains(child) {
                debug!(accordion, child = %child, "accordion child not found");
                continue;
            }
            if let Some(owner) = owners.get(child.as_str()) {
                debug!(accordion, child = %child, owner, "accordion child already claimed");
                continue;
            }
            if is_ancestor(&owners, child, accordion) {
                debug!(accordion, child = %child, "accordion child would nest its own parent");
                continue;
            }
            owners.insert(child.as_str(), accordion);
            resolved.push(child.clone());
        }
        groups.insert(accordion.to_string(), resolved);
    }

    let top_level = registry
        .layout_order()
        .into_iter()
        .filter(|widget| !owners.contains_key(widget.id()))
        .map(|widget| widget.id().to_string())
        .collect();

    Layout { top_level, groups }
}

/// True when `candidate` is `id` itself or one of the accordions that
/// (transitively) own `id`.
fn is_ancestor(owners: &HashMap<&str, &str>, candidate: &str, id: &str) -> bool {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if current == candidate {
            return true;
        }
        cursor = owners.get(current).copied();
    }
    false
}
