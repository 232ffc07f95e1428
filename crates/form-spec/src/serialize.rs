use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PopulateError, SerializationError};
use crate::registry::WidgetRegistry;
use crate::spec::Scalar;

/// Flat property map produced by [`save`]. Unset values are kept as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(IndexMap<String, Option<String>>);

impl FormData {
    pub fn get(&self, property: &str) -> Option<Option<&str>> {
        self.0.get(property).map(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(property, value)| (property.as_str(), value.as_deref()))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(property, value)| {
                    (
                        property.clone(),
                        value.clone().map(Value::String).unwrap_or(Value::Null),
                    )
                })
                .collect(),
        )
    }

    pub fn to_json_string(&self) -> Result<String, SerializationError> {
        serde_json::to_string(self).map_err(SerializationError::Json)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SerializationError> {
        serde_cbor::to_vec(self).map_err(SerializationError::Cbor)
    }
}

/// Collects `property name -> value` for every widget that carries data.
///
/// Walks widgets in creation order and skips labels and accordions. Fails
/// without a partial result if two widgets write the same property.
pub fn save(registry: &WidgetRegistry) -> Result<FormData, SerializationError> {
    let mut data = IndexMap::new();
    let mut writers: HashMap<&str, &str> = HashMap::new();

    for widget in registry.iter().filter(|widget| widget.is_serializable()) {
        if let Some(first) = writers.insert(widget.property_name(), widget.id()) {
            return Err(SerializationError::DuplicateProperty {
                property: widget.property_name().to_string(),
                first: first.to_string(),
                second: widget.id().to_string(),
            });
        }
        data.insert(
            widget.property_name().to_string(),
            widget.value().map(str::to_string),
        );
    }

    debug!(fields = data.len(), "form saved");
    Ok(FormData(data))
}

/// Parses `data` and applies it with [`populate_value`].
pub fn populate(registry: &mut WidgetRegistry, data: &str) -> Result<usize, PopulateError> {
    let value: Value = serde_json::from_str(data).map_err(PopulateError::Json)?;
    populate_value(registry, &value)
}

/// Writes values from a flat JSON object into matching widgets.
///
/// A key matches the property name of data carrying widgets first and
/// otherwise a widget id, so saved payloads load back. Unknown keys are
/// ignored.
/// Values must be scalars or `null` (which unsets); on any invalid value
/// nothing is written. Returns the number of widgets updated.
pub fn populate_value(registry: &mut WidgetRegistry, data: &Value) -> Result<usize, PopulateError> {
    let Value::Object(entries) = data else {
        return Err(PopulateError::NotAnObject);
    };

    let mut updates: Vec<(String, Option<String>)> = Vec::new();
    for (key, raw) in entries {
        let value = match raw {
            Value::Null => None,
            other => Some(
                Scalar::from_value(other)
                    .ok_or_else(|| PopulateError::InvalidValue { key: key.clone() })?
                    .to_string(),
            ),
        };
        let targets = resolve_key(registry, key);
        if targets.is_empty() {
            debug!(key = %key, "populate key matches no widget");
            continue;
        }
        updates.extend(targets.into_iter().map(|id| (id, value.clone())));
    }

    for (id, value) in &updates {
        if let Some(widget) = registry.get_mut(id) {
            widget.set_value(value.clone());
        }
    }
    Ok(updates.len())
}

fn resolve_key(registry: &WidgetRegistry, key: &str) -> Vec<String> {
    let by_property: Vec<String> = registry
        .iter()
        .filter(|widget| widget.is_serializable() && widget.property_name() == key)
        .map(|widget| widget.id().to_string())
        .collect();
    if by_property.is_empty() && registry.contains(key) {
        return vec![key.to_string()];
    }
    by_property
}
