use thiserror::Error;

/// Problems found while reading a schema document.
///
/// These never escape [`crate::parse::parse_schema`]; they are logged and the
/// offending element (or the whole document) is skipped.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema document is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("schema document must be a JSON array of widgets")]
    NotAnArray,
    #[error("element {index} is not an object with string `name` and `type`")]
    MissingHeader { index: usize },
    #[error("element {index} ('{name}') is invalid: {source}")]
    InvalidElement {
        index: usize,
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("element {index} ('{name}') is an accordion without a `children` array")]
    MissingChildren { index: usize, name: String },
    #[error("widget id '{id}' is already taken by an earlier element")]
    DuplicateId { id: String },
}

/// Failure while building or encoding a save payload.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("property '{property}' is written by both '{first}' and '{second}'")]
    DuplicateProperty {
        property: String,
        first: String,
        second: String,
    },
    #[error("json encode error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("cbor encode error: {0}")]
    Cbor(#[source] serde_cbor::Error),
}

/// Rejected populate payload. The registry is left untouched.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("populate data is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("populate data must be a JSON object")]
    NotAnObject,
    #[error("populate value for '{key}' must be a string, number, boolean or null")]
    InvalidValue { key: String },
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no widget with id '{0}'")]
    UnknownWidget(String),
}
