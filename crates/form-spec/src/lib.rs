#![allow(missing_docs)]

pub mod accordion;
pub mod error;
pub mod form;
pub mod parse;
pub mod registry;
pub mod render;
pub mod rules;
pub mod serialize;
pub mod spec;
pub mod surface;
pub mod validate;
pub mod visibility;
pub mod widget;

pub use accordion::{Layout, compose};
pub use error::{FormError, PopulateError, SchemaError, SerializationError};
pub use form::Form;
pub use parse::parse_schema;
pub use registry::WidgetRegistry;
pub use render::{
    RenderPayload, RenderProgress, RenderWidget, build_render_payload, render_json_ui, render_text,
};
pub use rules::{RuleEntry, RuleTable};
pub use serialize::{FormData, populate, populate_value, save};
pub use spec::{RuleEntrySpec, Scalar, WidgetSpec, WidgetType, document_schema};
pub use surface::{ChangeEvent, FormSession, WidgetSurface};
pub use validate::{ValidationError, ValidationResult, validate};
pub use visibility::{VisibilityMap, resolve_visibility};
pub use widget::{SpinnerOption, Widget, WidgetKind};
