//! Field constraint tree and validated argument bag.

use std::fmt;

use serde_json::{Map, Value};

/// The kind of value a field accepts.
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    Number,
    /// Whole-number JSON value. Fractional inputs are rejected; accepted
    /// values are stored in integer representation so integer accessors
    /// always see them.
    Integer,
    Boolean,
    /// Homogeneous array; the boxed kind describes each element.
    Array(Box<FieldKind>),
    /// Nested object with its own field specs.
    Object(Vec<FieldSpec>),
    /// Freeform object (arbitrary keys) passed through without field checks.
    Map,
    /// Closed set of string values.
    Enum(&'static [&'static str]),
}

/// One node of the schema tree: a named field and its constraints.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    /// Inclusive numeric bounds.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Minimum element count for arrays.
    pub min_items: Option<usize>,
    pub description: Option<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            min_items: None,
            description: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn array(name: &'static str, items: FieldKind) -> Self {
        Self::new(name, FieldKind::Array(Box::new(items)))
    }

    pub fn object(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self::new(name, FieldKind::Object(fields))
    }

    pub fn map(name: &'static str) -> Self {
        Self::new(name, FieldKind::Map)
    }

    pub fn enumeration(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Enum(values))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn min(mut self, bound: f64) -> Self {
        self.min = Some(bound);
        self
    }

    pub fn max(mut self, bound: f64) -> Self {
        self.max = Some(bound);
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        self.min_items = Some(count);
        self
    }

    pub fn describe(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }
}

/// An input contract: the fields of the top-level argument object.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Renders the contract as a JSON Schema object for the wire-level
    /// tool listing.
    pub fn to_json_schema(&self) -> Value {
        object_json_schema(&self.fields)
    }
}

fn object_json_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.to_string(), field_json_schema(field));
        if field.required {
            required.push(Value::String(field.name.to_string()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

fn field_json_schema(field: &FieldSpec) -> Value {
    let mut node = kind_json_schema(&field.kind);
    if let Value::Object(map) = &mut node {
        if let Some(min) = field.min {
            map.insert("minimum".into(), json_number(min));
        }
        if let Some(max) = field.max {
            map.insert("maximum".into(), json_number(max));
        }
        if let Some(count) = field.min_items {
            map.insert("minItems".into(), Value::from(count));
        }
        if let Some(default) = &field.default {
            map.insert("default".into(), default.clone());
        }
        if let Some(text) = field.description {
            map.insert("description".into(), Value::String(text.into()));
        }
    }
    node
}

fn kind_json_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => serde_json::json!({"type": "string"}),
        FieldKind::Number => serde_json::json!({"type": "number"}),
        FieldKind::Integer => serde_json::json!({"type": "integer"}),
        FieldKind::Boolean => serde_json::json!({"type": "boolean"}),
        FieldKind::Array(items) => serde_json::json!({
            "type": "array",
            "items": kind_json_schema(items),
        }),
        FieldKind::Object(fields) => object_json_schema(fields),
        FieldKind::Map => serde_json::json!({"type": "object"}),
        FieldKind::Enum(values) => serde_json::json!({
            "type": "string",
            "enum": values,
        }),
    }
}

fn json_number(value: f64) -> Value {
    // Bounds in the catalog are whole numbers; render them without a
    // fractional part so the wire schema stays clean.
    if value.fract() == 0.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// A tool's declared surface: unique name, human description, input contract.
#[derive(Debug, Clone)]
pub struct ToolContract {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
}

/// One field problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validated argument object with defaults applied.
///
/// Only produced by [`super::validate`]; handlers read from it with the
/// typed accessors and never see the raw caller input.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    pub(crate) fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.values.get(name).and_then(Value::as_u64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn array(&self, name: &str) -> Option<&Vec<Value>> {
        self.values.get(name).and_then(Value::as_array)
    }

    pub fn object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.values.get(name).and_then(Value::as_object)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}
