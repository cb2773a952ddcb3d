//! Parameter schemas: one declaration drives both runtime validation and
//! the JSON Schema handed to LLM tool-calling frameworks.
//!
//! Field descriptions are load-bearing — frameworks feed them to the model
//! for tool selection — so they survive the JSON Schema conversion verbatim.

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::ValidationError;

/// Type and constraints of a single schema field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A string, optionally constrained by a regex (e.g. an address format).
    String { pattern: Option<String> },
    /// A whole number with optional inclusive bounds.
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    /// A float with optional inclusive bounds.
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    /// One of a fixed set of string variants.
    Enum { variants: Vec<String> },
    /// A homogeneous array.
    Array { items: Box<FieldKind> },
    /// A free-form nested object; contents are not validated.
    Object,
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } | Self::Enum { .. } => "string",
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Array { .. } => "array",
            Self::Object => "object",
        }
    }
}

/// A named schema field.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    description: String,
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
}

impl Field {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::String { pattern: None })
    }

    pub fn integer(name: &str) -> Self {
        Self::new(
            name,
            FieldKind::Integer {
                minimum: None,
                maximum: None,
            },
        )
    }

    pub fn number(name: &str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                minimum: None,
                maximum: None,
            },
        )
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn enumeration(name: &str, variants: &[&str]) -> Self {
        Self::new(
            name,
            FieldKind::Enum {
                variants: variants.iter().map(|v| (*v).to_string()).collect(),
            },
        )
    }

    pub fn array(name: &str, items: FieldKind) -> Self {
        Self::new(
            name,
            FieldKind::Array {
                items: Box::new(items),
            },
        )
    }

    pub fn object(name: &str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declare a default applied when the caller omits the field. Implies
    /// the field is optional.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    /// Regex constraint. Only meaningful for string fields; ignored on
    /// other kinds.
    pub fn pattern(mut self, pattern: &str) -> Self {
        if let FieldKind::String { pattern: p } = &mut self.kind {
            *p = Some(pattern.to_string());
        }
        self
    }

    /// Inclusive lower bound. Only meaningful for numeric fields.
    pub fn minimum(mut self, min: i64) -> Self {
        match &mut self.kind {
            FieldKind::Integer { minimum, .. } => *minimum = Some(min),
            FieldKind::Number { minimum, .. } => *minimum = Some(min as f64),
            _ => {}
        }
        self
    }

    /// Inclusive upper bound. Only meaningful for numeric fields.
    pub fn maximum(mut self, max: i64) -> Self {
        match &mut self.kind {
            FieldKind::Integer { maximum, .. } => *maximum = Some(max),
            FieldKind::Number { maximum, .. } => *maximum = Some(max as f64),
            _ => {}
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn json_schema(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("type".into(), json!(self.kind.type_name()));
        if !self.description.is_empty() {
            spec.insert("description".into(), json!(self.description));
        }
        match &self.kind {
            FieldKind::String { pattern: Some(p) } => {
                spec.insert("pattern".into(), json!(p));
            }
            FieldKind::Enum { variants } => {
                spec.insert("enum".into(), json!(variants));
            }
            FieldKind::Integer { minimum, maximum } => {
                if let Some(min) = minimum {
                    spec.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    spec.insert("maximum".into(), json!(max));
                }
            }
            FieldKind::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    spec.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    spec.insert("maximum".into(), json!(max));
                }
            }
            FieldKind::Array { items } => {
                spec.insert("items".into(), json!({"type": items.type_name()}));
            }
            _ => {}
        }
        if let Some(default) = &self.default {
            spec.insert("default".into(), default.clone());
        }
        Value::Object(spec)
    }

    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        check_kind(&self.kind, value, &self.name)
    }
}

fn check_kind(kind: &FieldKind, value: &Value, field: &str) -> Result<(), ValidationError> {
    match kind {
        FieldKind::String { pattern } => {
            let Some(s) = value.as_str() else {
                return Err(type_error(field, "a string", value));
            };
            if let Some(p) = pattern {
                let re = Regex::new(p).map_err(|e| {
                    ValidationError::new(field, format!("invalid pattern '{p}': {e}"))
                })?;
                if !re.is_match(s) {
                    return Err(ValidationError::new(
                        field,
                        format!("value '{s}' does not match pattern '{p}'"),
                    ));
                }
            }
            Ok(())
        }
        FieldKind::Integer { minimum, maximum } => {
            let Some(n) = value.as_i64() else {
                return Err(type_error(field, "an integer", value));
            };
            if let Some(min) = minimum {
                if n < *min {
                    return Err(ValidationError::new(
                        field,
                        format!("value {n} is below the minimum of {min}"),
                    ));
                }
            }
            if let Some(max) = maximum {
                if n > *max {
                    return Err(ValidationError::new(
                        field,
                        format!("value {n} is above the maximum of {max}"),
                    ));
                }
            }
            Ok(())
        }
        FieldKind::Number { minimum, maximum } => {
            let Some(n) = value.as_f64() else {
                return Err(type_error(field, "a number", value));
            };
            if let Some(min) = minimum {
                if n < *min {
                    return Err(ValidationError::new(
                        field,
                        format!("value {n} is below the minimum of {min}"),
                    ));
                }
            }
            if let Some(max) = maximum {
                if n > *max {
                    return Err(ValidationError::new(
                        field,
                        format!("value {n} is above the maximum of {max}"),
                    ));
                }
            }
            Ok(())
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                return Err(type_error(field, "a boolean", value));
            }
            Ok(())
        }
        FieldKind::Enum { variants } => {
            let Some(s) = value.as_str() else {
                return Err(type_error(field, "a string", value));
            };
            if !variants.iter().any(|v| v == s) {
                return Err(ValidationError::new(
                    field,
                    format!("value '{s}' is not one of [{}]", variants.join(", ")),
                ));
            }
            Ok(())
        }
        FieldKind::Array { items } => {
            let Some(elements) = value.as_array() else {
                return Err(type_error(field, "an array", value));
            };
            for (i, element) in elements.iter().enumerate() {
                check_kind(items, element, &format!("{field}[{i}]"))?;
            }
            Ok(())
        }
        FieldKind::Object => {
            if !value.is_object() {
                return Err(type_error(field, "an object", value));
            }
            Ok(())
        }
    }
}

fn type_error(field: &str, expected: &str, got: &Value) -> ValidationError {
    let got_type = match got {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ValidationError::new(field, format!("expected {expected}, got {got_type}"))
}

/// An ordered set of parameter fields for one tool.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// JSON Schema representation in the shape LLM tool-calling APIs expect.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.json_schema());
            if field.required {
                required.push(json!(field.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate caller-supplied arguments.
    ///
    /// On success, returns the arguments with declared defaults filled in
    /// for absent optional fields. Unknown fields pass through untouched;
    /// values are never coerced beyond default application.
    pub fn validate(&self, args: &Value) -> Result<Value, ValidationError> {
        let Some(supplied) = args.as_object() else {
            return Err(ValidationError::new(
                "",
                "arguments must be a JSON object",
            ));
        };
        let mut validated = supplied.clone();

        for field in &self.fields {
            match validated.get(&field.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &field.default {
                        validated.insert(field.name.clone(), default.clone());
                    } else if field.required {
                        return Err(ValidationError::new(
                            &field.name,
                            "missing required field",
                        ));
                    }
                }
                Some(value) => field.check(value)?,
            }
        }

        Ok(Value::Object(validated))
    }
}
