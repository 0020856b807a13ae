//! Declarative schema checking for profile documents.
//!
//! A schema is a whitelist of required fields. Leaves are either a primitive
//! type tag or a list of allowed literal values; inner nodes are nested
//! schemas. Fields not named by the schema are never looked at.

use serde_json::Value;
use std::fmt;

/// Identifier used when neither the caller nor the document provides one.
pub const UNKNOWN_PROFILE: &str = "unknown profile";

/// Primitive type tags understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// JSON boolean.
    Boolean,
    /// JSON number.
    Number,
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl PrimitiveType {
    /// Parse a type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// Type tag as it appears in schemas and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Check whether a value has this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Name of a JSON value's type for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A declarative schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Value must have the given primitive type.
    Type(PrimitiveType),
    /// Value must equal one of the listed literals.
    Enum(Vec<Value>),
    /// Value must be an object containing every listed field.
    Object(Vec<(String, Schema)>),
}

/// Error building a [`Schema`] from its JSON description.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid schema at {path}: {reason}")]
pub struct SchemaDefinitionError {
    /// Location of the bad node.
    pub path: String,
    /// What was wrong.
    pub reason: String,
}

impl Schema {
    /// Build a schema from its JSON description.
    ///
    /// Strings are type tags, arrays are enum value lists and objects are nested schemas.
    /// Field order is preserved so errors come out in declaration order.
    pub fn from_json(value: &Value) -> Result<Self, SchemaDefinitionError> {
        Self::from_json_at(value, "$")
    }

    fn from_json_at(value: &Value, path: &str) -> Result<Self, SchemaDefinitionError> {
        match value {
            Value::String(tag) => PrimitiveType::from_tag(tag).map(Schema::Type).ok_or_else(|| {
                SchemaDefinitionError {
                    path: path.to_string(),
                    reason: format!("unknown type tag \"{}\"", tag),
                }
            }),
            Value::Array(values) => Ok(Schema::Enum(values.clone())),
            Value::Object(fields) => fields
                .iter()
                .map(|(key, child)| {
                    Self::from_json_at(child, &format!("{}.{}", path, key))
                        .map(|schema| (key.clone(), schema))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Schema::Object),
            other => Err(SchemaDefinitionError {
                path: path.to_string(),
                reason: format!("unexpected {}", type_name(other)),
            }),
        }
    }
}

/// What went wrong with one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// A required field is absent.
    MissingField {
        /// Field name.
        field: String,
    },
    /// A value is not one of the allowed literals.
    InvalidValue {
        /// Field name.
        field: String,
        /// Offending value.
        value: Value,
        /// Allowed values.
        allowed: Vec<Value>,
    },
    /// A value has the wrong type.
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected type tag.
        expected: &'static str,
        /// Actual type name.
        actual: &'static str,
    },
}

/// A single schema mismatch, annotated with profile id and field path.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Profile the error belongs to.
    pub profile_id: String,
    /// Dotted path of the object containing the field.
    pub context: String,
    /// The problem.
    pub issue: ValidationIssue,
}

impl ValidationError {
    /// Name of the field the error is about.
    pub fn field(&self) -> &str {
        match &self.issue {
            ValidationIssue::MissingField { field }
            | ValidationIssue::InvalidValue { field, .. }
            | ValidationIssue::TypeMismatch { field, .. } => field,
        }
    }
}

fn display_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            ValidationIssue::MissingField { field } => write!(
                f,
                "[{}] {}: missing required field \"{}\"",
                self.profile_id, self.context, field
            ),
            ValidationIssue::InvalidValue { field, value, allowed } => {
                let allowed: Vec<String> = allowed.iter().map(display_literal).collect();
                write!(
                    f,
                    "[{}] {}.{}: invalid value \"{}\", expected one of: {}",
                    self.profile_id,
                    self.context,
                    field,
                    display_literal(value),
                    allowed.join(", ")
                )
            }
            ValidationIssue::TypeMismatch { field, expected, actual } => write!(
                f,
                "[{}] {}.{}: expected {}, got {}",
                self.profile_id, self.context, field, expected, actual
            ),
        }
    }
}

/// Check `value` against `schema`.
///
/// Never fails and never mutates: every mismatch becomes one entry in the returned list.
/// When `profile_id` is `None` the document's own `id` field is used, falling back to
/// [`UNKNOWN_PROFILE`].
pub fn validate(
    value: &Value,
    schema: &Schema,
    context: &str,
    profile_id: Option<&str>,
) -> Vec<ValidationError> {
    let profile_id = profile_id
        .map(str::to_string)
        .or_else(|| value.get("id").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_PROFILE.to_string());

    let mut errors = Vec::new();
    match schema {
        Schema::Object(fields) => validate_fields(value, fields, context, &profile_id, &mut errors),
        // A non-object root has no field name to report against.
        Schema::Type(_) | Schema::Enum(_) => {}
    }
    errors
}

fn validate_fields(
    value: &Value,
    fields: &[(String, Schema)],
    context: &str,
    profile_id: &str,
    errors: &mut Vec<ValidationError>,
) {
    let error = |issue| ValidationError {
        profile_id: profile_id.to_string(),
        context: context.to_string(),
        issue,
    };

    for (field, schema) in fields {
        let Some(child) = value.get(field.as_str()) else {
            errors.push(error(ValidationIssue::MissingField { field: field.clone() }));
            continue;
        };

        match schema {
            Schema::Object(nested) => {
                if child.is_object() {
                    let nested_context = format!("{}.{}", context, field);
                    validate_fields(child, nested, &nested_context, profile_id, errors);
                } else {
                    errors.push(error(ValidationIssue::TypeMismatch {
                        field: field.clone(),
                        expected: PrimitiveType::Object.as_str(),
                        actual: type_name(child),
                    }));
                }
            }
            Schema::Enum(allowed) => {
                if !allowed.contains(child) {
                    errors.push(error(ValidationIssue::InvalidValue {
                        field: field.clone(),
                        value: child.clone(),
                        allowed: allowed.clone(),
                    }));
                }
            }
            Schema::Type(expected) => {
                if expected.matches(child) {
                    continue;
                }
                // Colors may be written as hex strings or as numbers.
                if field == "color"
                    && *expected == PrimitiveType::String
                    && (child.is_string() || child.is_number())
                {
                    continue;
                }
                errors.push(error(ValidationIssue::TypeMismatch {
                    field: field.clone(),
                    expected: expected.as_str(),
                    actual: type_name(child),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_json(&json!({
            "renderer": {
                "antialias": "boolean",
                "precision": ["highp", "mediump", "lowp"],
                "pixelRatio": "number",
            },
            "background": { "color": "string" },
        }))
        .unwrap()
    }

    fn valid() -> Value {
        json!({
            "id": "doc",
            "renderer": { "antialias": true, "precision": "highp", "pixelRatio": 1.5 },
            "background": { "color": "#ffffff" },
            "extra": "ignored",
        })
    }

    #[test]
    fn test_valid_document_has_no_errors() {
        assert!(validate(&valid(), &schema(), "Profile", None).is_empty());
    }

    #[test]
    fn test_missing_fields_are_additive() {
        let mut doc = valid();
        doc["renderer"].as_object_mut().unwrap().remove("antialias");
        let errors = validate(&doc, &schema(), "Profile", None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "antialias");
        assert_eq!(
            errors[0].to_string(),
            "[doc] Profile.renderer: missing required field \"antialias\""
        );

        doc["renderer"].as_object_mut().unwrap().remove("pixelRatio");
        let errors = validate(&doc, &schema(), "Profile", None);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].field(), "pixelRatio");
    }

    #[test]
    fn test_missing_nested_block_reports_once() {
        let mut doc = valid();
        doc.as_object_mut().unwrap().remove("renderer");
        let errors = validate(&doc, &schema(), "Profile", Some("explicit"));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[explicit] Profile: missing required field \"renderer\""
        );
    }

    #[test]
    fn test_enum_violation_lists_allowed_values() {
        let mut doc = valid();
        doc["renderer"]["precision"] = json!("ultra");
        let errors = validate(&doc, &schema(), "Profile", None);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[doc] Profile.renderer.precision: invalid value \"ultra\", expected one of: highp, mediump, lowp"
        );
    }

    #[test]
    fn test_type_mismatch() {
        let mut doc = valid();
        doc["renderer"]["antialias"] = json!("yes");
        let errors = validate(&doc, &schema(), "Profile", None);
        assert_eq!(
            errors[0].to_string(),
            "[doc] Profile.renderer.antialias: expected boolean, got string"
        );
    }

    #[test]
    fn test_color_accepts_string_or_number() {
        let mut doc = valid();
        doc["background"]["color"] = json!(0xffffff);
        assert!(validate(&doc, &schema(), "Profile", None).is_empty());
        doc["background"]["color"] = json!("0xffffff");
        assert!(validate(&doc, &schema(), "Profile", None).is_empty());
        doc["background"]["color"] = json!(true);
        assert_eq!(validate(&doc, &schema(), "Profile", None).len(), 1);
    }

    #[test]
    fn test_unknown_profile_id_fallback() {
        let doc = json!({});
        let errors = validate(&doc, &schema(), "Profile", None);
        assert!(errors[0].to_string().starts_with("[unknown profile]"));
    }

    #[test]
    fn test_nested_schema_over_scalar_is_type_error() {
        let mut doc = valid();
        doc["renderer"] = json!(3);
        let errors = validate(&doc, &schema(), "Profile", None);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[doc] Profile.renderer: expected object, got number"
        );
    }

    #[test]
    fn test_bad_schema_definition() {
        assert!(Schema::from_json(&json!({ "a": "integer" })).is_err());
        assert!(Schema::from_json(&json!({ "a": 3 })).is_err());
    }
}
