//! Depth-first validation of a raw argument tree against a schema.
//!
//! The walk never short-circuits: every field problem is collected so the
//! caller gets a complete report in one round trip. Unknown fields are
//! ignored for forward compatibility. Values are never coerced; the only
//! writes into the output are declared defaults for absent optional fields.

use serde_json::{Map, Value};

use super::types::{Args, FieldKind, FieldSpec, Schema, ValidationError};

/// Validates `raw` against `schema`.
///
/// On success returns the typed argument object with defaults applied. On
/// failure returns every field problem found. An absent or `null` argument
/// bag is treated as an empty object so tools with all-optional inputs can
/// be called bare.
pub fn validate(schema: &Schema, raw: &Value) -> Result<Args, Vec<ValidationError>> {
    let empty = Map::new();
    let input = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(vec![ValidationError::new(
                "$",
                format!("expected an object, got {}", type_name(other)),
            )]);
        }
    };

    let mut errors = Vec::new();
    let output = validate_object(&schema.fields, input, "", &mut errors);
    if errors.is_empty() {
        Ok(Args::from_map(output))
    } else {
        Err(errors)
    }
}

fn validate_object(
    fields: &[FieldSpec],
    input: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Map<String, Value> {
    let mut output = Map::new();
    for field in fields {
        let field_path = join_path(path, field.name);
        match input.get(field.name) {
            Some(Value::Null) | None => {
                if let Some(default) = &field.default {
                    output.insert(field.name.to_string(), default.clone());
                } else if field.required {
                    errors.push(ValidationError::new(field_path, "required field is missing"));
                }
            }
            Some(value) => {
                if let Some(accepted) = check_value(field, value, &field_path, errors) {
                    output.insert(field.name.to_string(), accepted);
                }
            }
        }
    }
    output
}

/// Checks one present value against its spec. Returns the accepted value
/// (with nested defaults applied for objects) or `None` after recording
/// the problem.
fn check_value(
    field: &FieldSpec,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    match &field.kind {
        FieldKind::String => {
            if value.is_string() {
                Some(value.clone())
            } else {
                errors.push(wrong_kind(path, "a string", value));
                None
            }
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Some(value.clone())
            } else {
                errors.push(wrong_kind(path, "a boolean", value));
                None
            }
        }
        FieldKind::Number => {
            let Some(number) = value.as_f64() else {
                errors.push(wrong_kind(path, "a number", value));
                return None;
            };
            let before = errors.len();
            check_bounds(field, number, path, errors);
            (errors.len() == before).then(|| value.clone())
        }
        FieldKind::Integer => {
            let Some(number) = value.as_f64() else {
                errors.push(wrong_kind(path, "a number", value));
                return None;
            };
            let before = errors.len();
            // A whole-valued float (25.0) is accepted; the output is stored
            // in integer representation so integer reads always see it.
            if number.fract() != 0.0 {
                errors.push(ValidationError::new(path, "must be an integer"));
            }
            check_bounds(field, number, path, errors);
            (errors.len() == before).then(|| Value::from(number as i64))
        }
        FieldKind::Enum(allowed) => {
            let Some(text) = value.as_str() else {
                errors.push(wrong_kind(path, "a string", value));
                return None;
            };
            if allowed.contains(&text) {
                Some(value.clone())
            } else {
                errors.push(ValidationError::new(
                    path,
                    format!("must be one of: {}", allowed.join(", ")),
                ));
                None
            }
        }
        FieldKind::Array(items) => {
            let Some(elements) = value.as_array() else {
                errors.push(wrong_kind(path, "an array", value));
                return None;
            };
            let before = errors.len();
            if let Some(count) = field.min_items {
                if elements.len() < count {
                    errors.push(ValidationError::new(
                        path,
                        format!("must contain at least {count} item(s)"),
                    ));
                }
            }
            let mut accepted = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let element_path = format!("{path}[{index}]");
                if let Some(value) = check_element(items, element, &element_path, errors) {
                    accepted.push(value);
                }
            }
            (errors.len() == before).then_some(Value::Array(accepted))
        }
        FieldKind::Map => {
            if value.is_object() {
                Some(value.clone())
            } else {
                errors.push(wrong_kind(path, "an object", value));
                None
            }
        }
        FieldKind::Object(fields) => {
            let Some(map) = value.as_object() else {
                errors.push(wrong_kind(path, "an object", value));
                return None;
            };
            let before = errors.len();
            let nested = validate_object(fields, map, path, errors);
            (errors.len() == before).then_some(Value::Object(nested))
        }
    }
}

/// Array elements carry no per-element bounds of their own; wrap the kind in
/// an anonymous spec so the same checking path applies.
fn check_element(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let spec = FieldSpec {
        name: "",
        kind: kind.clone(),
        required: false,
        default: None,
        min: None,
        max: None,
        min_items: None,
        description: None,
    };
    check_value(&spec, value, path, errors)
}

fn check_bounds(field: &FieldSpec, number: f64, path: &str, errors: &mut Vec<ValidationError>) {
    if let Some(min) = field.min {
        if number < min {
            errors.push(ValidationError::new(path, format!("must be >= {min}")));
        }
    }
    if let Some(max) = field.max {
        if number > max {
            errors.push(ValidationError::new(path, format!("must be <= {max}")));
        }
    }
}

fn wrong_kind(path: &str, expected: &str, got: &Value) -> ValidationError {
    ValidationError::new(path, format!("expected {expected}, got {}", type_name(got)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn search_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::string("projectKey").required(),
            FieldSpec::integer("folderId").min(1.0),
            FieldSpec::integer("limit")
                .min(1.0)
                .max(1000.0)
                .default_value(json!(50)),
            FieldSpec::integer("offset").min(0.0).default_value(json!(0)),
        ])
    }

    #[test]
    fn missing_required_field_is_reported_by_path() {
        let err = validate(&search_schema(), &json!({})).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "projectKey");
        assert_eq!(err[0].message, "required field is missing");
    }

    #[test]
    fn all_errors_collected_without_short_circuit() {
        let schema = Schema::new(vec![
            FieldSpec::string("name").required(),
            FieldSpec::string("projectKey").required(),
            FieldSpec::number("estimatedTime").min(0.0),
        ]);
        let err = validate(&schema, &json!({"estimatedTime": -5})).unwrap_err();
        let paths: Vec<&str> = err.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "projectKey", "estimatedTime"]);
    }

    #[test]
    fn defaults_applied_on_absent_optionals() {
        let args = validate(&search_schema(), &json!({"projectKey": "ABC"})).unwrap();
        assert_eq!(args.u64("limit"), Some(50));
        assert_eq!(args.u64("offset"), Some(0));
        assert!(!args.contains("folderId"));
    }

    #[test]
    fn inclusive_numeric_bounds() {
        let schema = search_schema();
        assert!(validate(&schema, &json!({"projectKey": "ABC", "limit": 1000})).is_ok());
        assert!(validate(&schema, &json!({"projectKey": "ABC", "limit": 1})).is_ok());

        let err = validate(&schema, &json!({"projectKey": "ABC", "limit": 1001})).unwrap_err();
        assert_eq!(err[0].message, "must be <= 1000");

        let err = validate(&schema, &json!({"projectKey": "ABC", "limit": 0})).unwrap_err();
        assert_eq!(err[0].message, "must be >= 1");
    }

    #[test]
    fn fractional_value_rejected_for_integer_fields() {
        let err = validate(
            &search_schema(),
            &json!({"projectKey": "ABC", "limit": 999.5}),
        )
        .unwrap_err();
        assert_eq!(err[0].path, "limit");
        assert_eq!(err[0].message, "must be an integer");
    }

    #[test]
    fn whole_valued_float_accepted_and_readable_as_integer() {
        let args = validate(
            &search_schema(),
            &json!({"projectKey": "ABC", "limit": 25.0}),
        )
        .unwrap();
        assert_eq!(args.u64("limit"), Some(25));
    }

    #[test]
    fn fractional_and_bound_violations_reported_together() {
        let err = validate(
            &search_schema(),
            &json!({"projectKey": "ABC", "limit": 1000.5}),
        )
        .unwrap_err();
        let messages: Vec<&str> = err.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["must be an integer", "must be <= 1000"]);
    }

    #[test]
    fn wrong_kind_is_not_coerced() {
        let err = validate(&search_schema(), &json!({"projectKey": 7})).unwrap_err();
        assert_eq!(err[0].path, "projectKey");
        assert_eq!(err[0].message, "expected a string, got a number");
    }

    #[test]
    fn enum_violation_lists_allowed_set() {
        let schema = Schema::new(vec![FieldSpec::enumeration(
            "status",
            &["PASS", "FAIL", "WIP", "BLOCKED"],
        )
        .required()]);
        let err = validate(&schema, &json!({"status": "SKIPPED"})).unwrap_err();
        assert_eq!(err[0].message, "must be one of: PASS, FAIL, WIP, BLOCKED");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let args = validate(
            &search_schema(),
            &json!({"projectKey": "ABC", "surprise": true}),
        )
        .unwrap();
        assert!(!args.contains("surprise"));
    }

    #[test]
    fn nested_array_of_objects_reports_indexed_paths() {
        let schema = Schema::new(vec![FieldSpec::array(
            "testCases",
            FieldKind::Object(vec![
                FieldSpec::string("projectKey").required(),
                FieldSpec::string("name").required(),
            ]),
        )
        .required()
        .min_items(1)]);

        let err = validate(
            &schema,
            &json!({"testCases": [{"projectKey": "ABC", "name": "ok"}, {"name": 3}]}),
        )
        .unwrap_err();
        let paths: Vec<&str> = err.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["testCases[1].projectKey", "testCases[1].name"]);
    }

    #[test]
    fn min_items_enforced() {
        let schema = Schema::new(vec![FieldSpec::array("issueKeys", FieldKind::String)
            .required()
            .min_items(1)]);
        let err = validate(&schema, &json!({"issueKeys": []})).unwrap_err();
        assert_eq!(err[0].message, "must contain at least 1 item(s)");
    }

    #[test]
    fn freeform_map_passed_through() {
        let schema = Schema::new(vec![FieldSpec::map("customFields")]);
        let args = validate(
            &schema,
            &json!({"customFields": {"anything": [1, 2], "nested": {"ok": true}}}),
        )
        .unwrap();
        assert_eq!(
            args.get("customFields"),
            Some(&json!({"anything": [1, 2], "nested": {"ok": true}}))
        );
    }

    #[test]
    fn null_argument_bag_treated_as_empty() {
        let schema = Schema::new(vec![FieldSpec::number("limit").default_value(json!(10))]);
        let args = validate(&schema, &Value::Null).unwrap();
        assert_eq!(args.u64("limit"), Some(10));
    }

    #[test]
    fn explicit_null_takes_default() {
        let args = validate(
            &search_schema(),
            &json!({"projectKey": "ABC", "limit": null}),
        )
        .unwrap();
        assert_eq!(args.u64("limit"), Some(50));
    }

    #[test]
    fn non_object_bag_is_rejected() {
        let err = validate(&search_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(err[0].path, "$");
    }
}
