//! Checks parsed tool arguments against the tool's declared parameter schema.
//!
//! Only the subset of JSON Schema that tool declarations actually use is
//! understood: `type`, `required`, `properties`, `enum` and array `items`.
//! Unknown keywords are ignored.

use serde_json::{Map, Value};

/// Validate `args` against `schema`, returning a message naming the first violation.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    validate_value(schema, args, "arguments")
}

fn validate_value(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            return Err(format!(
                "{path} must be of type {expected}, got {}",
                type_name(value)
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!("{path} must be one of {}", Value::Array(allowed.clone())));
        }
    }

    match value {
        Value::Object(object) => validate_object(schema, object, path),
        Value::Array(items) => match schema.get("items") {
            Some(item_schema) => {
                for (index, item) in items.iter().enumerate() {
                    validate_value(item_schema, item, &format!("{path}[{index}]"))?;
                }
                Ok(())
            }
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn validate_object(
    schema: &Map<String, Value>,
    object: &Map<String, Value>,
    path: &str,
) -> Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            match object.get(key) {
                None | Some(Value::Null) => {
                    return Err(format!("{path} is missing required field '{key}'"));
                }
                Some(_) => {}
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, property_schema) in properties {
            if let Some(value) = object.get(key) {
                if value.is_null() {
                    continue;
                }
                validate_value(property_schema, value, &format!("{path}.{key}"))?;
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
