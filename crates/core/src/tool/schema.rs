use serde_json::{Map, Value};

/// Checks that a declared parameter schema describes a JSON object.
///
/// Rejecting anything else at registration time keeps malformed tool
/// declarations out of the run loop entirely.
pub(crate) fn ensure_object_schema(schema: &Value) -> Result<(), String> {
    let Some(obj) = schema.as_object() else {
        return Err("parameter schema must be a JSON object".to_owned());
    };
    match obj.get("type") {
        // schemars omits `type` for schemas that accept any object.
        None => Ok(()),
        Some(Value::String(ty)) if ty == "object" => Ok(()),
        Some(other) => Err(format!(
            "parameter schema must describe an object, got type {other}"
        )),
    }
}

/// Checks an argument payload against a recorded parameter schema.
///
/// Every offending field is collected, so the model receives a complete
/// picture in one round trip. A failed check means the tool body is
/// never invoked for this call.
pub(crate) fn validate_arguments(
    schema: &Value,
    args: &Value,
) -> Result<(), Vec<String>> {
    let Some(args_obj) = args.as_object() else {
        return Err(vec!["arguments must be a JSON object".to_owned()]);
    };
    let Some(schema_obj) = schema.as_object() else {
        return Ok(());
    };

    let mut issues = Vec::new();

    if let Some(required) = schema_obj.get("required").and_then(Value::as_array)
    {
        for name in required.iter().filter_map(Value::as_str) {
            if !args_obj.contains_key(name) {
                issues.push(format!("missing required field `{name}`"));
            }
        }
    }

    let empty = Map::new();
    let properties = schema_obj
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let sealed =
        schema_obj.get("additionalProperties") == Some(&Value::Bool(false));

    for (name, value) in args_obj {
        let Some(prop) = properties.get(name) else {
            if sealed {
                issues.push(format!("unexpected field `{name}`"));
            }
            continue;
        };
        let Some(expected) = prop.get("type").and_then(Value::as_str) else {
            continue;
        };
        if !type_matches(expected, value) {
            issues.push(format!(
                "`{name}`: expected {expected}, got {}",
                type_name(value)
            ));
        }
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Unknown type names are left to serde deserialization.
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
