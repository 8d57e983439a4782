use serde_json::{Map, Value};

use crate::error::{validation_error, ToolError};

/// Declares a tool's parameters once and generates both the JSON schema and
/// the typed extraction from it.
///
/// Each entry is `required(...)` or `optional(...)` with the Rust field name,
/// the value type (`string` or `string_array`), the case-sensitive wire name
/// and a description. Optional parameters become `Option<_>` fields.
#[macro_export]
macro_rules! tool_params {
    (
        $struct_name:ident
        $(, $kind:ident($field:ident: $type:ident = $wire:literal, $desc:expr))* $(,)?
    ) => {
        pub struct $struct_name {
            $(pub $field: $crate::tool_params!(@rust_type $kind $type),)*
        }

        impl $crate::mcp::ToolParams for $struct_name {
            fn input_schema() -> serde_json::Value {
                #[allow(unused_mut)]
                let mut properties = serde_json::Map::new();
                #[allow(unused_mut)]
                let mut required: Vec<&'static str> = Vec::new();
                $(
                    properties.insert($wire.to_owned(), $crate::tool_params!(@schema $type, $desc));
                    if $crate::tool_params!(@is_required $kind) {
                        required.push($wire);
                    }
                )*

                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                })
            }

            fn extract_params(
                arguments: &serde_json::Value,
            ) -> Result<Self, $crate::error::ToolError> {
                let _arguments = $crate::mcp::params::arguments_object(arguments)?;
                Ok(Self {
                    $(
                        $field: $crate::tool_params!(@extract $kind $type, _arguments, $wire)?,
                    )*
                })
            }
        }
    };

    // Type mappings
    (@rust_type required string) => { String };
    (@rust_type optional string) => { Option<String> };
    (@rust_type required string_array) => { Vec<String> };
    (@rust_type optional string_array) => { Option<Vec<String>> };

    (@schema string, $desc:expr) => {
        serde_json::json!({ "type": "string", "description": $desc })
    };
    (@schema string_array, $desc:expr) => {
        serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": $desc
        })
    };

    (@is_required required) => { true };
    (@is_required optional) => { false };

    // Extraction
    (@extract required string, $args:expr, $name:expr) => {
        $crate::mcp::params::required_string($args, $name)
    };
    (@extract optional string, $args:expr, $name:expr) => {
        $crate::mcp::params::optional_string($args, $name)
    };
    (@extract required string_array, $args:expr, $name:expr) => {
        $crate::mcp::params::required_string_array($args, $name)
    };
    (@extract optional string_array, $args:expr, $name:expr) => {
        $crate::mcp::params::optional_string_array($args, $name)
    };
}

pub type Arguments<'a> = Option<&'a Map<String, Value>>;

/// `null` or missing arguments count as an empty object.
pub fn arguments_object(arguments: &Value) -> Result<Arguments<'_>, ToolError> {
    match arguments {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(validation_error("Invalid arguments: expected an object")),
    }
}

fn lookup<'a>(arguments: Arguments<'a>, name: &str) -> Option<&'a Value> {
    arguments?.get(name).filter(|value| !value.is_null())
}

fn as_string(value: &Value, name: &str) -> Result<String, ToolError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| validation_error(format!("Invalid parameter {name}: expected string")))
}

fn as_string_array(value: &Value, name: &str) -> Result<Vec<String>, ToolError> {
    let invalid = || validation_error(format!("Invalid parameter {name}: expected array of strings"));

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_owned).ok_or_else(invalid))
        .collect()
}

fn missing(name: &str) -> ToolError {
    validation_error(format!("Missing required parameter: {name}"))
}

pub fn required_string(arguments: Arguments<'_>, name: &str) -> Result<String, ToolError> {
    lookup(arguments, name)
        .ok_or_else(|| missing(name))
        .and_then(|value| as_string(value, name))
}

pub fn optional_string(arguments: Arguments<'_>, name: &str) -> Result<Option<String>, ToolError> {
    lookup(arguments, name)
        .map(|value| as_string(value, name))
        .transpose()
}

pub fn required_string_array(
    arguments: Arguments<'_>,
    name: &str,
) -> Result<Vec<String>, ToolError> {
    lookup(arguments, name)
        .ok_or_else(|| missing(name))
        .and_then(|value| as_string_array(value, name))
}

pub fn optional_string_array(
    arguments: Arguments<'_>,
    name: &str,
) -> Result<Option<Vec<String>>, ToolError> {
    lookup(arguments, name)
        .map(|value| as_string_array(value, name))
        .transpose()
}
