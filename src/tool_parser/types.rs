use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::tool_parser::serializer::python_repr;

/// Ordered argument mapping of a single call, in order of first appearance
pub type Arguments = IndexMap<String, TypedValue>;

/// A value recovered from the right-hand side of `key=value`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    /// Integer outside the `i64` range, as exact decimal text with optional `-`
    BigInteger(String),
    Float(f64),
    Boolean(bool),
    String(String),
    None,
    List(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
    /// Dict entries in source order; duplicate keys are collapsed at parse time
    Dict(Vec<(TypedValue, TypedValue)>),
    /// Text that could not be evaluated as a literal
    RawString(String),
}

impl TypedValue {
    /// String content for `String` and `RawString`, `None` for everything else
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) | TypedValue::RawString(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, TypedValue::RawString(_))
    }

    /// JSON view of the value.
    ///
    /// Tuples become arrays, dict keys are stringified the way `json.dumps`
    /// does it, non-finite floats become `null`. Integers beyond `u64` are
    /// approximated as floats.
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::BigInteger(digits) => match digits.parse::<u64>() {
                Ok(value) => Value::from(value),
                Err(_) => digits
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number),
            },
            TypedValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::String(s) | TypedValue::RawString(s) => Value::String(s.clone()),
            TypedValue::None => Value::Null,
            TypedValue::List(items) | TypedValue::Tuple(items) => {
                Value::Array(items.iter().map(TypedValue::to_json).collect())
            }
            TypedValue::Dict(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(json_key(key), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl From<&Value> for TypedValue {
    /// Arrays become lists, objects become dicts keyed by strings
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => TypedValue::None,
            Value::Bool(b) => TypedValue::Boolean(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => TypedValue::Integer(i),
                (None, Some(u)) => TypedValue::BigInteger(u.to_string()),
                (None, None) => TypedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => TypedValue::String(s.clone()),
            Value::Array(items) => TypedValue::List(items.iter().map(TypedValue::from).collect()),
            Value::Object(map) => TypedValue::Dict(
                map.iter()
                    .map(|(k, v)| (TypedValue::String(k.clone()), TypedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

fn json_key(key: &TypedValue) -> String {
    match key {
        TypedValue::String(s) | TypedValue::RawString(s) => s.clone(),
        TypedValue::Integer(i) => i.to_string(),
        TypedValue::BigInteger(digits) => digits.clone(),
        TypedValue::Boolean(b) => b.to_string(),
        TypedValue::None => "null".to_string(),
        other => python_repr(other),
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// One detected call: function name plus its keyword arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub function_name: String,
    pub arguments: Arguments,
}

impl CallRecord {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            arguments: Arguments::new(),
        }
    }

    /// Builder-style argument insertion; a repeated name keeps its first
    /// position and takes the new value
    pub fn with_argument(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.arguments.get(name)
    }

    /// JSON object of the arguments, in argument order
    pub fn arguments_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.arguments {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

/// Parsed tool call in the OpenAI-compatible shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Function call details
    pub function: FunctionCall,
}

/// Function call within a tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as JSON string
    pub arguments: String,
}

impl From<&CallRecord> for ToolCall {
    fn from(record: &CallRecord) -> Self {
        ToolCall {
            function: FunctionCall {
                name: record.function_name.clone(),
                arguments: record.arguments_json().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_argument_keeps_first_position() {
        let record = CallRecord::new("f")
            .with_argument("a", TypedValue::Integer(1))
            .with_argument("b", TypedValue::Integer(2))
            .with_argument("a", TypedValue::Integer(3));

        let names: Vec<&str> = record.arguments.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&TypedValue::Integer(3)));
    }

    #[test]
    fn test_json_view() {
        let value = TypedValue::Dict(vec![
            (TypedValue::String("k".into()), TypedValue::Tuple(vec![TypedValue::Integer(1)])),
            (TypedValue::Integer(2), TypedValue::None),
            (TypedValue::Boolean(true), TypedValue::Float(f64::NAN)),
        ]);
        assert_eq!(value.to_json(), json!({"k": [1], "2": null, "true": null}));
    }

    #[test]
    fn test_big_integer_json_view() {
        let fits_u64 = TypedValue::BigInteger("18446744073709551615".into());
        assert_eq!(fits_u64.to_json(), json!(18446744073709551615u64));
        assert_eq!(TypedValue::from(&json!(18446744073709551615u64)), fits_u64);

        let huge = TypedValue::BigInteger("-100000000000000000000".into());
        assert_eq!(huge.to_json(), json!(-1e20));
    }

    #[test]
    fn test_tool_call_conversion() {
        let record = CallRecord::new("get_weather")
            .with_argument("city", TypedValue::String("Tokyo".into()))
            .with_argument("days", TypedValue::Integer(3));

        let call = ToolCall::from(&record);
        assert_eq!(call.function.name, "get_weather");
        let args: Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(args, json!({"city": "Tokyo", "days": 3}));
    }

    #[test]
    fn test_from_json_value() {
        let value = TypedValue::from(&json!({"unit": "celsius", "days": [1, 2.5], "ok": null}));
        assert_eq!(
            value,
            TypedValue::Dict(vec![
                (
                    TypedValue::String("unit".into()),
                    TypedValue::String("celsius".into())
                ),
                (
                    TypedValue::String("days".into()),
                    TypedValue::List(vec![TypedValue::Integer(1), TypedValue::Float(2.5)])
                ),
                (TypedValue::String("ok".into()), TypedValue::None),
            ])
        );
    }
}
