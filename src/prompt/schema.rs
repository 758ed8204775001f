//! JSON function schemas as handed over by the caller.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable function as described to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: ParametersSchema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    /// Declared parameters, in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, ParameterSchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
}

impl FunctionSchema {
    pub fn is_required(&self, parameter: &str) -> bool {
        self.parameters.required.iter().any(|name| name == parameter)
    }
}

/// One schema or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionInput {
    Single(FunctionSchema),
    Many(Vec<FunctionSchema>),
}

impl FunctionInput {
    pub fn as_slice(&self) -> &[FunctionSchema] {
        match self {
            FunctionInput::Single(schema) => std::slice::from_ref(schema),
            FunctionInput::Many(schemas) => schemas,
        }
    }
}

impl From<FunctionSchema> for FunctionInput {
    fn from(schema: FunctionSchema) -> Self {
        FunctionInput::Single(schema)
    }
}

impl From<Vec<FunctionSchema>> for FunctionInput {
    fn from(schemas: Vec<FunctionSchema>) -> Self {
        FunctionInput::Many(schemas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_keeps_property_order() {
        let schema: FunctionSchema = serde_json::from_value(json!({
            "name": "book",
            "description": "Book a room",
            "parameters": {
                "type": "dict",
                "properties": {
                    "zeta": {"type": "string"},
                    "alpha": {"type": "integer", "enum": [1, 2]},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["zeta"]
            }
        }))
        .unwrap();

        let names: Vec<&str> = schema
            .parameters
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "tags"]);
        assert!(schema.is_required("zeta"));
        assert!(!schema.is_required("alpha"));
        assert_eq!(
            schema.parameters.properties["tags"]
                .items
                .as_ref()
                .and_then(|items| items.type_name.as_deref()),
            Some("string")
        );
    }

    #[test]
    fn test_single_or_many() {
        let single: FunctionInput = serde_json::from_value(json!({"name": "f"})).unwrap();
        assert_eq!(single.as_slice().len(), 1);
        assert!(single.as_slice()[0].parameters.properties.is_empty());

        let many: FunctionInput =
            serde_json::from_value(json!([{"name": "f"}, {"name": "g"}])).unwrap();
        let names: Vec<&str> = many.as_slice().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
    }
}
