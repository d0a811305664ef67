use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a model sees of a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON Schema of the input the tool accepts
    pub input_schema: Value,
}

impl ToolSpec {
    /// Create a new tool spec with the given name, description and input schema
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolSpec {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
