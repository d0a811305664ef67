use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

use super::tool::Tool;
use crate::errors::{RegistryError, RegistryResult};
use crate::models::tool::ToolSpec;

pub const MAX_TOOL_NAME_LENGTH: usize = 64;

lazy_static! {
    static ref TOOL_NAME: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Check a tool against the naming and description rules, in order: name length, name
/// characters, description.
pub fn validate_tool(tool: &dyn Tool) -> RegistryResult<()> {
    let name = tool.name();
    let length = name.chars().count();
    if length == 0 || length > MAX_TOOL_NAME_LENGTH {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: format!(
                "name must be between 1 and {} characters, got {}",
                MAX_TOOL_NAME_LENGTH, length
            ),
        });
    }
    if !TOOL_NAME.is_match(name) {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: "name must match the pattern [A-Za-z0-9_-]+".to_string(),
        });
    }
    if tool.description().is_empty() {
        return Err(RegistryError::InvalidDescription(name.to_string()));
    }
    Ok(())
}

/// The tools available to one agent, in registration order.
///
/// The registry only holds handles; a tool registered here is the same instance callers get
/// back from [`get`](Self::get).
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> RegistryResult<()> {
        self.register_all([tool])
    }

    /// Register a batch of tools. The batch is validated as a whole first, so either every
    /// tool is registered or none is.
    pub fn register_all<I>(&mut self, tools: I) -> RegistryResult<()>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let batch: Vec<Arc<dyn Tool>> = tools.into_iter().collect();

        for (index, tool) in batch.iter().enumerate() {
            validate_tool(tool.as_ref())?;
            let name = tool.name();
            let repeated = batch[..index].iter().any(|earlier| earlier.name() == name);
            if repeated || self.contains(name) {
                return Err(RegistryError::DuplicateName(name.to_string()));
            }
        }

        for tool in batch {
            debug!(tool = tool.name(), "registered tool");
            self.tools.push(tool);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name() == name)
    }

    pub fn remove(&mut self, name: &str) -> RegistryResult<Arc<dyn Tool>> {
        let index = self
            .tools
            .iter()
            .position(|tool| tool.name() == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        debug!(tool = name, "removed tool");
        Ok(self.tools.remove(index))
    }

    /// A snapshot of the registered tools in registration order
    pub fn list(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    /// Specs of every registered tool, for building a model request
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| tool.tool_spec().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|tool| tool.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::function_tool::FunctionTool;
    use serde_json::json;

    fn tool(name: &str, description: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionTool::from_fn(name, description, json!({}), |_, _| Ok(())))
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_tool(tool("a", "d").as_ref()).is_ok());
        assert!(validate_tool(tool(&"x".repeat(64), "d").as_ref()).is_ok());
        assert!(validate_tool(tool("get-weather_2", "d").as_ref()).is_ok());

        for bad in ["", "has space", "dots.not.allowed", "émoji"] {
            let err = validate_tool(tool(bad, "d").as_ref()).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidName { .. }), "{bad:?}");
        }
        let err = validate_tool(tool(&"x".repeat(65), "d").as_ref()).unwrap_err();
        assert!(err.to_string().contains("between 1 and 64"));
    }

    #[test]
    fn test_name_checked_before_description() {
        let err = validate_tool(tool("bad name", "").as_ref()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName { .. }));

        let err = validate_tool(tool("good", "").as_ref()).unwrap_err();
        assert_eq!(err, RegistryError::InvalidDescription("good".to_string()));
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("a", "first")).unwrap();
        registry.register(tool("b", "second")).unwrap();
        assert_eq!(format!("{:?}", registry), r#"["a", "b"]"#);
        assert_eq!(registry.tool_specs()[1].name, "b");
    }
}
