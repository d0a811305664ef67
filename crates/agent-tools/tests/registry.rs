use serde_json::json;
use std::sync::Arc;

use agent_tools::errors::RegistryError;
use agent_tools::tools::{FunctionTool, Tool, ToolRegistry};

fn tool(name: &str) -> Arc<dyn Tool> {
    Arc::new(FunctionTool::from_fn(
        name,
        format!("the {} tool", name),
        json!({"type": "object"}),
        |_, _| Ok(()),
    ))
}

fn names(registry: &ToolRegistry) -> Vec<String> {
    registry.list().iter().map(|t| t.name().to_string()).collect()
}

#[test]
fn test_register_and_list_in_order() {
    let mut registry = ToolRegistry::new();
    assert!(registry.is_empty());

    registry.register(tool("zeta")).unwrap();
    registry.register_all([tool("alpha"), tool("mid")]).unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(names(&registry), vec!["zeta", "alpha", "mid"]);
    assert!(registry.contains("alpha"));
    assert!(registry.get("missing").is_none());
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("search")).unwrap();

    let err = registry.register(tool("search")).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("search".to_string()));
    assert_eq!(err.to_string(), "Tool with name 'search' already registered");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_batch_is_all_or_nothing() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("existing")).unwrap();

    let err = registry
        .register_all([tool("fresh"), tool("bad name")])
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidName { .. }));

    let err = registry
        .register_all([tool("fresh"), tool("existing")])
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("existing".to_string()));

    let err = registry
        .register_all([tool("twice"), tool("twice")])
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("twice".to_string()));

    assert_eq!(names(&registry), vec!["existing"]);
}

#[test]
fn test_remove() {
    let mut registry = ToolRegistry::new();
    let first = tool("first");
    registry.register_all([first.clone(), tool("second")]).unwrap();

    let removed = registry.remove("first").unwrap();
    assert!(Arc::ptr_eq(&removed, &first));
    assert!(registry.get("first").is_none());
    assert_eq!(names(&registry), vec!["second"]);

    assert!(matches!(
        registry.remove("first"),
        Err(RegistryError::NotFound(name)) if name == "first"
    ));

    registry.register(tool("first")).unwrap();
    assert_eq!(names(&registry), vec!["second", "first"]);
}

#[test]
fn test_list_is_a_snapshot() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("one")).unwrap();

    let mut listed = registry.list();
    listed.clear();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_tool_specs_serialize_for_requests() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("lookup")).unwrap();

    let specs = serde_json::to_value(registry.tool_specs()).unwrap();
    assert_eq!(
        specs,
        json!([{
            "name": "lookup",
            "description": "the lookup tool",
            "inputSchema": {"type": "object"}
        }])
    );
}
