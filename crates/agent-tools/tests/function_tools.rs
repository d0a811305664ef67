use anyhow::anyhow;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;

use agent_tools::models::content::{ToolResultContent, ToolUseBlock};
use agent_tools::models::message::Message;
use agent_tools::tools::{
    AgentHandle, AgentState, FunctionTool, Tool, ToolContext, ToolExt, ToolProgress,
    ToolRegistry, ToolStreamEvent, ToolYield,
};
use agent_tools::value::AnyValue;

fn context(name: &str, input: Value) -> ToolContext {
    ToolContext::new(ToolUseBlock::with_id("tool-1", name, input))
}

fn echo_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": {
                "type": "string",
                "description": "The message to echo"
            }
        },
        "required": ["message"]
    })
}

/// A tool that echoes its input back to the caller
fn echo_tool() -> FunctionTool {
    FunctionTool::from_fn("echo", "reply with the input", echo_schema(), |input, _| {
        let message = input
            .get("message")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("message parameter required"))?;
        Ok(message.to_string())
    })
}

#[tokio::test]
async fn test_sync_tool_returns_text() {
    let invocation = echo_tool()
        .invoke(context("echo", json!({"message": "Hello, world!"})))
        .await;

    assert!(!invocation.result.is_error());
    assert_eq!(invocation.result.tool_use_id, "tool-1");
    assert_eq!(invocation.result.text(), "Hello, world!");
}

#[tokio::test]
async fn test_callback_error_becomes_error_result() {
    let invocation = echo_tool().invoke(context("echo", json!({}))).await;

    assert!(invocation.result.is_error());
    assert_eq!(
        invocation.result.text(),
        "Error: message parameter required"
    );
}

#[tokio::test]
async fn test_null_and_array_results() {
    let null_tool = FunctionTool::from_fn("nothing", "returns null", json!({}), |_, _| {
        Ok(AnyValue::Null)
    });
    let invocation = null_tool.invoke(context("nothing", json!({}))).await;
    assert_eq!(invocation.result.text(), "<null>");

    let list_tool = FunctionTool::from_fn("list", "returns a list", json!({}), |_, _| {
        Ok(vec![1, 2, 3])
    });
    let invocation = list_tool.invoke(context("list", json!({}))).await;
    assert_eq!(
        invocation.result.content,
        vec![ToolResultContent::json(json!({"$value": [1, 2, 3]}))]
    );
}

#[tokio::test]
async fn test_unserializable_result_is_error() {
    let tool = FunctionTool::from_fn("big", "returns a bigint", json!({}), |_, _| {
        Ok(AnyValue::object([("total", AnyValue::BigInt(1 << 70))]))
    });
    let invocation = tool.invoke(context("big", json!({}))).await;

    assert!(invocation.result.is_error());
    assert!(invocation.result.text().contains("result.total"));
}

#[tokio::test]
async fn test_panic_is_contained() {
    let tool = FunctionTool::from_fn("boom", "always panics", json!({}), |_, _| -> anyhow::Result<()> {
        panic!("kaboom")
    });
    let invocation = tool.invoke(context("boom", json!({}))).await;

    assert!(invocation.result.is_error());
    assert_eq!(invocation.result.text(), "Error: kaboom");
}

#[tokio::test]
async fn test_async_tool() {
    let tool = FunctionTool::from_async("add", "adds two numbers", json!({}), |input, _| async move {
        tokio::task::yield_now().await;
        let a = input["a"].as_i64().unwrap_or_default();
        let b = input["b"].as_i64().unwrap_or_default();
        Ok::<_, anyhow::Error>(a + b)
    });
    let invocation = tool.invoke(context("add", json!({"a": 2, "b": 3}))).await;

    assert_eq!(invocation.result.text(), "5");
}

async fn refuse() -> anyhow::Result<i32> {
    tokio::task::yield_now().await;
    Err(anyhow!("boom"))
}

async fn explode() -> anyhow::Result<i32> {
    tokio::task::yield_now().await;
    panic!("async kaboom")
}

#[tokio::test]
async fn test_async_failures_become_error_results() {
    let tool = FunctionTool::from_async("refuse", "always fails", json!({}), |_, _| refuse());
    let invocation = tool.invoke(context("refuse", json!({}))).await;
    assert!(invocation.result.is_error());
    assert_eq!(invocation.result.text(), "Error: boom");

    let tool = FunctionTool::from_async("explode", "panics while awaited", json!({}), |_, _| {
        explode()
    });
    let invocation = tool.invoke(context("explode", json!({}))).await;
    assert!(invocation.result.is_error());
    assert_eq!(invocation.result.text(), "Error: async kaboom");
}

#[tokio::test]
async fn test_stream_panic_after_progress() {
    let tool = FunctionTool::from_stream("crash", "panics midway", json!({}), |_, _| {
        async_stream::stream! {
            yield Ok::<_, anyhow::Error>(ToolYield::progress("p"));
            panic!("stream kaboom");
        }
    });
    let invocation = tool.invoke(context("crash", json!({}))).await;

    assert_eq!(invocation.progress, vec![ToolProgress::new("p")]);
    assert!(invocation.result.is_error());
    assert_eq!(invocation.result.text(), "Error: stream kaboom");
}

#[tokio::test]
async fn test_large_and_tiny_numbers_render_like_scripts() {
    let tool = FunctionTool::from_fn("scale", "returns a number", json!({}), |input, _| {
        Ok(input["n"].as_f64().unwrap_or_default())
    });
    for (n, expected) in [(1e21, "1e+21"), (1e-7, "1e-7"), (-0.0, "0"), (12.5, "12.5")] {
        let invocation = tool.invoke(context("scale", json!({"n": n}))).await;
        assert_eq!(invocation.result.text(), expected);
    }
}

#[tokio::test]
async fn test_stream_tool_emits_progress_then_result() {
    let tool = FunctionTool::from_stream("count", "counts to two", json!({}), |_, _| {
        async_stream::stream! {
            yield Ok::<_, anyhow::Error>(ToolYield::progress("a"));
            yield Ok(ToolYield::progress("b"));
            yield Ok(ToolYield::done("done"));
            yield Ok(ToolYield::progress("ignored"));
        }
    });

    let events: Vec<ToolStreamEvent> = tool.stream(context("count", json!({}))).collect().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], ToolStreamEvent::Progress(ToolProgress::new("a")));
    assert_eq!(events[1], ToolStreamEvent::Progress(ToolProgress::new("b")));
    match &events[2] {
        ToolStreamEvent::Result(result) => assert_eq!(result.text(), "done"),
        other => panic!("expected a result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_error_after_progress() {
    let tool = FunctionTool::from_stream("flaky", "fails midway", json!({}), |_, _| {
        futures::stream::iter(vec![Ok(ToolYield::progress(1)), Err(anyhow!("boom"))])
    });
    let invocation = tool.invoke(context("flaky", json!({}))).await;

    assert_eq!(invocation.progress, vec![ToolProgress::new(1)]);
    assert_eq!(invocation.result.text(), "Error: boom");
}

#[tokio::test]
async fn test_stream_without_return_is_undefined() {
    let tool = FunctionTool::from_stream("quiet", "never returns", json!({}), |_, _| {
        futures::stream::iter(vec![Ok(ToolYield::progress("working"))])
    });
    let invocation = tool.invoke(context("quiet", json!({}))).await;

    assert_eq!(invocation.progress.len(), 1);
    assert_eq!(invocation.result.text(), "<undefined>");
}

#[tokio::test]
async fn test_tool_reads_and_writes_agent_state() {
    let tool = FunctionTool::from_fn("visit", "counts visits", json!({}), |_, context| {
        let state = &context.agent.state;
        let visits = state.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
        state.set("visits", visits)?;
        Ok(format!("{} visits, {} messages", visits, context.agent.messages.len()))
    });

    let state = AgentState::new();
    let agent = AgentHandle::new(state.clone(), vec![Message::user().with_text("hi")]);

    tool.invoke(context("visit", json!({})).with_agent(agent.clone())).await;
    let invocation = tool.invoke(context("visit", json!({})).with_agent(agent)).await;

    assert_eq!(invocation.result.text(), "2 visits, 1 messages");
    assert_eq!(state.get("visits"), Some(json!(2)));
}

#[tokio::test]
async fn test_registered_tool_is_invocable() {
    let mut registry = ToolRegistry::new();
    let echo: Arc<dyn Tool> = Arc::new(echo_tool());
    registry.register(echo.clone()).unwrap();

    let found = registry.get("echo").unwrap();
    assert!(Arc::ptr_eq(&found, &echo));

    let invocation = found.invoke(context("echo", json!({"message": "via registry"}))).await;
    assert_eq!(invocation.result.text(), "via registry");
}
