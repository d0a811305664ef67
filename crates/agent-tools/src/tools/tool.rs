use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tracing::warn;

use super::state::AgentState;
use crate::models::content::{ToolResultBlock, ToolUseBlock};
use crate::models::message::Message;
use crate::models::tool::ToolSpec;
use crate::value::AnyValue;

/// An intermediate value emitted by a tool before its result. The value is forwarded as the
/// tool produced it, without conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolProgress {
    pub data: AnyValue,
}

impl ToolProgress {
    pub fn new<V: Into<AnyValue>>(data: V) -> Self {
        Self { data: data.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolStreamEvent {
    Progress(ToolProgress),
    /// Always the last event of a stream
    Result(ToolResultBlock),
}

/// Lazy, single-consumer sequence of events for one invocation
pub type ToolStream = BoxStream<'static, ToolStreamEvent>;

/// What a tool can see of the agent running it
#[derive(Debug, Clone, Default)]
pub struct AgentHandle {
    pub state: AgentState,
    /// Conversation history at the time of the call
    pub messages: Arc<Vec<Message>>,
}

impl AgentHandle {
    pub fn new(state: AgentState, messages: Vec<Message>) -> Self {
        Self {
            state,
            messages: Arc::new(messages),
        }
    }
}

/// Everything handed to a tool for one invocation
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub tool_use: ToolUseBlock,
    pub agent: AgentHandle,
}

impl ToolContext {
    pub fn new(tool_use: ToolUseBlock) -> Self {
        Self {
            tool_use,
            agent: AgentHandle::default(),
        }
    }

    pub fn with_agent(mut self, agent: AgentHandle) -> Self {
        self.agent = agent;
        self
    }
}

/// Core trait that defines a tool an agent can call
pub trait Tool: Send + Sync {
    /// Name, description and input schema as presented to the model
    fn tool_spec(&self) -> &ToolSpec;

    fn name(&self) -> &str {
        &self.tool_spec().name
    }

    fn description(&self) -> &str {
        &self.tool_spec().description
    }

    /// Start an invocation. Nothing runs until the stream is polled; the stream yields any
    /// number of progress events followed by exactly one result.
    fn stream(&self, context: ToolContext) -> ToolStream;
}

/// A completed invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub progress: Vec<ToolProgress>,
    pub result: ToolResultBlock,
}

#[async_trait]
pub trait ToolExt: Tool {
    /// Drive [`Tool::stream`] to completion, collecting progress along the way
    async fn invoke(&self, context: ToolContext) -> ToolInvocation;
}

#[async_trait]
impl<T: Tool + ?Sized> ToolExt for T {
    async fn invoke(&self, context: ToolContext) -> ToolInvocation {
        let tool_use_id = context.tool_use.tool_use_id.clone();
        let mut events = self.stream(context);
        let mut progress = Vec::new();

        while let Some(event) = events.next().await {
            match event {
                ToolStreamEvent::Progress(update) => progress.push(update),
                ToolStreamEvent::Result(result) => return ToolInvocation { progress, result },
            }
        }

        warn!(tool = self.name(), tool_use_id = %tool_use_id, "tool stream ended without a result");
        ToolInvocation {
            progress,
            result: ToolResultBlock::error(
                tool_use_id,
                format!("tool '{}' finished without producing a result", self.name()),
            ),
        }
    }
}
