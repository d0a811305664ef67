//! The execution side of tools: the [`Tool`] capability, the callback adapter that lets plain
//! functions satisfy it, the registry an agent keeps them in, and the state they can reach.
pub mod function_tool;
pub mod registry;
pub mod state;
pub mod tool;

pub use function_tool::{wrap_tool_output, FunctionTool, ToolCallback, ToolYield};
pub use registry::ToolRegistry;
pub use state::AgentState;
pub use tool::{
    AgentHandle, Tool, ToolContext, ToolExt, ToolInvocation, ToolProgress, ToolStream,
    ToolStreamEvent,
};
