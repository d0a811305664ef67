use anyhow::anyhow;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};
use serde_json::{json, Value};
use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use super::tool::{Tool, ToolContext, ToolProgress, ToolStream, ToolStreamEvent};
use crate::errors::JsonValidationError;
use crate::models::content::{ToolResultBlock, ToolResultContent};
use crate::models::tool::ToolSpec;
use crate::value::{deep_copy_with_validation, AnyValue};

/// One step of a streaming callback
#[derive(Debug, Clone, PartialEq)]
pub enum ToolYield {
    /// Forwarded to the caller as a progress event
    Progress(AnyValue),
    /// The final value; anything the stream produces afterwards is ignored
    Return(AnyValue),
}

impl ToolYield {
    pub fn progress<V: Into<AnyValue>>(value: V) -> Self {
        ToolYield::Progress(value.into())
    }

    pub fn done<V: Into<AnyValue>>(value: V) -> Self {
        ToolYield::Return(value.into())
    }
}

pub type SyncCallback = dyn Fn(Value, ToolContext) -> anyhow::Result<AnyValue> + Send + Sync;
pub type AsyncCallback =
    dyn Fn(Value, ToolContext) -> BoxFuture<'static, anyhow::Result<AnyValue>> + Send + Sync;
pub type StreamCallback =
    dyn Fn(Value, ToolContext) -> BoxStream<'static, anyhow::Result<ToolYield>> + Send + Sync;

/// The shape of a tool's implementation, chosen when the tool is built
#[derive(Clone)]
pub enum ToolCallback {
    Sync(Arc<SyncCallback>),
    Async(Arc<AsyncCallback>),
    /// A stream that ends without [`ToolYield::Return`] returns undefined
    Stream(Arc<StreamCallback>),
}

/// A [`Tool`] backed by a plain callback.
///
/// Whatever the callback does, each invocation ends in exactly one [`ToolResultBlock`]:
/// errors and panics raised by the callback become error results, and the returned value is
/// normalized by [`wrap_tool_output`].
#[derive(Clone)]
pub struct FunctionTool {
    spec: ToolSpec,
    callback: ToolCallback,
}

impl FunctionTool {
    pub fn new(spec: ToolSpec, callback: ToolCallback) -> Self {
        Self { spec, callback }
    }

    /// A tool whose callback returns its value directly
    pub fn from_fn<N, D, F, R>(name: N, description: D, input_schema: Value, f: F) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        F: Fn(Value, ToolContext) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<AnyValue>,
    {
        let callback: Arc<SyncCallback> =
            Arc::new(move |input, context| f(input, context).map(Into::<AnyValue>::into));
        Self::new(
            ToolSpec::new(name, description, input_schema),
            ToolCallback::Sync(callback),
        )
    }

    /// A tool whose callback returns a future
    pub fn from_async<N, D, F, Fut, R>(name: N, description: D, input_schema: Value, f: F) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        F: Fn(Value, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Into<AnyValue> + Send + 'static,
    {
        let callback: Arc<AsyncCallback> = Arc::new(move |input, context| {
            let pending = f(input, context);
            async move {
                let value = pending.await?;
                Ok::<AnyValue, anyhow::Error>(value.into())
            }
            .boxed()
        });
        Self::new(
            ToolSpec::new(name, description, input_schema),
            ToolCallback::Async(callback),
        )
    }

    /// A tool whose callback streams progress before returning
    pub fn from_stream<N, D, F, S>(name: N, description: D, input_schema: Value, f: F) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        F: Fn(Value, ToolContext) -> S + Send + Sync + 'static,
        S: Stream<Item = anyhow::Result<ToolYield>> + Send + 'static,
    {
        let callback: Arc<StreamCallback> =
            Arc::new(move |input, context| f(input, context).boxed());
        Self::new(
            ToolSpec::new(name, description, input_schema),
            ToolCallback::Stream(callback),
        )
    }
}

impl Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self.callback {
            ToolCallback::Sync(_) => "sync",
            ToolCallback::Async(_) => "async",
            ToolCallback::Stream(_) => "stream",
        };
        f.debug_struct("FunctionTool")
            .field("spec", &self.spec)
            .field("callback", &shape)
            .finish()
    }
}

impl Tool for FunctionTool {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn stream(&self, context: ToolContext) -> ToolStream {
        let callback = self.callback.clone();
        let tool_name = self.spec.name.clone();

        Box::pin(async_stream::stream! {
            let tool_use_id = context.tool_use.tool_use_id.clone();
            let input = context.tool_use.input.clone();
            debug!(tool = %tool_name, tool_use_id = %tool_use_id, "invoking function tool");

            let outcome = match callback {
                ToolCallback::Sync(f) => panic::catch_unwind(AssertUnwindSafe(|| f(input, context)))
                    .unwrap_or_else(|payload| Err(panic_error(payload))),
                ToolCallback::Async(f) => {
                    match panic::catch_unwind(AssertUnwindSafe(|| f(input, context))) {
                        Ok(pending) => AssertUnwindSafe(pending)
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|payload| Err(panic_error(payload))),
                        Err(payload) => Err(panic_error(payload)),
                    }
                }
                ToolCallback::Stream(f) => {
                    match panic::catch_unwind(AssertUnwindSafe(|| f(input, context))) {
                        Ok(steps) => {
                            let mut steps = AssertUnwindSafe(steps).catch_unwind();
                            let mut outcome = Ok(AnyValue::Undefined);
                            while let Some(step) = steps.next().await {
                                match step {
                                    Ok(Ok(ToolYield::Progress(data))) => {
                                        yield ToolStreamEvent::Progress(ToolProgress { data });
                                    }
                                    Ok(Ok(ToolYield::Return(value))) => {
                                        outcome = Ok(value);
                                        break;
                                    }
                                    Ok(Err(err)) => {
                                        outcome = Err(err);
                                        break;
                                    }
                                    Err(payload) => {
                                        outcome = Err(panic_error(payload));
                                        break;
                                    }
                                }
                            }
                            outcome
                        }
                        Err(payload) => Err(panic_error(payload)),
                    }
                }
            };

            yield ToolStreamEvent::Result(into_tool_result(&tool_name, tool_use_id, outcome));
        })
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool panicked".to_string());
    anyhow!(message)
}

fn into_tool_result(
    tool_name: &str,
    tool_use_id: String,
    outcome: anyhow::Result<AnyValue>,
) -> ToolResultBlock {
    let value = match outcome {
        Ok(value) => value,
        Err(err) => {
            warn!(tool = tool_name, tool_use_id = %tool_use_id, error = %err, "tool callback failed");
            return ToolResultBlock::error(tool_use_id, format!("{:#}", err));
        }
    };

    match wrap_tool_output(&value) {
        Ok(content) => ToolResultBlock::success(tool_use_id, vec![content]),
        Err(err) => {
            warn!(tool = tool_name, tool_use_id = %tool_use_id, error = %err, "tool result is not serializable");
            ToolResultBlock::error(tool_use_id, err)
        }
    }
}

/// Normalize a tool's return value into result content.
///
/// - null and undefined become the text sentinels `<null>` and `<undefined>`
/// - strings, numbers and booleans become their text form
/// - arrays become `{"$value": [...]}` json, since bare arrays are not valid structured content
/// - anything else is copied into a json block, failing if it has no JSON form
pub fn wrap_tool_output(value: &AnyValue) -> Result<ToolResultContent, JsonValidationError> {
    if let Some(text) = value.to_primitive_string() {
        return Ok(ToolResultContent::text(text));
    }
    match value {
        AnyValue::Null => Ok(ToolResultContent::text("<null>")),
        AnyValue::Undefined => Ok(ToolResultContent::text("<undefined>")),
        AnyValue::Array(_) => {
            let copied = deep_copy_with_validation(value, "result")?;
            Ok(ToolResultContent::json(json!({ "$value": copied })))
        }
        _ => Ok(ToolResultContent::json(deep_copy_with_validation(
            value, "result",
        )?)),
    }
}
