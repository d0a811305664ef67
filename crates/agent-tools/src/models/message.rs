use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::{
    CachePointBlock, ContentBlock, GuardContentBlock, JsonBlock, ReasoningBlock, TextBlock,
    ToolResultBlock, ToolResultBlockData, ToolResultContent, ToolUseBlock,
};
use super::media::{DocumentBlock, ImageBlock, VideoBlock};
use crate::errors::{ContentError, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Create a new, empty user message
    pub fn user() -> Self {
        Self::new(Role::User, Vec::new())
    }

    /// Create a new, empty assistant message
    pub fn assistant() -> Self {
        Self::new(Role::Assistant, Vec::new())
    }

    /// Append any content block to the message
    pub fn with_content<C: Into<ContentBlock>>(mut self, content: C) -> Self {
        self.content.push(content.into());
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(TextBlock::new(text))
    }

    pub fn with_tool_use(self, tool_use: ToolUseBlock) -> Self {
        self.with_content(tool_use)
    }

    pub fn with_tool_result(self, tool_result: ToolResultBlock) -> Self {
        self.with_content(tool_result)
    }

    /// All text blocks joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_uses(&self) -> Vec<&ToolUseBlock> {
        self.content
            .iter()
            .filter_map(ContentBlock::as_tool_use)
            .collect()
    }

    pub fn tool_results(&self) -> Vec<&ToolResultBlock> {
        self.content
            .iter()
            .filter_map(ContentBlock::as_tool_result)
            .collect()
    }

    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, ContentBlock::ToolUse(_)))
    }
}

/// A content block that may already be typed or still be raw wire data
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum BlockInput {
    Typed(ContentBlock),
    Raw(Value),
}

impl From<Value> for BlockInput {
    fn from(value: Value) -> Self {
        BlockInput::Raw(value)
    }
}

impl From<ContentBlock> for BlockInput {
    fn from(block: ContentBlock) -> Self {
        BlockInput::Typed(block)
    }
}

/// Loosely typed message input, e.g. `{"role": "user", "content": [{"text": "hi"}]}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageData {
    pub role: Role,
    pub content: Vec<BlockInput>,
}

fn parse<T: DeserializeOwned>(kind: &'static str, payload: &Value) -> ContentResult<T> {
    T::deserialize(payload).map_err(|e| ContentError::invalid_data(kind, e))
}

fn parse_text(payload: &Value) -> ContentResult<TextBlock> {
    let text: String = parse("text", payload)?;
    Ok(TextBlock::new(text))
}

/// Convert one block. Typed blocks pass through untouched; raw objects are dispatched on the
/// first recognized key.
pub fn content_block_from_data<B: Into<BlockInput>>(input: B) -> ContentResult<ContentBlock> {
    let raw = match input.into() {
        BlockInput::Typed(block) => return Ok(block),
        BlockInput::Raw(raw) => raw,
    };
    let members = raw.as_object().ok_or(ContentError::UnknownContentBlock)?;

    if let Some(payload) = members.get("text") {
        Ok(ContentBlock::Text(parse_text(payload)?))
    } else if let Some(payload) = members.get("toolUse") {
        Ok(ContentBlock::ToolUse(parse::<ToolUseBlock>("toolUse", payload)?))
    } else if let Some(payload) = members.get("toolResult") {
        let data = parse::<ToolResultBlockData>("toolResult", payload)?;
        Ok(ContentBlock::ToolResult(ToolResultBlock::from_data(data)?))
    } else if let Some(payload) = members.get("reasoning") {
        Ok(ContentBlock::Reasoning(parse::<ReasoningBlock>("reasoning", payload)?))
    } else if let Some(payload) = members.get("cachePoint") {
        Ok(ContentBlock::CachePoint(parse::<CachePointBlock>("cachePoint", payload)?))
    } else if let Some(payload) = members.get("guardContent") {
        Ok(ContentBlock::GuardContent(parse::<GuardContentBlock>("guardContent", payload)?))
    } else if let Some(payload) = members.get("image") {
        Ok(ContentBlock::Image(ImageBlock::from_data(parse("image", payload)?)?))
    } else if let Some(payload) = members.get("video") {
        Ok(ContentBlock::Video(VideoBlock::from_data(parse("video", payload)?)?))
    } else if let Some(payload) = members.get("document") {
        Ok(ContentBlock::Document(DocumentBlock::from_data(parse("document", payload)?)?))
    } else {
        Err(ContentError::UnknownContentBlock)
    }
}

/// Convert one raw tool result content item (`text`, `json`, `image`, `video`, `document`)
pub fn tool_result_content_from_data(raw: &Value) -> ContentResult<ToolResultContent> {
    let members = raw.as_object().ok_or(ContentError::UnknownToolResultContent)?;

    if let Some(payload) = members.get("text") {
        Ok(ToolResultContent::Text(parse_text(payload)?))
    } else if let Some(payload) = members.get("json") {
        Ok(ToolResultContent::Json(JsonBlock::new(payload.clone())))
    } else if let Some(payload) = members.get("image") {
        Ok(ToolResultContent::Image(ImageBlock::from_data(parse("image", payload)?)?))
    } else if let Some(payload) = members.get("video") {
        Ok(ToolResultContent::Video(VideoBlock::from_data(parse("video", payload)?)?))
    } else if let Some(payload) = members.get("document") {
        Ok(ToolResultContent::Document(DocumentBlock::from_data(parse("document", payload)?)?))
    } else {
        Err(ContentError::UnknownToolResultContent)
    }
}

/// Build a typed message. Block order is kept; the first failing block fails the whole call.
pub fn message_from_data(data: MessageData) -> ContentResult<Message> {
    let content = data
        .content
        .into_iter()
        .map(content_block_from_data)
        .collect::<ContentResult<Vec<_>>>()?;
    Ok(Message::new(data.role, content))
}

impl TryFrom<MessageData> for Message {
    type Error = ContentError;

    fn try_from(data: MessageData) -> ContentResult<Self> {
        message_from_data(data)
    }
}

/// The blocks allowed in a system prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SystemContentBlock {
    Text(TextBlock),
    CachePoint(CachePointBlock),
    GuardContent(GuardContentBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    Text(String),
    Blocks(Vec<SystemContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum SystemBlockInput {
    Typed(SystemContentBlock),
    Raw(Value),
}

impl From<Value> for SystemBlockInput {
    fn from(value: Value) -> Self {
        SystemBlockInput::Raw(value)
    }
}

impl From<SystemContentBlock> for SystemBlockInput {
    fn from(block: SystemContentBlock) -> Self {
        SystemBlockInput::Typed(block)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SystemPromptData {
    Text(String),
    Blocks(Vec<SystemBlockInput>),
}

/// Convert one system prompt block (`text`, `cachePoint`, `guardContent`)
pub fn system_content_block_from_data<B: Into<SystemBlockInput>>(
    input: B,
) -> ContentResult<SystemContentBlock> {
    let raw = match input.into() {
        SystemBlockInput::Typed(block) => return Ok(block),
        SystemBlockInput::Raw(raw) => raw,
    };
    let members = raw.as_object().ok_or(ContentError::UnknownSystemContentBlock)?;

    if let Some(payload) = members.get("text") {
        Ok(SystemContentBlock::Text(parse_text(payload)?))
    } else if let Some(payload) = members.get("cachePoint") {
        Ok(SystemContentBlock::CachePoint(parse("cachePoint", payload)?))
    } else if let Some(payload) = members.get("guardContent") {
        Ok(SystemContentBlock::GuardContent(parse("guardContent", payload)?))
    } else {
        Err(ContentError::UnknownSystemContentBlock)
    }
}

pub fn system_prompt_from_data(data: SystemPromptData) -> ContentResult<SystemPrompt> {
    match data {
        SystemPromptData::Text(text) => Ok(SystemPrompt::Text(text)),
        SystemPromptData::Blocks(blocks) => blocks
            .into_iter()
            .map(system_content_block_from_data)
            .collect::<ContentResult<Vec<_>>>()
            .map(SystemPrompt::Blocks),
    }
}
