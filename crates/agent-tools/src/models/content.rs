use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::media::{DocumentBlock, ImageBlock, VideoBlock};
use crate::errors::ContentResult;
use crate::value::{deep_copy_with_validation, AnyValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

/// Structured content. The payload is JSON by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonBlock {
    pub json: Value,
}

impl JsonBlock {
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// Build from a dynamic value, rejecting anything without a JSON form
    pub fn from_value(value: &AnyValue) -> ContentResult<Self> {
        Ok(Self {
            json: deep_copy_with_validation(value, "json")?,
        })
    }
}

/// A tool call issued by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseBlock {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUseBlock {
    /// Create a tool use with a freshly generated id
    pub fn new<S: Into<String>>(name: S, input: Value) -> Self {
        Self::with_id(format!("tooluse_{}", Uuid::new_v4().simple()), name, input)
    }

    pub fn with_id<I: Into<String>, S: Into<String>>(tool_use_id: I, name: S, input: Value) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// The subset of content a tool result may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolResultContent {
    Text(TextBlock),
    Json(JsonBlock),
    Image(ImageBlock),
    Video(VideoBlock),
    Document(DocumentBlock),
}

impl ToolResultContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ToolResultContent::Text(TextBlock::new(text))
    }

    pub fn json(json: Value) -> Self {
        ToolResultContent::Json(JsonBlock::new(json))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolResultContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ToolResultContent::Json(json) => Some(&json.json),
            _ => None,
        }
    }
}

/// Raw tool result input. `content` items are dispatched by key, see
/// [`tool_result_content_from_data`](super::message::tool_result_content_from_data).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultBlockData {
    pub tool_use_id: String,
    pub status: ToolResultStatus,
    #[serde(default)]
    pub content: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub status: ToolResultStatus,
    pub content: Vec<ToolResultContent>,
}

impl ToolResultBlock {
    pub fn success<S: Into<String>>(tool_use_id: S, content: Vec<ToolResultContent>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolResultStatus::Success,
            content,
        }
    }

    /// An error result whose only content is `Error: <message>`
    pub fn error<S: Into<String>, M: std::fmt::Display>(tool_use_id: S, message: M) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolResultStatus::Error,
            content: vec![ToolResultContent::text(format!("Error: {}", message))],
        }
    }

    pub fn from_data(data: ToolResultBlockData) -> ContentResult<Self> {
        let content = data
            .content
            .iter()
            .map(super::message::tool_result_content_from_data)
            .collect::<ContentResult<Vec<_>>>()?;
        Ok(Self {
            tool_use_id: data.tool_use_id,
            status: data.status,
            content,
        })
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }

    /// All text content joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ToolResultContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A model's thinking trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::media::base64_bytes::option"
    )]
    pub redacted_content: Option<Vec<u8>>,
}

impl ReasoningBlock {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            signature: None,
            redacted_content: None,
        }
    }

    pub fn with_signature<S: Into<String>>(mut self, signature: S) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Default,
}

/// Prompt cache marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachePointBlock {
    #[serde(default)]
    pub cache_type: CacheType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardQualifier {
    GroundingSource,
    Query,
    GuardContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardContentText {
    pub text: String,
    #[serde(default)]
    pub qualifiers: Vec<GuardQualifier>,
}

/// Content handed to a moderation guardrail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardContentBlock {
    pub text: GuardContentText,
}

impl GuardContentBlock {
    pub fn new<S: Into<String>>(text: S, qualifiers: Vec<GuardQualifier>) -> Self {
        Self {
            text: GuardContentText {
                text: text.into(),
                qualifiers,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// One unit of message payload
pub enum ContentBlock {
    Text(TextBlock),
    Json(JsonBlock),
    Image(ImageBlock),
    Video(VideoBlock),
    Document(DocumentBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
    Reasoning(ReasoningBlock),
    CachePoint(CachePointBlock),
    GuardContent(GuardContentBlock),
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text(TextBlock::new(text))
    }

    pub fn json(json: Value) -> Self {
        ContentBlock::Json(JsonBlock::new(json))
    }

    /// The wire discriminator of this block
    pub fn block_type(&self) -> &'static str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::Json(_) => "json",
            ContentBlock::Image(_) => "image",
            ContentBlock::Video(_) => "video",
            ContentBlock::Document(_) => "document",
            ContentBlock::ToolUse(_) => "toolUse",
            ContentBlock::ToolResult(_) => "toolResult",
            ContentBlock::Reasoning(_) => "reasoning",
            ContentBlock::CachePoint(_) => "cachePoint",
            ContentBlock::GuardContent(_) => "guardContent",
        }
    }

    /// Get the text content if this is a TextBlock variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUseBlock> {
        if let ContentBlock::ToolUse(ref tool_use) = self {
            Some(tool_use)
        } else {
            None
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResultBlock> {
        if let ContentBlock::ToolResult(ref tool_result) = self {
            Some(tool_result)
        } else {
            None
        }
    }
}

macro_rules! impl_into_content_block {
    ($($block:ident => $variant:ident),* $(,)?) => {
        $(impl From<$block> for ContentBlock {
            fn from(block: $block) -> Self {
                ContentBlock::$variant(block)
            }
        })*
    };
}

impl_into_content_block!(
    TextBlock => Text,
    JsonBlock => Json,
    ImageBlock => Image,
    VideoBlock => Video,
    DocumentBlock => Document,
    ToolUseBlock => ToolUse,
    ToolResultBlock => ToolResult,
    ReasoningBlock => Reasoning,
    CachePointBlock => CachePoint,
    GuardContentBlock => GuardContent,
);

impl From<ToolResultContent> for ContentBlock {
    fn from(content: ToolResultContent) -> Self {
        match content {
            ToolResultContent::Text(text) => ContentBlock::Text(text),
            ToolResultContent::Json(json) => ContentBlock::Json(json),
            ToolResultContent::Image(image) => ContentBlock::Image(image),
            ToolResultContent::Video(video) => ContentBlock::Video(video),
            ToolResultContent::Document(document) => ContentBlock::Document(document),
        }
    }
}
