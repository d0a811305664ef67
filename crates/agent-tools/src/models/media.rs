//! Image, video and document blocks, and the sources their bytes come from.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use super::content::TextBlock;
use crate::errors::{ContentError, ContentResult};

/// Inline bytes travel as base64 strings on the wire
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(crate) enum BytesRepr {
        Encoded(String),
        Octets(Vec<u8>),
    }

    impl BytesRepr {
        pub(crate) fn into_bytes(self) -> Result<Vec<u8>, base64::DecodeError> {
            match self {
                BytesRepr::Encoded(s) => STANDARD.decode(s),
                BytesRepr::Octets(bytes) => Ok(bytes),
            }
        }
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        BytesRepr::deserialize(deserializer)?
            .into_bytes()
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(bytes) => super::serialize(bytes, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            Option::<BytesRepr>::deserialize(deserializer)?
                .map(|repr| repr.into_bytes().map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// A pointer to bytes held in an object store. Never owns the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Location {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_owner: Option<String>,
}

impl S3Location {
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self {
            uri: uri.into(),
            bucket_owner: None,
        }
    }

    pub fn with_bucket_owner<S: Into<String>>(mut self, bucket_owner: S) -> Self {
        self.bucket_owner = Some(bucket_owner.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg | ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoFormat {
    Mkv,
    Mov,
    Mp4,
    Webm,
    Flv,
    Mpeg,
    Mpg,
    Wmv,
    #[serde(rename = "3gp")]
    #[strum(serialize = "3gp")]
    ThreeGp,
}

impl VideoFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoFormat::Mkv => "video/x-matroska",
            VideoFormat::Mov => "video/quicktime",
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Webm => "video/webm",
            VideoFormat::Flv => "video/x-flv",
            VideoFormat::Mpeg | VideoFormat::Mpg => "video/mpeg",
            VideoFormat::Wmv => "video/x-ms-wmv",
            VideoFormat::ThreeGp => "video/3gpp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Csv,
    Doc,
    Docx,
    Xls,
    Xlsx,
    Html,
    Txt,
    Md,
    Json,
    Xml,
}

impl DocumentFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Csv => "text/csv",
            DocumentFormat::Doc => "application/msword",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Xls => "application/vnd.ms-excel",
            DocumentFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            DocumentFormat::Html => "text/html",
            DocumentFormat::Txt => "text/plain",
            DocumentFormat::Md => "text/markdown",
            DocumentFormat::Json => "application/json",
            DocumentFormat::Xml => "application/xml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSource {
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    Url(String),
    S3Location(S3Location),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoSource {
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    S3Location(S3Location),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSource {
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    Text(String),
    Content(Vec<TextBlock>),
    S3Location(S3Location),
}

fn source_members<'a>(kind: &'static str, source: &'a Value) -> ContentResult<&'a Map<String, Value>> {
    source
        .as_object()
        .ok_or(ContentError::InvalidSource { kind })
}

fn decode<T: serde::de::DeserializeOwned>(kind: &'static str, value: &Value) -> ContentResult<T> {
    T::deserialize(value).map_err(|e| ContentError::invalid_data(kind, e))
}

fn decode_bytes(kind: &'static str, value: &Value) -> ContentResult<Vec<u8>> {
    decode::<base64_bytes::BytesRepr>(kind, value)?
        .into_bytes()
        .map_err(|e| ContentError::invalid_data(kind, e))
}

impl ImageSource {
    /// Resolve a raw source object. Keys are tried in order: `bytes`, `url`, `s3Location`.
    pub fn from_data(source: &Value) -> ContentResult<Self> {
        const KIND: &str = "image";
        let members = source_members(KIND, source)?;
        if let Some(bytes) = members.get("bytes") {
            Ok(ImageSource::Bytes(decode_bytes(KIND, bytes)?))
        } else if let Some(url) = members.get("url") {
            Ok(ImageSource::Url(decode(KIND, url)?))
        } else if let Some(location) = members.get("s3Location") {
            Ok(ImageSource::S3Location(decode(KIND, location)?))
        } else {
            Err(ContentError::InvalidSource { kind: KIND })
        }
    }
}

impl VideoSource {
    /// Resolve a raw source object. Keys are tried in order: `bytes`, `s3Location`.
    pub fn from_data(source: &Value) -> ContentResult<Self> {
        const KIND: &str = "video";
        let members = source_members(KIND, source)?;
        if let Some(bytes) = members.get("bytes") {
            Ok(VideoSource::Bytes(decode_bytes(KIND, bytes)?))
        } else if let Some(location) = members.get("s3Location") {
            Ok(VideoSource::S3Location(decode(KIND, location)?))
        } else {
            Err(ContentError::InvalidSource { kind: KIND })
        }
    }
}

impl DocumentSource {
    /// Resolve a raw source object. Keys are tried in order: `bytes`, `s3Location`, `text`,
    /// `content`. Every `content` item must be a text block.
    pub fn from_data(source: &Value) -> ContentResult<Self> {
        const KIND: &str = "document";
        let members = source_members(KIND, source)?;
        if let Some(bytes) = members.get("bytes") {
            Ok(DocumentSource::Bytes(decode_bytes(KIND, bytes)?))
        } else if let Some(location) = members.get("s3Location") {
            Ok(DocumentSource::S3Location(decode(KIND, location)?))
        } else if let Some(text) = members.get("text") {
            Ok(DocumentSource::Text(decode(KIND, text)?))
        } else if let Some(content) = members.get("content") {
            let items: Vec<Value> = decode(KIND, content)?;
            let blocks = items
                .iter()
                .map(|item| decode::<TextBlock>(KIND, item))
                .collect::<ContentResult<Vec<_>>>()?;
            Ok(DocumentSource::Content(blocks))
        } else {
            Err(ContentError::InvalidSource { kind: KIND })
        }
    }
}

/// Raw image input, as found on the wire or written by hand
#[derive(Debug, Clone, Deserialize)]
pub struct ImageBlockData {
    pub format: ImageFormat,
    pub source: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoBlockData {
    pub format: VideoFormat,
    pub source: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentBlockData {
    pub name: String,
    pub format: DocumentFormat,
    pub source: Value,
    #[serde(default)]
    pub citations: Option<CitationsConfig>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub format: ImageFormat,
    pub source: ImageSource,
}

impl ImageBlock {
    pub fn new(format: ImageFormat, source: ImageSource) -> Self {
        Self { format, source }
    }

    pub fn from_data(data: ImageBlockData) -> ContentResult<Self> {
        Ok(Self {
            format: data.format,
            source: ImageSource::from_data(&data.source)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoBlock {
    pub format: VideoFormat,
    pub source: VideoSource,
}

impl VideoBlock {
    pub fn new(format: VideoFormat, source: VideoSource) -> Self {
        Self { format, source }
    }

    pub fn from_data(data: VideoBlockData) -> ContentResult<Self> {
        Ok(Self {
            format: data.format,
            source: VideoSource::from_data(&data.source)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationsConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBlock {
    pub name: String,
    pub format: DocumentFormat,
    pub source: DocumentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<CitationsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl DocumentBlock {
    pub fn new<S: Into<String>>(name: S, format: DocumentFormat, source: DocumentSource) -> Self {
        Self {
            name: name.into(),
            format,
            source,
            citations: None,
            context: None,
        }
    }

    pub fn with_citations(mut self, enabled: bool) -> Self {
        self.citations = Some(CitationsConfig { enabled });
        self
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn from_data(data: DocumentBlockData) -> ContentResult<Self> {
        Ok(Self {
            name: data.name,
            format: data.format,
            source: DocumentSource::from_data(&data.source)?,
            citations: data.citations,
            context: data.context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_image_source_precedence() {
        let source = ImageSource::from_data(&json!({"bytes": "aGVsbG8=", "url": "https://x"})).unwrap();
        assert_eq!(source, ImageSource::Bytes(b"hello".to_vec()));

        let source = ImageSource::from_data(&json!({"url": "https://example.com/cat.png"})).unwrap();
        assert_eq!(source, ImageSource::Url("https://example.com/cat.png".to_string()));
    }

    #[test]
    fn test_image_source_accepts_octets() {
        let source = ImageSource::from_data(&json!({"bytes": [1, 2, 3]})).unwrap();
        assert_eq!(source, ImageSource::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_invalid_sources() {
        let err = ImageSource::from_data(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid image source");

        // Videos cannot be fetched from a URL
        let err = VideoSource::from_data(&json!({"url": "https://x"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid video source");

        let err = DocumentSource::from_data(&json!("just a string")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid document source");
    }

    #[test]
    fn test_s3_location_copied_verbatim() {
        let source = VideoSource::from_data(&json!({
            "s3Location": {"uri": "s3://bucket/clip.mp4", "bucketOwner": "123456789012"}
        }))
        .unwrap();
        assert_eq!(
            source,
            VideoSource::S3Location(
                S3Location::new("s3://bucket/clip.mp4").with_bucket_owner("123456789012")
            )
        );
    }

    #[test]
    fn test_document_content_source() {
        let block = DocumentBlock::from_data(DocumentBlockData {
            name: "notes".to_string(),
            format: DocumentFormat::Txt,
            source: json!({"content": [{"text": "one"}, {"text": "two"}]}),
            citations: Some(CitationsConfig { enabled: true }),
            context: None,
        })
        .unwrap();
        assert_eq!(
            block.source,
            DocumentSource::Content(vec![TextBlock::new("one"), TextBlock::new("two")])
        );
        assert_eq!(block.citations, Some(CitationsConfig { enabled: true }));

        let err = DocumentSource::from_data(&json!({"content": [{"image": {}}]})).unwrap_err();
        assert!(matches!(err, ContentError::InvalidData { kind: "document", .. }));
    }

    #[test]
    fn test_formats() {
        assert_eq!(VideoFormat::ThreeGp.to_string(), "3gp");
        assert_eq!(VideoFormat::from_str("3gp").unwrap(), VideoFormat::ThreeGp);
        assert_eq!(ImageFormat::Jpg.mime_type(), "image/jpeg");
        assert_eq!(DocumentFormat::from_str("md").unwrap(), DocumentFormat::Md);
        assert_eq!(serde_json::to_value(VideoFormat::ThreeGp).unwrap(), json!("3gp"));
        assert!(serde_json::from_value::<ImageFormat>(json!("bmp")).is_err());
    }

    #[test]
    fn test_bytes_serialize_as_base64() {
        let block = ImageBlock::new(ImageFormat::Png, ImageSource::Bytes(b"hello".to_vec()));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"format": "png", "source": {"bytes": "aGVsbG8="}}));
        let back: ImageBlock = serde_json::from_value(value).unwrap();
        assert_eq!(back, block);
    }
}
