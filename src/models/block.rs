use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::content::{BlockContent, BlockKind};

/// Prefix of identifiers handed out by the editor before the owning module
/// is saved.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// A content block as it travels over the wire.
///
/// The payload may live in the nested `content` object or, for older
/// documents, in flat fields on the block itself. Everything that is not one
/// of the known envelope keys ends up in `legacy`; the normalizer decides
/// which of the two layouts wins for any given field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub legacy: Map<String, Value>,
}

impl ContentBlock {
    /// Fresh block with a temporary identifier and the kind's default content.
    pub fn new(kind: BlockKind, order: u32) -> Self {
        Self::from_content(BlockContent::defaults(kind), order)
    }

    pub fn from_content(content: BlockContent, order: u32) -> Self {
        Self {
            id: Some(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())),
            kind: Some(content.kind().as_str().to_string()),
            order: Some(order),
            content: Some(content.to_value()),
            legacy: Map::new(),
        }
    }

    /// Parsed kind, `None` when the type is missing or not one we know.
    pub fn block_kind(&self) -> Option<BlockKind> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// Stable per-block key used to address answer state and DOM nodes.
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("block-{}", self.order.unwrap_or(0)),
        }
    }

    /// True until the backend has assigned a persistent identifier.
    pub fn is_temporary(&self) -> bool {
        match &self.id {
            Some(id) => id.is_empty() || id.starts_with(TEMP_ID_PREFIX),
            None => true,
        }
    }

    /// Nested `content` object, if present and an object.
    pub fn content_object(&self) -> Option<&Map<String, Value>> {
        self.content.as_ref().and_then(Value::as_object)
    }
}
