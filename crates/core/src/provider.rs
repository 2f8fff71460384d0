//! Provider trait: the abstraction over the external model service.
//!
//! A Provider takes a system prompt plus a single user turn and returns the
//! model's reply as a list of content segments. The framework imposes no
//! schema on the reply; skills re-validate whatever comes back.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request to the model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model identifier (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// System message followed by the single user turn
    pub messages: Vec<Message>,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Sampling temperature; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    /// Build a single-turn request: system instructions plus one user message.
    pub fn single_turn(
        model: impl Into<String>,
        max_tokens: u32,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::system(system), Message::user(user)],
            max_tokens,
            temperature: None,
        }
    }
}

/// One segment of the model's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    /// Plain reply text
    Text { text: String },
    /// Extended-thinking output
    Thinking { thinking: String },
    /// A tool invocation (never requested by skills, kept for fidelity)
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Reply segments in the order the provider returned them
    pub content: Vec<ContentSegment>,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Why generation stopped ("end_turn", "max_tokens", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

impl ProviderResponse {
    /// A response holding one text segment.
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::Text { text: text.into() }],
            usage: None,
            model: model.into(),
            stop_reason: Some("end_turn".into()),
        }
    }

    /// The first text segment, which is taken as the full reply.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|segment| match segment {
            ContentSegment::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The skill manager calls `complete()` without knowing which backend (or
/// which retry wrapper) sits behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and wait for the complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn single_turn_request_shape() {
        let req = ProviderRequest::single_turn("claude-sonnet-4-20250514", 2048, "You are...", "{}");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[1].role, Role::User);
        assert_eq!(req.max_tokens, 2048);
        assert!(req.temperature.is_none());
    }

    #[test]
    fn first_text_skips_thinking() {
        let resp = ProviderResponse {
            content: vec![
                ContentSegment::Thinking { thinking: "hmm".into() },
                ContentSegment::Text { text: "first".into() },
                ContentSegment::Text { text: "second".into() },
            ],
            usage: None,
            model: "m".into(),
            stop_reason: None,
        };
        assert_eq!(resp.first_text(), Some("first"));
    }

    #[test]
    fn first_text_absent() {
        let resp = ProviderResponse {
            content: vec![],
            usage: None,
            model: "m".into(),
            stop_reason: None,
        };
        assert!(resp.first_text().is_none());
    }

    #[test]
    fn segment_serialization_is_tagged() {
        let seg = ContentSegment::Text { text: "hi".into() };
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains("\"type\":\"text\""));
    }
}
