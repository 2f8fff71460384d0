//! Message domain types.
//!
//! A skill invocation is a single-turn exchange: one system message carrying
//! the skill prompt and one user message carrying the serialized task input.
//! No conversation state survives between invocations.

use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller's task input
    User,
    /// The model's reply
    Assistant,
    /// Skill instructions
    System,
}

/// A single message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("{\"case_id\": \"12345\"}");
        assert_eq!(msg.role, Role::User);
        assert!(msg.content.contains("12345"));
    }

    #[test]
    fn message_serializes_role_and_content_only() {
        let json = serde_json::to_value(Message::system("prompt")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "prompt"}));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
