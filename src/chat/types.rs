use crate::gemini::{self, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Model => "Gemini",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    /// Set on a user turn whose send failed. The turn stays in the history.
    pub failed: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            failed: false,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            failed: false,
        }
    }

    pub fn to_content(&self) -> gemini::Content {
        gemini::Content {
            role: Some(self.role.as_str().to_string()),
            parts: vec![Part::text(self.text.clone())],
        }
    }
}
