//! UI-agnostic conversation state types
//!
//! These are shared by every front end and don't depend on any UI framework.
//! A [`Message`] is created once, handed to the
//! [`ConversationStore`](crate::store::ConversationStore), and only read after that.

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    /// Role name used in the `chat_history` sent to the assistant service
    pub fn as_role(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }
}

/// An image attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            url: url.into(),
            alt,
        }
    }

    /// Label for the image at `index` in a gallery, falling back to a 1-based "Image N"
    pub fn gallery_label(&self, index: usize) -> String {
        match self.alt.as_deref() {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ => format!("Image {}", index + 1),
        }
    }
}

/// One exchanged turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    /// Raw text; for assistant messages this may contain `![alt](url)` markup
    pub content: String,
    pub images: Vec<ImageRef>,
    /// Reported by the service and not reconciled with `images`
    pub has_images: bool,
    pub response_time_ms: Option<u64>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
            images: Vec::new(),
            has_images: false,
            response_time_ms: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        images: Vec<ImageRef>,
        has_images: bool,
        response_time_ms: Option<u64>,
    ) -> Self {
        Self {
            author: Author::Assistant,
            content: content.into(),
            images,
            has_images,
            response_time_ms,
        }
    }

    /// A degraded assistant reply carrying only fallback text
    pub fn fallback(content: impl Into<String>) -> Self {
        Self::assistant(content, Vec::new(), false, None)
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    /// Images to show as a gallery. Both the flag and the list must agree.
    pub fn gallery(&self) -> &[ImageRef] {
        if self.has_images {
            &self.images
        } else {
            &[]
        }
    }
}

/// A selectable identity from the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
}
