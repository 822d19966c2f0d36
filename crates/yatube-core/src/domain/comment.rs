use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;
use crate::error::ValidationError;

/// Comment entity - a reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(new: NewComment) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: new.post_id,
            author_id: new.author_id,
            text: new.text,
            created: super::now(),
        }
    }

    pub fn validate_text(text: &str) -> Result<(), ValidationError> {
        require_text("text", text)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

impl NewComment {
    pub fn new(post_id: Uuid, author_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            post_id,
            author_id,
            text: text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Comment::validate_text(&self.text)
    }
}
