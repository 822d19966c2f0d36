use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{max_chars, require_text};
use crate::error::ValidationError;

pub const TITLE_MAX_LENGTH: usize = 200;
pub const SLUG_MAX_LENGTH: usize = 50;

/// Group entity - a named topic that posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Create a new group from already validated fields.
    pub fn new(fields: GroupFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            slug: fields.slug,
            description: fields.description,
        }
    }

    /// Replace every editable field, keeping the identity.
    pub fn apply(&mut self, fields: GroupFields) {
        self.title = fields.title;
        self.slug = fields.slug;
        self.description = fields.description;
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Editable group fields, used for both create and update.
///
/// There is no default slug: every group must be given one explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFields {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl GroupFields {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        max_chars("title", &self.title, TITLE_MAX_LENGTH)?;

        require_text("slug", &self.slug)?;
        max_chars("slug", &self.slug, SLUG_MAX_LENGTH)?;
        if !self
            .slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::new(
                "slug",
                "may contain only letters, digits, hyphens and underscores",
            ));
        }
        Ok(())
    }
}
