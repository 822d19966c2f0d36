use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Pagination, max_chars, require_text};
use crate::error::ValidationError;

/// Directory, relative to the media root, that post images are stored under.
pub const IMAGE_UPLOAD_DIR: &str = "posts/";

pub const IMAGE_PATH_MAX_LENGTH: usize = 100;

/// Number of characters of the text used when rendering a post.
const PREVIEW_CHARS: usize = 15;

/// Post entity - a single authored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl Post {
    /// Create a new post; `pub_date` is taken from the clock here and never changes.
    pub fn new(new: NewPost) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: new.text,
            pub_date: super::now(),
            author_id: new.author_id,
            group_id: new.group_id,
            image: new.image.map(|name| image_path(&name)),
        }
    }

    /// Apply an edit. Author and publication date are left alone, and the
    /// image only changes when the edit names a new one or clears it.
    pub fn apply(&mut self, update: PostUpdate) {
        self.text = update.text;
        self.group_id = update.group_id;
        if let Some(name) = update.image {
            self.image = Some(image_path(&name));
        } else if update.clear_image {
            self.image = None;
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

fn image_path(name: &str) -> String {
    if name.starts_with(IMAGE_UPLOAD_DIR) {
        name.to_string()
    } else {
        format!("{IMAGE_UPLOAD_DIR}{name}")
    }
}

fn validate_image(image: Option<&str>) -> Result<(), ValidationError> {
    let Some(name) = image else {
        return Ok(());
    };
    if name.trim().is_empty() {
        return Err(ValidationError::new("image", "file name is empty"));
    }
    if name.starts_with('/') || name.split('/').any(|part| part == "..") {
        return Err(ValidationError::new(
            "image",
            "must be a relative path inside the upload directory",
        ));
    }
    max_chars("image", &image_path(name), IMAGE_PATH_MAX_LENGTH)
}

/// Fields supplied when publishing a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl NewPost {
    pub fn new(author_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            author_id,
            text: text.into(),
            group_id: None,
            image: None,
        }
    }

    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.image = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)?;
        validate_image(self.image.as_deref())
    }
}

/// Replacement values for the editable fields of a post.
///
/// `image: None` keeps the stored picture unless `clear_image` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostUpdate {
    pub text: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub clear_image: bool,
}

impl PostUpdate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            group_id: None,
            image: None,
            clear_image: false,
        }
    }

    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.image = Some(name.into());
        self
    }

    pub fn without_image(mut self) -> Self {
        self.clear_image = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)?;
        validate_image(self.image.as_deref())
    }
}

/// Which posts a listing selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostFilter {
    #[default]
    All,
    Author(Uuid),
    Group(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}

/// Sort order for post and comment listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Criteria for reading posts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub ordering: Ordering,
    pub pagination: Pagination,
}

impl PostQuery {
    pub fn new(filter: PostFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn page(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Whether `post` falls inside this query's filter, given the authors
    /// followed by the filtering user.
    pub fn matches(&self, post: &Post, followed: &[Uuid]) -> bool {
        match self.filter {
            PostFilter::All => true,
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::FollowedBy(_) => followed.contains(&post.author_id),
        }
    }
}
