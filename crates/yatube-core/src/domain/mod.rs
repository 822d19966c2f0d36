//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod page;
mod post;
mod user;

pub use comment::{Comment, NewComment};
pub use follow::{Follow, FollowLabel};
pub use group::{Group, GroupFields};
pub use page::{POSTS_PER_PAGE, Page, Pagination};
pub use post::{NewPost, Ordering, Post, PostFilter, PostQuery, PostUpdate};
pub use user::{NewUser, User};

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::ValidationError;

/// Current time at the precision the database keeps (microseconds).
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::too_long(field, max));
    }
    Ok(())
}
