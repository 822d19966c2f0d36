use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use crate::error::ConstraintViolation;

/// Follow entity - a directed subscription from `user_id` to `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

impl Follow {
    /// Build a follow row, refusing a user following themselves.
    pub fn new(user_id: Uuid, author_id: Uuid) -> Result<Self, ConstraintViolation> {
        if user_id == author_id {
            return Err(ConstraintViolation::SelfFollow);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            author_id,
        })
    }

    /// Render the follow with both usernames resolved.
    pub fn describe<'a>(&self, user: &'a User, author: &'a User) -> FollowLabel<'a> {
        FollowLabel { user, author }
    }
}

/// Display form of a follow: `Follower: <user>, author: <author>`.
pub struct FollowLabel<'a> {
    user: &'a User,
    author: &'a User,
}

impl fmt::Display for FollowLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Follower: {}, author: {}", self.user, self.author)
    }
}
