//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use yatube_core::domain::{
    Comment, Group, GroupFields, NewComment, NewPost, Page, Pagination, Post,
    PostUpdate, User,
};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Body for creating a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl From<GroupRequest> for GroupFields {
    fn from(req: GroupRequest) -> Self {
        GroupFields::new(req.title, req.slug, req.description)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

/// A group and one page of its posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPostsResponse {
    pub group: GroupResponse,
    pub posts: PageResponse<PostResponse>,
}

/// Body for publishing or editing a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub text: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
    /// Edit only: drop the stored image. Ignored when `image` is given.
    #[serde(default)]
    pub clear_image: bool,
}

impl PostRequest {
    pub fn into_new_post(self, author_id: Uuid) -> NewPost {
        NewPost {
            author_id,
            text: self.text,
            group_id: self.group_id,
            image: self.image,
        }
    }
}

impl From<PostRequest> for PostUpdate {
    fn from(req: PostRequest) -> Self {
        PostUpdate {
            text: req.text,
            group_id: req.group_id,
            image: req.image,
            clear_image: req.clear_image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl PostResponse {
    pub fn new(post: Post, author: impl Into<String>) -> Self {
        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            author: author.into(),
            group_id: post.group_id,
            image: post.image,
        }
    }
}

/// A post together with its comments, newest comment first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub group: Option<GroupResponse>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

impl CommentRequest {
    pub fn into_new_comment(self, post_id: Uuid, author_id: Uuid) -> NewComment {
        NewComment::new(post_id, author_id, self.text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, author: impl Into<String>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author: author.into(),
            text: comment.text,
            created: comment.created,
        }
    }
}

/// An author's page: who they are, whether the caller follows them, and their posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub author: UserResponse,
    pub following: bool,
    pub posts: PageResponse<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowResponse {
    pub user: String,
    pub author: String,
    pub following: bool,
}

/// `?page=N` query string; absent or zero means the first page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u64>,
}

impl PageQuery {
    pub fn pagination(&self, per_page: u64) -> Pagination {
        Pagination::new(self.page.unwrap_or(1), per_page)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            items: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_to_first_page() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.pagination(10), Pagination::new(1, 10));

        let query = PageQuery { page: Some(0) };
        assert_eq!(query.pagination(10).page, 1);
    }

    #[test]
    fn test_page_response_reports_totals() {
        let page = Page::new(vec![1, 2, 3], Pagination::new(1, 3), 7);
        let response = PageResponse::from(page);

        assert_eq!(response.total_pages, 3);
        assert!(response.has_next);
        assert_eq!(response.items, vec![1, 2, 3]);
    }

    #[test]
    fn test_post_request_fields_are_optional() {
        let req: PostRequest = serde_json::from_str(r#"{"text":"Hello"}"#).unwrap();
        let new = req.into_new_post(Uuid::nil());

        assert_eq!(new.text, "Hello");
        assert_eq!(new.group_id, None);
        assert_eq!(new.image, None);
    }
}
