//! Community board: travel posts with likes and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::double_option;

string_enum! {
    #[derive(Default)]
    pub enum PostCategory("post category") {
        #[default]
        General => "general",
        Tips => "tips",
        Photos => "photos",
        Destinations => "destinations",
        Budget => "budget",
        Solo => "solo",
        Family => "family",
        Other => "other",
    }
}

/// Body of `POST /community`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostNew {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PostNew {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: None,
            destination: None,
            tags: Vec::new(),
            image_url: None,
        }
    }
}

/// Body of `PUT /community/posts/{id}`. Absent fields keep their value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    /// Unpublished posts only show up in the author's own listing.
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// Query string of `GET /community`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// A [`PostCategory`] or `all`.
    pub category: Option<String>,
    /// Case-insensitive substring of the destination.
    pub destination: Option<String>,
    /// Case-insensitive substring of title, content, destination or tags.
    pub search: Option<String>,
    /// Comma separated; a post matches when it carries any of them.
    pub tags: Option<String>,
}

/// Query string of `GET /community/my-posts`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLike {
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: PostAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: PostAuthor,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub destination: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub likes: Vec<PostLike>,
    /// Oldest first.
    pub comments: Vec<CommentView>,
    pub view_count: i64,
    pub like_count: u64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub pagination: Pagination,
}

/// Body of `POST /community/posts/{id}/comments`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentNew {
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentAdded {
    pub comment: CommentView,
    pub comment_count: u64,
}

/// Result of `POST /community/posts/{id}/like`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LikeToggle {
    /// Whether the requester likes the post after the toggle.
    pub liked: bool,
    pub likes: Vec<PostLike>,
    pub like_count: u64,
}
