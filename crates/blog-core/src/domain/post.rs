use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// Post entity - a blog post owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(user_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post together with its resolved tag list.
#[derive(Debug, Clone)]
pub struct PostWithTags {
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// Input for creating a post. `tag_ids: Some(..)` associates the given tags.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Partial update for a post. `None` fields are left unchanged.
///
/// `tag_ids` has replace semantics: `Some(ids)` synchronizes the association
/// set to exactly `ids` (empty clears all tags), `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub user_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
}
