//! Post CRUD with tag-association synchronization.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPatch, PostWithTags, Tag};
use crate::error::{DomainError, FieldError};
use crate::ports::{PostRepository, TagRepository, UserRepository};

use super::check_required_string;

/// Post service. The only service touching more than one entity: creating or
/// updating a post may replace its tag-association set.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { posts, tags, users }
    }

    pub async fn list(&self) -> Result<Vec<PostWithTags>, DomainError> {
        let rows = self.posts.find_all_with_tags().await?;
        Ok(rows
            .into_iter()
            .map(|(post, tags)| PostWithTags { post, tags })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<PostWithTags, DomainError> {
        let (post, tags) = self
            .posts
            .find_with_tags(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })?;
        Ok(PostWithTags { post, tags })
    }

    /// Create a post and, when tag ids were supplied and non-empty, associate
    /// exactly that set of tags.
    pub async fn create(&self, input: NewPost) -> Result<PostWithTags, DomainError> {
        let mut errors = Vec::new();
        check_required_string(&mut errors, "title", &input.title);
        if input.content.trim().is_empty() {
            errors.push(FieldError::new("content", "The content field is required."));
        }
        if self.users.find_by_id(input.user_id).await?.is_none() {
            errors.push(FieldError::new("user_id", "The selected user_id is invalid."));
        }
        let tag_ids = match &input.tag_ids {
            Some(ids) => Some(self.resolve_tag_ids(ids, &mut errors).await?),
            None => None,
        };
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let post = self
            .posts
            .create(Post::new(input.user_id, input.title, input.content))
            .await?;

        let tags = match tag_ids {
            Some(ids) if !ids.is_empty() => {
                self.posts.replace_tags(post.id, &ids).await?;
                self.tags.find_by_ids(&ids).await?
            }
            _ => Vec::new(),
        };

        tracing::debug!(post_id = %post.id, tag_count = tags.len(), "post created");
        Ok(PostWithTags { post, tags })
    }

    /// Apply a partial update. A present `tag_ids` replaces the association
    /// set, an empty list clearing it; an absent one leaves it untouched.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<PostWithTags, DomainError> {
        let (mut post, current_tags) =
            self.posts
                .find_with_tags(id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity_type: "Post",
                    id,
                })?;

        let mut errors = Vec::new();
        if let Some(title) = &patch.title {
            check_required_string(&mut errors, "title", title);
        }
        if let Some(content) = &patch.content
            && content.trim().is_empty()
        {
            errors.push(FieldError::new("content", "The content field is required."));
        }
        if let Some(user_id) = patch.user_id
            && self.users.find_by_id(user_id).await?.is_none()
        {
            errors.push(FieldError::new("user_id", "The selected user_id is invalid."));
        }
        let tag_ids = match &patch.tag_ids {
            Some(ids) => Some(self.resolve_tag_ids(ids, &mut errors).await?),
            None => None,
        };
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(user_id) = patch.user_id {
            post.user_id = user_id;
        }
        post.updated_at = Utc::now();
        let post = self.posts.update(post).await?;

        let tags = match tag_ids {
            Some(ids) => {
                self.posts.replace_tags(post.id, &ids).await?;
                self.tags.find_by_ids(&ids).await?
            }
            None => current_tags,
        };

        Ok(PostWithTags { post, tags })
    }

    /// Delete a post; its association rows go with it.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.posts.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "Post",
                id,
            });
        }
        self.posts.delete(id).await?;
        tracing::debug!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Deduplicate the submitted ids and verify every one names an existing
    /// tag, recording a field error otherwise.
    async fn resolve_tag_ids(
        &self,
        ids: &[Uuid],
        errors: &mut Vec<FieldError>,
    ) -> Result<Vec<Uuid>, DomainError> {
        let unique: BTreeSet<Uuid> = ids.iter().copied().collect();
        let unique: Vec<Uuid> = unique.into_iter().collect();
        let found: Vec<Tag> = self.tags.find_by_ids(&unique).await?;
        if found.len() != unique.len() {
            errors.push(FieldError::new("tags", "The selected tags are invalid."));
        }
        Ok(unique)
    }
}
