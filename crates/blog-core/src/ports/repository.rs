use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, Tag, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// List all entities.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Tag associations are managed here because the
/// association table hangs off the post side of the relationship.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, each paired with its tags.
    async fn find_all_with_tags(&self) -> Result<Vec<(Post, Vec<Tag>)>, RepoError>;

    /// A single post paired with its tags.
    async fn find_with_tags(&self, id: Uuid) -> Result<Option<(Post, Vec<Tag>)>, RepoError>;

    /// Posts owned by the given user.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Replace the post's association set with exactly `tag_ids`.
    ///
    /// Runs atomically: a concurrent reader never observes a half-synced set.
    async fn replace_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    /// Resolve a set of tag IDs to entities. Unknown IDs are simply absent
    /// from the result; callers compare lengths for existence checks.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;

    /// Find a tag by its name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError>;
}
