//! Application state - shared across all handlers.
//!
//! All wiring happens here, once, at process start: repositories over the
//! connection pool, then services over the repositories.

use std::sync::Arc;

use sea_orm::DbConn;

use blog_core::ports::{PasswordService, PostRepository, TagRepository, TokenService, UserRepository};
use blog_core::service::{AuthService, PostService, TagService, UserService};
use blog_infra::database::{
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub tags: Arc<TagService>,
}

impl AppState {
    /// Build the application state over a live database connection.
    pub fn new(
        db: DbConn,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(db.clone()));
        let post_repo: Arc<dyn PostRepository> = Arc::new(PostgresPostRepository::new(db.clone()));
        let tag_repo: Arc<dyn TagRepository> = Arc::new(PostgresTagRepository::new(db));

        let auth = Arc::new(AuthService::new(
            user_repo.clone(),
            passwords.clone(),
            tokens,
        ));
        let users = Arc::new(UserService::new(
            user_repo.clone(),
            post_repo.clone(),
            passwords,
        ));
        let posts = Arc::new(PostService::new(post_repo, tag_repo.clone(), user_repo));
        let tags = Arc::new(TagService::new(tag_repo));

        tracing::info!("Application state initialized");

        Self {
            auth,
            users,
            posts,
            tags,
        }
    }
}
