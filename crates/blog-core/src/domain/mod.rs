//! Domain entities - the core business objects.

mod post;
mod tag;
mod user;

pub use post::{NewPost, Post, PostPatch, PostWithTags};
pub use tag::Tag;
pub use user::{User, UserPatch};
