//! Database connection management and repositories.

mod connection;
pub mod entity;
mod postgres_base;
pub mod postgres_repo;

pub use connection::{DatabaseConfig, connect};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{PostgresPostRepository, PostgresTagRepository, PostgresUserRepository};
