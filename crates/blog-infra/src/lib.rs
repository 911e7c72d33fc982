//! # Blog Infra
//!
//! Infrastructure implementations of the blog-core ports: SeaORM
//! repositories over PostgreSQL, JWT tokens, Argon2 password hashing.

pub mod auth;
pub mod database;
