//! # Blog Shared
//!
//! API-facing types: request DTOs, public response shapes, and the
//! success/error envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
