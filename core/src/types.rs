//! Domain DTOs for the posts API.
//!
//! # Design
//! Mirrors the mock-server's schema but is defined independently; integration
//! tests catch drift between the two. Extra fields in the payload (such as
//! `userId`) are ignored, the three fields below are required.

use serde::{Deserialize, Serialize};

/// A single post returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
}
