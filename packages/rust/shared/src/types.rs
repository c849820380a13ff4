//! Core domain types for a postweave corpus.

use serde::{Deserialize, Serialize};

/// Format of the `lastModified` stamp written to every post.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A single article in the corpus document.
///
/// The five source fields are required; a post missing any of them fails the
/// whole load. The derived fields are absent on a fresh corpus and overwritten
/// on every run. Fields this tool does not know about are kept in `extra` and
/// written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique, stable identifier. Also the path segment of generated links.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Single category label.
    pub category: String,
    /// Tags, compared case-insensitively.
    pub tags: Vec<String>,
    /// Markup body.
    pub content: String,
    /// Whitespace-token count of the body with markup removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    /// Processing date stamp (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Ranked slugs of related posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_slugs: Option<Vec<String>>,
    /// Any other fields present in the source document.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Post {
    /// Build a post from its source fields, with no derived fields set.
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        tags: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            category: category.into(),
            tags,
            content: content.into(),
            word_count: None,
            last_modified: None,
            related_slugs: None,
            extra: serde_json::Map::new(),
        }
    }
}
