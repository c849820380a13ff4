//! Markup handling for post bodies.
//!
//! Counts words in a markup body and inserts cross-links into it. Bodies are
//! HTML fragments as stored in the corpus document; they are never parsed into
//! a tree, only scanned, so whatever the author wrote survives byte for byte
//! outside the inserted anchors.

mod linker;
mod scan;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use linker::{
    LinkCandidate, LinkOptions, LinkOutcome, count_links, existing_targets, link_content,
};

// ---------------------------------------------------------------------------
// Word counting
// ---------------------------------------------------------------------------

/// Remove every angle-bracket-delimited span, keeping the text between them.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    TAG_RE.replace_all(html, "")
}

/// Count whitespace-delimited tokens of `html` once markup is removed.
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
