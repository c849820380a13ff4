//! Corpus index: slug, category and tag lookups over one run's posts.
//!
//! The index keeps its own snapshot of every post's title, category and tags,
//! so the pipeline can rewrite `content` while later stages still read the
//! values the run started with.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use postweave_shared::{Post, PostweaveError, Result};

/// Snapshot of the fields other stages read from a post.
#[derive(Debug, Clone)]
pub struct IndexedPost {
    /// Position in the corpus document.
    pub position: usize,
    pub slug: String,
    pub title: String,
    pub category: String,
    /// Tags as written, in source order.
    pub tags: Vec<String>,
    /// Distinct lowercase tags.
    pub tag_set: HashSet<String>,
}

/// Read-only lookups over the corpus, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    posts: Vec<IndexedPost>,
    by_slug: HashMap<String, usize>,
    by_category: HashMap<String, Vec<String>>,
    by_tag: HashMap<String, Vec<String>>,
}

impl CorpusIndex {
    /// Build the index. Fails if two posts share a slug.
    #[instrument(skip_all, fields(posts = posts.len()))]
    pub fn build(posts: &[Post]) -> Result<Self> {
        let mut index = Self::default();

        for (position, post) in posts.iter().enumerate() {
            if index.by_slug.insert(post.slug.clone(), position).is_some() {
                return Err(PostweaveError::DuplicateSlug(post.slug.clone()));
            }

            index
                .by_category
                .entry(post.category.clone())
                .or_default()
                .push(post.slug.clone());

            let mut tag_set = HashSet::new();
            for tag in &post.tags {
                let lower = tag.to_lowercase();
                if tag_set.insert(lower.clone()) {
                    index.by_tag.entry(lower).or_default().push(post.slug.clone());
                }
            }

            index.posts.push(IndexedPost {
                position,
                slug: post.slug.clone(),
                title: post.title.clone(),
                category: post.category.clone(),
                tags: post.tags.clone(),
                tag_set,
            });
        }

        debug!(
            categories = index.by_category.len(),
            tags = index.by_tag.len(),
            "corpus index built"
        );

        Ok(index)
    }

    /// All posts in corpus order.
    pub fn posts(&self) -> &[IndexedPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn category_count(&self) -> usize {
        self.by_category.len()
    }

    /// Distinct tags, case-folded.
    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    pub fn get(&self, slug: &str) -> Option<&IndexedPost> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    /// Slugs in `category`, in corpus order.
    pub fn slugs_in_category(&self, category: &str) -> &[String] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Slugs carrying `tag` (any case), in corpus order.
    pub fn slugs_with_tag(&self, tag: &str) -> &[String] {
        self.by_tag
            .get(&tag.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, category: &str, tags: &[&str]) -> Post {
        Post::new(
            slug,
            slug.to_uppercase(),
            category,
            tags.iter().map(|t| t.to_string()).collect(),
            "",
        )
    }

    #[test]
    fn builds_lookups_in_corpus_order() {
        let posts = vec![
            post("rio", "cidades", &["Praia", "Carnaval"]),
            post("dicas", "guias", &["praia"]),
            post("recife", "cidades", &["Frevo"]),
        ];
        let index = CorpusIndex::build(&posts).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.category_count(), 2);
        assert_eq!(index.tag_count(), 3);
        assert_eq!(index.get("dicas").unwrap().position, 1);
        assert_eq!(index.slugs_in_category("cidades"), ["rio", "recife"]);
        assert_eq!(index.slugs_with_tag("PRAIA"), ["rio", "dicas"]);
        assert!(index.slugs_with_tag("samba").is_empty());
        assert!(index.get("salvador").is_none());
    }

    #[test]
    fn tag_case_variants_collapse() {
        let posts = vec![post("rio", "cidades", &["Praia", "praia", "PRAIA"])];
        let index = CorpusIndex::build(&posts).unwrap();

        assert_eq!(index.slugs_with_tag("praia"), ["rio"]);
        assert_eq!(index.get("rio").unwrap().tag_set.len(), 1);
        assert_eq!(index.get("rio").unwrap().tags.len(), 3);
    }

    #[test]
    fn duplicate_slug_is_fatal() {
        let posts = vec![post("rio", "cidades", &[]), post("rio", "guias", &[])];
        let err = CorpusIndex::build(&posts).unwrap_err();
        assert!(matches!(err, PostweaveError::DuplicateSlug(ref s) if s == "rio"));
    }

    #[test]
    fn empty_corpus_builds() {
        let index = CorpusIndex::build(&[]).unwrap();
        assert!(index.is_empty());
    }
}
