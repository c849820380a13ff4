//! Relatedness scoring by category and tag overlap.

use std::collections::HashMap;

use postweave_shared::RelatedConfig;

use crate::index::CorpusIndex;

/// Another post and its relatedness score against the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredPost {
    pub slug: String,
    pub score: u32,
}

/// Ranks posts against each other using the corpus index.
pub struct RelatednessScorer<'a> {
    index: &'a CorpusIndex,
    config: &'a RelatedConfig,
}

impl<'a> RelatednessScorer<'a> {
    pub fn new(index: &'a CorpusIndex, config: &'a RelatedConfig) -> Self {
        Self { index, config }
    }

    /// Every other post with a positive score, best first.
    ///
    /// Equal scores keep corpus order. Unknown slugs rank nothing.
    pub fn rank(&self, slug: &str) -> Vec<ScoredPost> {
        let Some(target) = self.index.get(slug) else {
            return Vec::new();
        };

        // position -> score
        let mut scores: HashMap<usize, u32> = HashMap::new();
        let mut add = |other: &str, points: u32| {
            if other == slug {
                return;
            }
            if let Some(post) = self.index.get(other) {
                *scores.entry(post.position).or_default() += points;
            }
        };

        let same_category = self.config.category_weight
            + if target.category == self.config.locality_category {
                self.config.locality_boost
            } else {
                0
            };
        for other in self.index.slugs_in_category(&target.category) {
            add(other, same_category);
        }

        for tag in &target.tag_set {
            for other in self.index.slugs_with_tag(tag) {
                add(other, self.config.tag_weight);
            }
        }

        let mut ranked: Vec<(usize, u32)> = scores.into_iter().filter(|&(_, s)| s > 0).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let posts = self.index.posts();
        ranked
            .into_iter()
            .map(|(position, score)| ScoredPost {
                slug: posts[position].slug.clone(),
                score,
            })
            .collect()
    }

    /// The top `max_related` slugs for `slug`.
    pub fn related_slugs(&self, slug: &str) -> Vec<String> {
        self.rank(slug)
            .into_iter()
            .take(self.config.max_related)
            .map(|scored| scored.slug)
            .collect()
    }
}
