//! Keyword extraction: anchor phrases derived from other posts' titles and tags.

use std::cmp::Reverse;

use regex::{Regex, RegexBuilder};
use tracing::{debug, instrument};

use postweave_markup::LinkCandidate;
use postweave_shared::{LinkingConfig, PostweaveError, Result};

use crate::index::{CorpusIndex, IndexedPost};

/// Characters replaced by spaces before a title is split into words.
const TITLE_SEPARATORS: [char; 6] = [':', '?', '!', '—', '-', '–'];

/// A compiled title lead-in rule.
#[derive(Debug, Clone)]
struct TemplateRule {
    regex: Regex,
    group: usize,
}

/// Derives link candidates from post titles and tags.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    rules: Vec<TemplateRule>,
    config: LinkingConfig,
}

impl KeywordExtractor {
    /// Compile the configured title templates.
    pub fn new(config: &LinkingConfig) -> Result<Self> {
        let rules = config
            .title_templates
            .iter()
            .map(|template| {
                // Templates always match from the start of the title.
                RegexBuilder::new(&format!("^(?:{})", template.pattern))
                    .case_insensitive(true)
                    .build()
                    .map(|regex| TemplateRule {
                        regex,
                        group: template.group,
                    })
                    .map_err(|e| PostweaveError::Pattern {
                        pattern: template.pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            config: config.clone(),
        })
    }

    /// Phrases pointing at `post`: qualifying tags first, then title phrases.
    ///
    /// Titles of fewer than two words yield nothing at all.
    pub fn phrases(&self, post: &IndexedPost) -> Vec<String> {
        let cleaned = post.title.replace(TITLE_SEPARATORS, " ");
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        if words.len() < 2 {
            return Vec::new();
        }

        let mut phrases: Vec<String> = post
            .tags
            .iter()
            .take(self.config.max_tag_candidates)
            .filter(|tag| tag.chars().count() > self.config.min_tag_chars)
            .cloned()
            .collect();

        phrases.extend(self.title_phrases(&post.title, &words));
        phrases
    }

    fn title_phrases(&self, title: &str, words: &[&str]) -> Vec<String> {
        let mut phrases = Vec::new();

        for rule in &self.rules {
            let Some(m) = rule.regex.captures(title).and_then(|c| c.get(rule.group)) else {
                continue;
            };
            let phrase = m.as_str().trim();
            if !phrase.is_empty() {
                phrases.push(phrase.to_string());
            }
        }

        let meaningful: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| w.chars().count() > self.config.min_word_chars)
            .collect();
        if meaningful.len() >= self.config.min_phrase_words {
            let take = self.config.phrase_words.min(meaningful.len());
            let phrase = meaningful[..take].join(" ");
            if phrase.chars().count() > self.config.min_phrase_chars {
                phrases.push(phrase);
            }
        }

        phrases.truncate(self.config.max_title_phrases);
        phrases
    }

    /// Candidates for every post in the corpus, longest phrase first.
    #[instrument(skip_all, fields(posts = index.len()))]
    pub fn build_pool(&self, index: &CorpusIndex) -> Result<CandidatePool> {
        let mut candidates = Vec::new();
        for post in index.posts() {
            for phrase in self.phrases(post) {
                candidates.push(LinkCandidate::new(phrase, post.slug.clone())?);
            }
        }

        // Stable: equal lengths keep corpus order.
        candidates.sort_by_key(|c| Reverse(c.char_len()));

        debug!(candidates = candidates.len(), "keyword pool built");
        Ok(CandidatePool { candidates })
    }
}

/// All link candidates of a run, in priority order.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<LinkCandidate>,
}

impl CandidatePool {
    /// Candidates usable inside `slug`'s body: everything not pointing at it.
    pub fn for_post<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a LinkCandidate> + 'a {
        self.candidates.iter().filter(move |c| c.target != slug)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
