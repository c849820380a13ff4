//! Content linker: wraps the first safe occurrence of candidate phrases in
//! hyperlinks to other posts.

use std::collections::HashSet;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use postweave_shared::{PostweaveError, Result};

use crate::scan;

/// A phrase that, when found in a body, links to `target`.
#[derive(Debug, Clone)]
pub struct LinkCandidate {
    /// Text searched for, case-insensitively.
    pub phrase: String,
    /// Slug of the post the phrase links to.
    pub target: String,
    matcher: Regex,
}

impl LinkCandidate {
    pub fn new(phrase: impl Into<String>, target: impl Into<String>) -> Result<Self> {
        let phrase = phrase.into();
        let matcher = RegexBuilder::new(&regex::escape(&phrase))
            .case_insensitive(true)
            .build()
            .map_err(|e| PostweaveError::Pattern {
                pattern: phrase.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            phrase,
            target: target.into(),
            matcher,
        })
    }

    /// Length of the phrase in characters; candidates are ranked by it.
    pub fn char_len(&self) -> usize {
        self.phrase.chars().count()
    }

    /// First occurrence of the phrase that lies entirely inside one of `runs`.
    fn find_in(&self, html: &str, runs: &[Range<usize>]) -> Option<Range<usize>> {
        if self.phrase.is_empty() {
            return None;
        }
        runs.iter().find_map(|run| {
            self.matcher
                .find(&html[run.clone()])
                .map(|m| run.start + m.start()..run.start + m.end())
        })
    }
}

/// Options for a single linking pass.
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions<'a> {
    /// Maximum links to this corpus a body may carry, existing ones included.
    pub max_links: usize,
    /// Path prefix of generated links; the target slug is appended.
    pub href_prefix: &'a str,
}

/// Result of linking one body.
#[derive(Debug, Clone, Default)]
pub struct LinkOutcome {
    /// The body with links inserted.
    pub content: String,
    /// Target slugs of inserted links, in insertion order.
    pub inserted: Vec<String>,
    /// Distinct targets already linked before this pass.
    pub existing: usize,
}

/// Link `body` against `candidates`, which must already be in priority order.
///
/// Targets that the body already links to under `href_prefix` count toward
/// `max_links` and are never linked again, so running the pass over its own
/// output inserts nothing.
pub fn link_content<'c>(
    body: &str,
    candidates: impl IntoIterator<Item = &'c LinkCandidate>,
    opts: LinkOptions<'_>,
) -> LinkOutcome {
    let mut content = body.to_string();
    let mut runs = scan::linkable_runs(&content);
    let mut linked = existing_targets(body, opts.href_prefix);
    let existing = linked.len();
    let mut inserted = Vec::new();

    for candidate in candidates {
        if existing + inserted.len() >= opts.max_links {
            break;
        }
        if linked.contains(candidate.target.as_str()) {
            continue;
        }
        let Some(span) = candidate.find_in(&content, &runs) else {
            continue;
        };

        let anchor = format!(
            r#"<a href="{}{}">{}</a>"#,
            opts.href_prefix,
            candidate.target,
            &content[span.clone()]
        );
        debug!(phrase = %candidate.phrase, target = %candidate.target, at = span.start, "inserting link");
        content.replace_range(span, &anchor);
        runs = scan::linkable_runs(&content);

        linked.insert(candidate.target.clone());
        inserted.push(candidate.target.clone());
    }

    LinkOutcome {
        content,
        inserted,
        existing,
    }
}

/// Slugs of every anchor in `html` whose `href` starts with `href_prefix`.
pub fn existing_targets(html: &str, href_prefix: &str) -> HashSet<String> {
    scan::anchor_hrefs(html)
        .into_iter()
        .filter_map(|href| href.strip_prefix(href_prefix))
        .map(|slug| slug.trim_end_matches('/').to_string())
        .filter(|slug| !slug.is_empty())
        .collect()
}

/// Number of anchors in `html` whose `href` starts with `href_prefix`.
pub fn count_links(html: &str, href_prefix: &str) -> usize {
    scan::anchor_hrefs(html)
        .into_iter()
        .filter(|href| href.starts_with(href_prefix))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/blog/";

    fn opts(max_links: usize) -> LinkOptions<'static> {
        LinkOptions {
            max_links,
            href_prefix: PREFIX,
        }
    }

    fn candidates(pairs: &[(&str, &str)]) -> Vec<LinkCandidate> {
        pairs
            .iter()
            .map(|(phrase, target)| LinkCandidate::new(*phrase, *target).unwrap())
            .collect()
    }

    #[test]
    fn links_first_occurrence_only() {
        let body = "<p>Chat Online São Paulo hoje. Chat Online São Paulo amanhã.</p>";
        let out = link_content(
            body,
            &candidates(&[("Chat Online São Paulo", "sao-paulo")]),
            opts(5),
        );
        assert_eq!(
            out.content,
            r#"<p><a href="/blog/sao-paulo">Chat Online São Paulo</a> hoje. Chat Online São Paulo amanhã.</p>"#
        );
        assert_eq!(out.inserted, vec!["sao-paulo"]);
    }

    #[test]
    fn match_is_case_insensitive_and_keeps_original_text() {
        let body = "<p>conheça o chat online são paulo</p>";
        let out = link_content(
            body,
            &candidates(&[("Chat Online São Paulo", "sao-paulo")]),
            opts(5),
        );
        assert!(out.content.contains(r#"<a href="/blog/sao-paulo">chat online são paulo</a>"#));
    }

    #[test]
    fn never_links_inside_attributes() {
        let body = r#"<img alt="paquera online" src="/x.png"><p>sem texto</p>"#;
        let out = link_content(body, &candidates(&[("paquera online", "paquera")]), opts(5));
        assert_eq!(out.content, body);
        assert!(out.inserted.is_empty());
    }

    #[test]
    fn skips_occurrence_inside_existing_anchor_but_uses_a_later_one() {
        let body = r#"<p><a href="https://example.com">amizade virtual</a> e mais amizade virtual</p>"#;
        let out = link_content(body, &candidates(&[("amizade virtual", "amizade")]), opts(5));
        assert_eq!(
            out.content,
            r#"<p><a href="https://example.com">amizade virtual</a> e mais <a href="/blog/amizade">amizade virtual</a></p>"#
        );
    }

    #[test]
    fn same_target_is_linked_once() {
        let body = "<p>namoro online e relacionamentos sérios</p>";
        let out = link_content(
            body,
            &candidates(&[("namoro online", "namoro"), ("relacionamentos", "namoro")]),
            opts(5),
        );
        assert_eq!(out.inserted, vec!["namoro"]);
        assert_eq!(count_links(&out.content, PREFIX), 1);
    }

    #[test]
    fn budget_stops_the_pass() {
        let body = "<p>alpha beta gamma delta epsilon zeta</p>";
        let cands = candidates(&[
            ("alpha", "a"),
            ("beta", "b"),
            ("gamma", "c"),
            ("delta", "d"),
            ("epsilon", "e"),
            ("zeta", "f"),
        ]);
        let out = link_content(body, &cands, opts(5));
        assert_eq!(out.inserted.len(), 5);
        assert!(!out.content.contains(r#"href="/blog/f""#));
    }

    #[test]
    fn longer_phrase_claims_text_before_shorter_one() {
        let body = "<p>Chat Online Rio de Janeiro</p>";
        let cands = candidates(&[("Chat Online Rio de Janeiro", "rio"), ("Rio de Janeiro", "rj")]);
        let out = link_content(body, &cands, opts(5));
        assert_eq!(out.inserted, vec!["rio"]);
        assert_eq!(count_links(&out.content, PREFIX), 1);
    }

    #[test]
    fn empty_body_gets_no_links() {
        let out = link_content("", &candidates(&[("anything", "x")]), opts(5));
        assert_eq!(out.content, "");
        assert!(out.inserted.is_empty());
    }

    #[test]
    fn rerun_on_own_output_inserts_nothing() {
        let body = "<p>bate-papo gay e chat online curitiba, bate-papo gay de novo</p>";
        let cands = candidates(&[("chat online curitiba", "curitiba"), ("bate-papo gay", "gay")]);

        let first = link_content(body, &cands, opts(5));
        assert_eq!(first.inserted.len(), 2);

        let second = link_content(&first.content, &cands, opts(5));
        assert!(second.inserted.is_empty());
        assert_eq!(second.existing, 2);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn existing_links_count_toward_budget() {
        let body = r#"<p><a href="/blog/a">a</a> <a href="/blog/b/">b</a> gamma delta</p>"#;
        let out = link_content(body, &candidates(&[("gamma", "c"), ("delta", "d")]), opts(3));
        assert_eq!(out.existing, 2);
        assert_eq!(out.inserted, vec!["c"]);
    }

    #[test]
    fn existing_targets_ignore_other_prefixes() {
        let html = r#"<a href="/blog/rio">r</a><a href="https://x.com/blog/no">n</a><a href="/blog/">i</a>"#;
        let targets = existing_targets(html, PREFIX);
        assert_eq!(targets.len(), 1);
        assert!(targets.contains("rio"));
    }

    #[test]
    fn phrase_with_regex_metacharacters_is_literal() {
        let body = "<p>Quanto custa? (grátis) sim</p>";
        let out = link_content(body, &candidates(&[("custa? (grátis)", "preco")]), opts(5));
        assert_eq!(out.inserted, vec!["preco"]);
        assert!(out.content.contains(r#"<a href="/blog/preco">custa? (grátis)</a>"#));
    }

    #[test]
    fn unquoted_href_with_trailing_slash_is_not_linked_into() {
        let body = "<p><a href=/blog/outro/>Chat Online Recife hoje</a></p>";
        let out = link_content(body, &candidates(&[("Chat Online Recife", "recife")]), opts(5));
        assert_eq!(out.content, body);
        assert!(out.inserted.is_empty());
        assert_eq!(out.existing, 1);
    }

    #[test]
    fn self_closing_anchor_syntax_is_not_linked_into() {
        let body = r#"<p><a id="top"/>Chat Online Recife</a> e Chat Online Recife</p>"#;
        let out = link_content(body, &candidates(&[("Chat Online Recife", "recife")]), opts(5));
        assert_eq!(
            out.content,
            r#"<p><a id="top"/>Chat Online Recife</a> e <a href="/blog/recife">Chat Online Recife</a></p>"#
        );
    }

    #[test]
    fn inserted_anchor_is_never_nested() {
        let body = "<p>encontros casuais em encontros</p>";
        let cands = candidates(&[("encontros casuais", "casuais"), ("encontros", "encontros")]);
        let out = link_content(body, &cands, opts(5));
        assert_eq!(
            out.content,
            r#"<p><a href="/blog/casuais">encontros casuais</a> em <a href="/blog/encontros">encontros</a></p>"#
        );
    }
}
