//! End-to-end `enrich` pipeline: load → index → score → link → save.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use postweave_markup::{LinkOptions, count_links, link_content, word_count};
use postweave_shared::{
    AppConfig, DATE_FORMAT, LinkingConfig, Post, PostweaveError, RelatedConfig, Result,
};

use crate::corpus;
use crate::index::CorpusIndex;
use crate::keywords::KeywordExtractor;
use crate::related::{RelatednessScorer, ScoredPost};

/// Runtime enrichment configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Relatedness scoring settings.
    pub related: RelatedConfig,
    /// Keyword extraction and linking settings.
    pub linking: LinkingConfig,
    /// Date written to every post's `lastModified`.
    pub stamp: NaiveDate,
    /// Emit a progress event every this many posts.
    pub progress_interval: usize,
}

impl From<&AppConfig> for EnrichConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            related: config.related.clone(),
            linking: config.linking.clone(),
            stamp: chrono::Local::now().date_naive(),
            progress_interval: config.defaults.progress_interval,
        }
    }
}

/// Aggregate statistics of one run.
#[derive(Debug, Clone, Default)]
pub struct EnrichReport {
    /// Posts processed.
    pub posts: usize,
    /// Link candidates extracted from the whole corpus.
    pub candidates: usize,
    /// Links inserted across all posts.
    pub links_inserted: usize,
    /// Posts that received no new link.
    pub posts_without_links: usize,
    /// Posts with at least one related slug.
    pub posts_with_related: usize,
    /// Wall time of the enrichment pass.
    pub elapsed: Duration,
}

impl EnrichReport {
    /// Average inserted links per post.
    pub fn average_links(&self) -> f64 {
        if self.posts == 0 {
            0.0
        } else {
            self.links_inserted as f64 / self.posts as f64
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each post is enriched.
    fn post_enriched(&self, slug: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &EnrichReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn post_enriched(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &EnrichReport) {}
}

/// Enrich every post in place.
///
/// Per post, in corpus order:
/// 1. `wordCount` from the body as loaded
/// 2. `lastModified` from the run stamp
/// 3. `relatedSlugs` by category/tag overlap
/// 4. `content` with cross-links inserted
///
/// Stages 3 and 4 only read the index snapshot, so rewritten bodies of
/// earlier posts never influence later ones.
#[instrument(skip_all, fields(posts = posts.len(), stamp = %config.stamp))]
pub fn enrich_posts(
    posts: &mut [Post],
    config: &EnrichConfig,
    progress: &dyn ProgressReporter,
) -> Result<EnrichReport> {
    let start = Instant::now();
    let total = posts.len();

    progress.phase("Indexing corpus");
    let index = CorpusIndex::build(posts)?;
    let extractor = KeywordExtractor::new(&config.linking)?;
    let pool = extractor.build_pool(&index)?;
    let scorer = RelatednessScorer::new(&index, &config.related);

    let stamp = config.stamp.format(DATE_FORMAT).to_string();
    let link_opts = LinkOptions {
        max_links: config.linking.max_links,
        href_prefix: &config.linking.href_prefix,
    };
    let interval = config.progress_interval.max(1);

    let mut report = EnrichReport {
        posts: total,
        candidates: pool.len(),
        ..Default::default()
    };

    progress.phase("Enriching posts");
    for (i, post) in posts.iter_mut().enumerate() {
        post.word_count = Some(word_count(&post.content));
        post.last_modified = Some(stamp.clone());

        let related = scorer.related_slugs(&post.slug);
        if !related.is_empty() {
            report.posts_with_related += 1;
        }
        post.related_slugs = Some(related);

        let outcome = link_content(&post.content, pool.for_post(&post.slug), link_opts);
        if outcome.inserted.is_empty() {
            report.posts_without_links += 1;
        }
        report.links_inserted += outcome.inserted.len();

        debug!(
            slug = %post.slug,
            words = post.word_count,
            links = outcome.inserted.len(),
            existing_links = outcome.existing,
            "post enriched"
        );
        post.content = outcome.content;

        progress.post_enriched(&post.slug, i + 1, total);
        if (i + 1) % interval == 0 {
            info!(processed = i + 1, total, "enrichment progress");
        }
    }

    report.elapsed = start.elapsed();
    info!(
        posts = report.posts,
        average_links = %format!("{:.1}", report.average_links()),
        posts_without_links = report.posts_without_links,
        posts_with_related = report.posts_with_related,
        "enrichment complete"
    );

    Ok(report)
}

/// Options for [`enrich_file`].
#[derive(Debug, Clone)]
pub struct EnrichFileConfig {
    /// Corpus document to read.
    pub input: PathBuf,
    /// Where to write the result (defaults to `input`).
    pub output: Option<PathBuf>,
    /// Run the pipeline but write nothing.
    pub dry_run: bool,
    /// Enrichment settings.
    pub enrich: EnrichConfig,
}

impl EnrichFileConfig {
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

/// Run the full `enrich` pipeline on a corpus file.
///
/// Nothing is written unless every post was enriched.
#[instrument(skip_all, fields(input = %config.input.display()))]
pub async fn enrich_file(
    config: &EnrichFileConfig,
    progress: &dyn ProgressReporter,
) -> Result<EnrichReport> {
    progress.phase("Loading corpus");
    let mut posts = corpus::load_corpus(&config.input).await?;

    let report = enrich_posts(&mut posts, &config.enrich, progress)?;

    if config.dry_run {
        info!("dry run, corpus not written");
    } else {
        progress.phase("Saving corpus");
        corpus::save_corpus(config.output_path(), &posts).await?;
    }

    progress.done(&report);
    Ok(report)
}

/// What `check` found in a corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusCheck {
    pub posts: usize,
    pub categories: usize,
    pub tags: usize,
    /// Link candidates the corpus would produce.
    pub candidates: usize,
    /// Posts whose body already carries corpus links.
    pub posts_with_links: usize,
    /// Posts with an empty body.
    pub empty_posts: usize,
}

/// Validate a corpus file without writing anything.
///
/// Fails on the same inputs `enrich` would fail on.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn check_file(path: &Path, linking: &LinkingConfig) -> Result<CorpusCheck> {
    let posts = corpus::load_corpus(path).await?;
    let index = CorpusIndex::build(&posts)?;
    let pool = KeywordExtractor::new(linking)?.build_pool(&index)?;

    let check = CorpusCheck {
        posts: index.len(),
        categories: index.category_count(),
        tags: index.tag_count(),
        candidates: pool.len(),
        posts_with_links: posts
            .iter()
            .filter(|p| count_links(&p.content, &linking.href_prefix) > 0)
            .count(),
        empty_posts: posts.iter().filter(|p| p.content.trim().is_empty()).count(),
    };

    info!(posts = check.posts, candidates = check.candidates, "corpus ok");
    Ok(check)
}

/// Rank every post related to `slug` in the corpus at `path`.
pub async fn related_in_file(
    path: &Path,
    slug: &str,
    config: &RelatedConfig,
) -> Result<Vec<ScoredPost>> {
    let posts = corpus::load_corpus(path).await?;
    let index = CorpusIndex::build(&posts)?;
    if index.get(slug).is_none() {
        return Err(PostweaveError::validation(format!(
            "no post with slug '{slug}'"
        )));
    }
    Ok(RelatednessScorer::new(&index, config).rank(slug))
}
