//! Application configuration for postweave.
//!
//! User config lives at `~/.postweave/postweave.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PostweaveError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postweave.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postweave";

// ---------------------------------------------------------------------------
// Config structs (matching postweave.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Relatedness scoring.
    #[serde(default)]
    pub related: RelatedConfig,

    /// Keyword extraction and content linking.
    #[serde(default)]
    pub linking: LinkingConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Corpus document used when no path is given on the command line.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,

    /// Emit a progress event every this many posts.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            progress_interval: default_progress_interval(),
        }
    }
}

fn default_corpus_path() -> String {
    "public/blog-posts/index.json".into()
}
fn default_progress_interval() -> usize {
    20
}

/// `[related]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedConfig {
    /// Maximum number of related slugs kept per post.
    #[serde(default = "default_max_related")]
    pub max_related: usize,

    /// Score for an exact category match.
    #[serde(default = "default_category_weight")]
    pub category_weight: u32,

    /// Score for each shared tag.
    #[serde(default = "default_tag_weight")]
    pub tag_weight: u32,

    /// Category whose members get an extra boost when paired together.
    #[serde(default = "default_locality_category")]
    pub locality_category: String,

    /// Extra score when both posts are in the locality category.
    #[serde(default = "default_locality_boost")]
    pub locality_boost: u32,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            max_related: default_max_related(),
            category_weight: default_category_weight(),
            tag_weight: default_tag_weight(),
            locality_category: default_locality_category(),
            locality_boost: default_locality_boost(),
        }
    }
}

fn default_max_related() -> usize {
    5
}
fn default_category_weight() -> u32 {
    3
}
fn default_tag_weight() -> u32 {
    2
}
fn default_locality_category() -> String {
    "cidades".into()
}
fn default_locality_boost() -> u32 {
    2
}

/// `[linking]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    /// Maximum links inserted into a single post.
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Path prefix of generated links; the target slug is appended.
    #[serde(default = "default_href_prefix")]
    pub href_prefix: String,

    /// Tags must be longer than this (in characters) to become phrases.
    #[serde(default = "default_min_tag_chars")]
    pub min_tag_chars: usize,

    /// How many leading tags of a post are considered.
    #[serde(default = "default_max_tag_candidates")]
    pub max_tag_candidates: usize,

    /// Title words must be longer than this to count as meaningful.
    #[serde(default = "default_min_word_chars")]
    pub min_word_chars: usize,

    /// Minimum meaningful words before a title phrase is built.
    #[serde(default = "default_min_phrase_words")]
    pub min_phrase_words: usize,

    /// Number of meaningful words joined into a title phrase.
    #[serde(default = "default_phrase_words")]
    pub phrase_words: usize,

    /// Title phrases must be longer than this (in characters).
    #[serde(default = "default_min_phrase_chars")]
    pub min_phrase_chars: usize,

    /// Maximum title-derived phrases kept per post.
    #[serde(default = "default_max_title_phrases")]
    pub max_title_phrases: usize,

    /// Lead-in templates matched against the start of each title.
    #[serde(default = "default_title_templates")]
    pub title_templates: Vec<TitleTemplate>,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            max_links: default_max_links(),
            href_prefix: default_href_prefix(),
            min_tag_chars: default_min_tag_chars(),
            max_tag_candidates: default_max_tag_candidates(),
            min_word_chars: default_min_word_chars(),
            min_phrase_words: default_min_phrase_words(),
            phrase_words: default_phrase_words(),
            min_phrase_chars: default_min_phrase_chars(),
            max_title_phrases: default_max_title_phrases(),
            title_templates: default_title_templates(),
        }
    }
}

fn default_max_links() -> usize {
    5
}
fn default_href_prefix() -> String {
    "/blog/".into()
}
fn default_min_tag_chars() -> usize {
    5
}
fn default_max_tag_candidates() -> usize {
    2
}
fn default_min_word_chars() -> usize {
    2
}
fn default_min_phrase_words() -> usize {
    3
}
fn default_phrase_words() -> usize {
    4
}
fn default_min_phrase_chars() -> usize {
    10
}
fn default_max_title_phrases() -> usize {
    2
}

/// `[[linking.title_templates]]` entry.
///
/// `pattern` is matched case-insensitively against the raw title; capture
/// group `group` (default 1) becomes the phrase after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleTemplate {
    pub pattern: String,
    #[serde(default = "default_template_group")]
    pub group: usize,
}

impl TitleTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            group: default_template_group(),
        }
    }
}

fn default_template_group() -> usize {
    1
}

fn default_title_templates() -> Vec<TitleTemplate> {
    [
        r"^(Chat Online .+?)(?:\s*[-:–—]|$)",
        r"^(Bate[- ]Papo .+?)(?:\s*[-:–—]|$)",
        r"^(Vídeo Chat .+?)(?:\s*[-:–—]|$)",
        r"^(Salas? de Chat .+?)(?:\s*[-:–—]|$)",
    ]
    .into_iter()
    .map(TitleTemplate::new)
    .collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postweave/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostweaveError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postweave/postweave.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostweaveError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PostweaveError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Reject settings that would make a run meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.defaults.progress_interval == 0 {
        return Err(PostweaveError::config(
            "defaults.progress_interval must be at least 1",
        ));
    }
    if config.linking.phrase_words == 0 {
        return Err(PostweaveError::config("linking.phrase_words must be at least 1"));
    }
    if config.linking.href_prefix.is_empty() {
        return Err(PostweaveError::config("linking.href_prefix must not be empty"));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostweaveError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostweaveError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostweaveError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
