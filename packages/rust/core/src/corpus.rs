//! Corpus document I/O.
//!
//! The corpus is one JSON array of post objects. It is read whole and written
//! whole; writes go to a sibling temp file first and are renamed into place so
//! a failed run never leaves a half-written document behind.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use postweave_shared::{Post, PostweaveError, Result};

/// Parse a corpus document.
pub fn parse_corpus(json: &str) -> Result<Vec<Post>> {
    serde_json::from_str(json)
        .map_err(|e| PostweaveError::parse(format!("invalid corpus document: {e}")))
}

/// Serialize posts as a pretty-printed corpus document (2-space indent).
pub fn render_corpus(posts: &[Post]) -> Result<String> {
    serde_json::to_string_pretty(posts)
        .map_err(|e| PostweaveError::parse(format!("JSON serialization failed: {e}")))
}

/// Read and parse the corpus at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_corpus(path: &Path) -> Result<Vec<Post>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PostweaveError::io(path, e))?;

    let posts = parse_corpus(&content)?;
    info!(posts = posts.len(), "corpus loaded");
    Ok(posts)
}

/// Write the whole corpus to `path`, atomically.
#[instrument(skip_all, fields(path = %path.display(), posts = posts.len()))]
pub async fn save_corpus(path: &Path, posts: &[Post]) -> Result<()> {
    let json = render_corpus(posts)?;
    let temp = temp_path(path);

    tokio::fs::write(&temp, json.as_bytes())
        .await
        .map_err(|e| PostweaveError::io(&temp, e))?;

    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(PostweaveError::io(path, e));
    }

    debug!(bytes = json.len(), "corpus written");
    Ok(())
}

/// `dir/.name.tmp` next to `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus.json".into());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("postweave-corpus-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_rejects_post_without_tags() {
        let json = r#"[{"slug": "a", "title": "A", "category": "c", "content": ""}]"#;
        let err = parse_corpus(json).unwrap_err();
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn parse_rejects_non_array_document() {
        let err = parse_corpus(r#"{"posts": []}"#).unwrap_err();
        assert!(matches!(err, PostweaveError::Parse { .. }));
    }

    #[test]
    fn render_keeps_non_ascii_and_two_space_indent() {
        let posts = vec![Post::new("sp", "São Paulo", "cidades", vec![], "")];
        let json = render_corpus(&posts).unwrap();
        assert!(json.contains("São Paulo"));
        assert!(json.starts_with("[\n  {\n    \"slug\""));
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("/data/blog/index.json"));
        assert_eq!(temp, PathBuf::from("/data/blog/.index.json.tmp"));
    }

    #[tokio::test]
    async fn save_then_load_preserves_posts() {
        let dir = temp_dir();
        let path = dir.join("index.json");

        let mut post = Post::new("rio", "Rio", "cidades", vec!["praia".into()], "<p>oi</p>");
        post.extra.insert("author".into(), serde_json::json!("Ana"));
        save_corpus(&path, &[post.clone()]).await.unwrap();

        let loaded = load_corpus(&path).await.unwrap();
        assert_eq!(loaded, vec![post]);
        assert!(!temp_path(&path).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let dir = temp_dir();
        let err = load_corpus(&dir.join("missing.json")).await.unwrap_err();
        assert!(matches!(err, PostweaveError::Io { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
