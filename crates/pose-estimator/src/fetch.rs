//! Model asset download and on-disk caching.

use std::path::{Path, PathBuf};

use anyhow::Context;
use fitmirror_common::config::default_cache_dir;
use fitmirror_common::error::{FitmirrorError, FitmirrorResult};

/// Smallest plausible MoveNet export. Guards against caching an HTML error
/// page or a truncated download as "the model".
const MIN_MODEL_BYTES: u64 = 1_000_000;

/// Where a model URL lands inside the cache directory.
pub fn model_cache_path(cache_dir: Option<&Path>, model_url: &str) -> PathBuf {
    let dir = cache_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_cache_dir);
    let file_name = model_url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("model.onnx");
    dir.join(file_name)
}

/// Ensure the model asset exists locally, downloading it on first use.
///
/// A cached file is trusted as-is; a fresh download is written to a
/// temporary sibling and renamed into place so a crash mid-download never
/// leaves a half-written model behind.
pub fn ensure_model(cache_dir: Option<&Path>, model_url: &str) -> FitmirrorResult<PathBuf> {
    let target = model_cache_path(cache_dir, model_url);

    if is_cached(&target) {
        tracing::debug!(model = %target.display(), "Using cached pose model");
        return Ok(target);
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(url = model_url, "Downloading pose model");
    let response = reqwest::blocking::get(model_url)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Failed to fetch pose model from {model_url}"))?;
    let bytes = response
        .bytes()
        .context("Failed to read pose model response body")?;

    if (bytes.len() as u64) < MIN_MODEL_BYTES {
        return Err(FitmirrorError::pose(format!(
            "Downloaded model is implausibly small ({} bytes)",
            bytes.len()
        )));
    }

    let tmp = target.with_extension("onnx.part");
    std::fs::write(&tmp, &bytes)?;
    std::fs::rename(&tmp, &target)?;

    tracing::info!(model = %target.display(), size = bytes.len(), "Pose model cached");
    Ok(target)
}

fn is_cached(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() >= MIN_MODEL_BYTES)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_path_uses_url_file_name() {
        let path = model_cache_path(
            Some(Path::new("/tmp/models")),
            "https://example.com/models/movenet_singlepose_lightning_4.onnx",
        );
        assert_eq!(
            path,
            Path::new("/tmp/models/movenet_singlepose_lightning_4.onnx")
        );
    }

    #[test]
    fn test_cache_path_falls_back_on_bare_url() {
        let path = model_cache_path(Some(Path::new("/tmp/models")), "https://example.com/");
        assert_eq!(path, Path::new("/tmp/models/model.onnx"));
    }

    #[test]
    fn test_sufficiently_large_cached_file_short_circuits() {
        let dir = std::env::temp_dir().join("fitmirror-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let url = "https://example.invalid/cached.onnx";
        let target = model_cache_path(Some(&dir), url);
        std::fs::write(&target, vec![0u8; MIN_MODEL_BYTES as usize]).unwrap();

        // example.invalid would fail to resolve, so passing means no fetch.
        let resolved = ensure_model(Some(&dir), url).unwrap();
        assert_eq!(resolved, target);

        std::fs::remove_file(&target).ok();
    }

    #[test]
    fn test_undersized_cache_entry_is_not_trusted() {
        let dir = std::env::temp_dir().join("fitmirror-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let url = "https://example.invalid/tiny.onnx";
        let target = model_cache_path(Some(&dir), url);
        std::fs::write(&target, b"not a model").unwrap();

        // The stub is too small to trust, and the host is unresolvable, so
        // the fetch path must run and fail.
        assert!(ensure_model(Some(&dir), url).is_err());

        std::fs::remove_file(&target).ok();
    }
}
