use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write asset to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolves a pipeline asset (detector model, classifier model, label list,
/// overlay font) by name, checking local locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled directory (for development / pre-packaged installs)
/// 3. Download from URL into the cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<&ProgressFn>,
) -> Result<PathBuf, AssetResolveError> {
    resolve_in(&asset_cache_dir()?, name, url, bundled_dir, progress)
}

pub(crate) fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<&ProgressFn>,
) -> Result<PathBuf, AssetResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(AssetResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific asset cache directory.
///
/// - macOS: `~/Library/Application Support/moodcam/assets/`
/// - Linux: `$XDG_CACHE_HOME/moodcam/assets/` or `~/.cache/moodcam/assets/`
/// - Windows: `%LOCALAPPDATA%/moodcam/assets/`
pub fn asset_cache_dir() -> Result<PathBuf, AssetResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("moodcam").join("assets"))
            .ok_or(AssetResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("moodcam").join("assets"))
            .ok_or(AssetResolveError::NoCacheDir)
    }
}

fn download_err(url: &str) -> impl FnOnce(reqwest::Error) -> AssetResolveError + '_ {
    move |source| AssetResolveError::Download {
        url: url.to_string(),
        source,
    }
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> AssetResolveError + '_ {
    move |source| AssetResolveError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn download(
    url: &str,
    dest: &Path,
    progress: Option<&ProgressFn>,
) -> Result<(), AssetResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err(url))?;
    let total = response.content_length().unwrap_or(0);

    // Fetch fully before touching the filesystem so a failed request never
    // leaves a partial file behind.
    let bytes = response.bytes().map_err(download_err(url))?;

    // Write to a temp file first, then rename for atomicity.
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    let mut written: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk).map_err(write_err(&temp_path))?;
        written += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(written, total);
        }
    }
    file.flush().map_err(write_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}
