use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create model directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
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

/// Locates a model file (cascade XML or ONNX), downloading it when missing.
///
/// Lookup order:
/// 1. User cache directory (platform-specific)
/// 2. `bundled_dir`, for development checkouts and packaged installs
/// 3. Download from `url` into the cache directory
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, name, url, bundled_dir, progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(bundled_path) = bundled_dir.map(|dir| dir.join(name)) {
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/EmoSignal/models/`
/// - Linux: `$XDG_CACHE_HOME/EmoSignal/models/` or `~/.cache/EmoSignal/models/`
/// - Windows: `%LOCALAPPDATA%/EmoSignal/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("EmoSignal").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

/// Streams `url` into `dest` through a `.part` file, renamed on success.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");
    let result = download_to(url, &temp_path, progress).and_then(|()| {
        fs::rename(&temp_path, dest).map_err(|e| write_error(dest, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_to(
    url: &str,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut file = fs::File::create(temp_path).map_err(|e| write_error(temp_path, e))?;

    let mut buf = vec![0u8; 256 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| write_error(temp_path, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| write_error(temp_path, e))?;
        downloaded += n as u64;
        if let Some(cb) = &progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| write_error(temp_path, e))
}

fn write_error(path: &Path, source: std::io::Error) -> ModelResolveError {
    ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_cached_file() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("model.onnx");
        fs::write(&cached, b"cached").unwrap();

        let path = resolve_in(tmp.path(), "model.onnx", "http://127.0.0.1:9/none", None, None)
            .unwrap();
        assert_eq!(path, cached);
    }

    #[test]
    fn test_resolve_falls_back_to_bundled_dir() {
        let cache = TempDir::new().unwrap();
        let bundled = TempDir::new().unwrap();
        let bundled_path = bundled.path().join("cascade.xml");
        fs::write(&bundled_path, b"<xml/>").unwrap();

        let path = resolve_in(
            cache.path(),
            "cascade.xml",
            "http://127.0.0.1:9/none",
            Some(bundled.path()),
            None,
        )
        .unwrap();
        assert_eq!(path, bundled_path);
    }

    #[test]
    fn test_resolve_downloads_into_cache() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/models/cascade.xml");
            then.status(200).body("<opencv_storage/>");
        });
        let cache = TempDir::new().unwrap();
        let cache_dir = cache.path().join("nested");

        let seen = Arc::new(AtomicU64::new(0));
        let flag = seen.clone();
        let path = resolve_in(
            &cache_dir,
            "cascade.xml",
            &server.url("/models/cascade.xml"),
            None,
            Some(Box::new(move |downloaded, _total| {
                flag.store(downloaded, Ordering::Relaxed);
            })),
        )
        .unwrap();

        mock.assert();
        assert_eq!(path, cache_dir.join("cascade.xml"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<opencv_storage/>");
        assert_eq!(seen.load(Ordering::Relaxed), 17);
        assert!(!path.with_extension("part").exists());
    }

    #[test]
    fn test_download_http_error_leaves_no_files() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.onnx");
            then.status(404);
        });
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");

        let result = download(&server.url("/missing.onnx"), &dest, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }

    #[test]
    fn test_model_cache_dir_names_the_app() {
        if let Ok(path) = model_cache_dir() {
            let text = path.to_string_lossy();
            assert!(text.contains("EmoSignal"));
            assert!(text.ends_with("models"));
        }
    }
}
