//! Photo retrieval over HTTP(S) and the local filesystem.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use campuscard_card_render::PhotoFetcher;
use campuscard_common::config::FetchConfig;
use campuscard_common::error::{CampusCardError, CampusCardResult};
use reqwest::blocking::Client;
use reqwest::Url;

/// Fetches photos referenced by `http(s)://` URLs, `file://` URLs or plain
/// filesystem paths.
///
/// Local references are only served from inside the configured photo root;
/// relative paths are resolved against it. Without a root, local references
/// are rejected.
///
/// Built on a blocking HTTP client: construct, use and drop it on a thread
/// that is allowed to block.
#[derive(Debug, Clone)]
pub struct UriPhotoFetcher {
    client: Client,
    max_bytes: u64,
    photo_root: Option<PathBuf>,
}

impl UriPhotoFetcher {
    pub fn new(config: &FetchConfig) -> CampusCardResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("campuscard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CampusCardError::fetch("", format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            max_bytes: config.max_photo_bytes,
            photo_root: config.photo_root.clone(),
        })
    }

    fn fetch_http(&self, uri: &str) -> CampusCardResult<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .send()
            .map_err(|e| CampusCardError::fetch(uri, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CampusCardError::fetch(uri, format!("HTTP {status}")));
        }
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large(uri));
            }
        }

        let mut bytes = Vec::new();
        response
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| CampusCardError::fetch(uri, format!("reading body: {e}")))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(self.too_large(uri));
        }
        Ok(bytes)
    }

    /// Resolve a local reference to a canonical path inside the photo root.
    fn confine(&self, uri: &str, path: &Path) -> CampusCardResult<PathBuf> {
        let root = self
            .photo_root
            .as_deref()
            .ok_or_else(|| CampusCardError::fetch(uri, "local photo references are disabled"))?;
        let root = root.canonicalize().map_err(|e| {
            CampusCardError::fetch(uri, format!("photo root {}: {e}", root.display()))
        })?;
        let resolved = root
            .join(path)
            .canonicalize()
            .map_err(|e| CampusCardError::fetch(uri, e.to_string()))?;
        if !resolved.starts_with(&root) {
            return Err(CampusCardError::fetch(uri, "path is outside the photo root"));
        }
        Ok(resolved)
    }

    fn fetch_file(&self, uri: &str, path: &Path) -> CampusCardResult<Vec<u8>> {
        let path = self.confine(uri, path)?;
        let path = path.as_path();
        let metadata = std::fs::metadata(path).map_err(|e| CampusCardError::fetch(uri, e.to_string()))?;
        if !metadata.is_file() {
            return Err(CampusCardError::fetch(uri, "not a regular file"));
        }
        if metadata.len() > self.max_bytes {
            return Err(self.too_large(uri));
        }
        std::fs::read(path).map_err(|e| CampusCardError::fetch(uri, e.to_string()))
    }

    fn too_large(&self, uri: &str) -> CampusCardError {
        CampusCardError::fetch(uri, format!("photo exceeds {} bytes", self.max_bytes))
    }
}

/// How a photo reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PhotoLocation {
    Http,
    File(PathBuf),
}

fn locate(uri: &str) -> CampusCardResult<PhotoLocation> {
    if !uri.contains("://") {
        return Ok(PhotoLocation::File(PathBuf::from(uri)));
    }
    let url = Url::parse(uri).map_err(|e| CampusCardError::fetch(uri, format!("invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(PhotoLocation::Http),
        "file" => url
            .to_file_path()
            .map(PhotoLocation::File)
            .map_err(|()| CampusCardError::fetch(uri, "file URL has no local path")),
        other => Err(CampusCardError::fetch(
            uri,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

impl PhotoFetcher for UriPhotoFetcher {
    fn fetch(&self, uri: &str) -> CampusCardResult<Vec<u8>> {
        let bytes = match locate(uri)? {
            PhotoLocation::Http => self.fetch_http(uri)?,
            PhotoLocation::File(path) => self.fetch_file(uri, &path)?,
        };
        tracing::trace!(uri, bytes = bytes.len(), "Fetched photo");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fetcher(max_photo_bytes: u64, photo_root: Option<&Path>) -> UriPhotoFetcher {
        UriPhotoFetcher::new(&FetchConfig {
            timeout_secs: 2,
            max_photo_bytes,
            photo_root: photo_root.map(Path::to_path_buf),
        })
        .unwrap()
    }

    fn photo_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();
        std::fs::write(dir.path().join("photos").join("asha.jpg"), b"photo-bytes").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"DB_PASSWORD=hunter2").unwrap();
        dir
    }

    #[test]
    fn test_locate_schemes() {
        assert_eq!(
            locate("https://res.cloudinary.com/demo/asha.jpg").unwrap(),
            PhotoLocation::Http
        );
        assert_eq!(
            locate("uploads/asha.jpg").unwrap(),
            PhotoLocation::File(PathBuf::from("uploads/asha.jpg"))
        );
        assert!(matches!(
            locate("ftp://example.com/asha.jpg"),
            Err(CampusCardError::Fetch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url_is_decoded() {
        assert_eq!(
            locate("file:///srv/photos/asha%20rao.jpg").unwrap(),
            PhotoLocation::File(PathBuf::from("/srv/photos/asha rao.jpg"))
        );
    }

    #[test]
    fn test_reads_local_file_inside_root() {
        let dir = photo_dir();
        let root = dir.path().join("photos");
        let absolute = root.join("asha.jpg");

        let fetcher = fetcher(1024, Some(&root));
        assert_eq!(fetcher.fetch(absolute.to_str().unwrap()).unwrap(), b"photo-bytes");
        assert_eq!(fetcher.fetch("asha.jpg").unwrap(), b"photo-bytes");
    }

    #[test]
    fn test_local_files_disabled_without_root() {
        let dir = photo_dir();
        let path = dir.path().join("photos").join("asha.jpg");
        let err = fetcher(1024, None)
            .fetch(path.to_str().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_rejects_paths_outside_root() {
        let dir = photo_dir();
        let root = dir.path().join("photos");
        let fetcher = fetcher(1024, Some(&root));

        let secret = dir.path().join("secret.txt");
        for uri in [
            secret.to_str().unwrap().to_string(),
            "../secret.txt".to_string(),
            format!("file://{}", secret.display()),
        ] {
            let err = fetcher.fetch(&uri).unwrap_err();
            assert!(matches!(err, CampusCardError::Fetch { .. }), "{uri}: {err}");
            assert!(!err.to_string().contains("hunter2"));
        }
    }

    #[test]
    fn test_rejects_oversized_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("big.jpg")).unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let err = fetcher(16, Some(dir.path())).fetch("big.jpg").unwrap_err();
        assert!(err.to_string().contains("exceeds 16 bytes"));
    }

    #[test]
    fn test_missing_local_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            fetcher(1024, Some(dir.path())).fetch("nobody.jpg"),
            Err(CampusCardError::Fetch { .. })
        ));
    }
}
