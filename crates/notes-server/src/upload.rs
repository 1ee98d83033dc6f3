//! Avatar upload storage.
//!
//! Accepted files are restricted by extension and size, then persisted
//! under `<root>/avatars/` with a server-generated, collision-resistant
//! filename (timestamp + random suffix + original extension). The client's
//! filename never reaches disk.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{ApiError, FieldErrors};

/// Extensions accepted for avatar uploads, lowercase with leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Subdirectory of the upload root holding avatars.
const AVATAR_SUBDIR: &str = "avatars";

/// Errors from the upload store.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Extension outside the allow-list (or no extension at all).
    #[error("disallowed file extension")]
    DisallowedExtension,

    /// File exceeds the configured ceiling.
    #[error("file of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Filesystem failure.
    #[error("upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::DisallowedExtension => {
                let mut map = FieldErrors::new();
                map.insert(
                    "avatar".to_string(),
                    "Only image uploads are allowed (.jpg, .jpeg, .png, .gif)".to_string(),
                );
                ApiError::Validation(map)
            }
            UploadError::TooLarge { limit, .. } => {
                let mut map = FieldErrors::new();
                map.insert(
                    "avatar".to_string(),
                    format!("File exceeds the maximum size of {limit} bytes"),
                );
                ApiError::Validation(map)
            }
            UploadError::Io(e) => ApiError::Internal(format!("Avatar storage failed: {e}")),
        }
    }
}

/// Filesystem store for avatar images.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    /// Create the store, ensuring `<root>/avatars/` exists.
    pub async fn new(root: &str) -> Result<Self, UploadError> {
        let dir = Path::new(root).join(AVATAR_SUBDIR);
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Extract and check the extension of a client-supplied filename.
    pub fn allowed_extension(original_name: &str) -> Result<&'static str, UploadError> {
        let ext = original_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
            .ok_or(UploadError::DisallowedExtension)?;

        ALLOWED_EXTENSIONS
            .iter()
            .find(|allowed| **allowed == ext)
            .copied()
            .ok_or(UploadError::DisallowedExtension)
    }

    /// Generate a collision-resistant filename, independent of the
    /// client's name apart from the extension.
    fn generate_filename(ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u64 = rand::random();
        format!("{millis}-{suffix}{ext}")
    }

    /// Validate and persist an uploaded file. Returns the stored filename.
    pub async fn save(
        &self,
        original_name: &str,
        data: &[u8],
        max_bytes: usize,
    ) -> Result<String, UploadError> {
        let ext = Self::allowed_extension(original_name)?;

        if data.len() > max_bytes {
            return Err(UploadError::TooLarge {
                size: data.len(),
                limit: max_bytes,
            });
        }

        let filename = Self::generate_filename(ext);
        fs::write(self.dir.join(&filename), data).await?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Stored avatar");
        Ok(filename)
    }

    /// Absolute path of a stored filename. Returns `None` for names that
    /// could escape the avatar directory.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.dir.join(filename))
    }

    /// Open a stored file for streaming. `Ok(None)` when the file is
    /// missing or the name is unsafe, so stale references read as absent.
    pub async fn open(&self, filename: &str) -> Result<Option<fs::File>, UploadError> {
        let Some(path) = self.path_of(filename) else {
            return Ok(None);
        };
        match fs::File::open(&path).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UploadError::Io(e)),
        }
    }

    /// Best-effort removal for failure-path cleanup. Failures are logged
    /// and swallowed; they never override the primary error.
    pub async fn remove(&self, filename: &str) {
        let Some(path) = self.path_of(filename) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(filename = %filename, error = %e, "Failed to remove avatar file");
            }
        }
    }
}

/// Map a stored filename's extension to a content type for streaming.
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, AvatarStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(tmp.path().to_str().unwrap()).await.unwrap();
        (tmp, store)
    }

    #[test]
    fn test_allowed_extension_accepts_images() {
        assert_eq!(AvatarStore::allowed_extension("me.jpg").unwrap(), ".jpg");
        assert_eq!(AvatarStore::allowed_extension("ME.JPEG").unwrap(), ".jpeg");
        assert_eq!(AvatarStore::allowed_extension("a.b.png").unwrap(), ".png");
        assert_eq!(AvatarStore::allowed_extension("x.gif").unwrap(), ".gif");
    }

    #[test]
    fn test_allowed_extension_rejects_others() {
        assert!(AvatarStore::allowed_extension("notes.txt").is_err());
        assert!(AvatarStore::allowed_extension("archive.tar.gz").is_err());
        assert!(AvatarStore::allowed_extension("no-extension").is_err());
    }

    #[test]
    fn test_generated_filenames_differ() {
        let a = AvatarStore::generate_filename(".png");
        let b = AvatarStore::generate_filename(".png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_save_and_open() {
        let (_tmp, store) = store().await;
        let filename = store.save("photo.png", b"fake-png", 1024).await.unwrap();
        assert!(filename.ends_with(".png"));
        assert_ne!(filename, "photo.png");
        assert!(store.open(&filename).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let (_tmp, store) = store().await;
        let err = store.save("photo.png", &[0u8; 100], 10).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size: 100, limit: 10 }));
    }

    #[tokio::test]
    async fn test_save_rejects_bad_extension_before_writing() {
        let (tmp, store) = store().await;
        assert!(store.save("evil.txt", b"data", 1024).await.is_err());
        let mut entries = std::fs::read_dir(tmp.path().join("avatars")).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_is_none() {
        let (_tmp, store) = store().await;
        assert!(store.open("1234-5.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_traversal_names_are_rejected() {
        let (_tmp, store) = store().await;
        assert!(store.path_of("../secret.png").is_none());
        assert!(store.path_of("a/b.png").is_none());
        assert!(store.open("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let (_tmp, store) = store().await;
        // Removing a missing file must not panic or error.
        store.remove("does-not-exist.png").await;
        let filename = store.save("photo.jpg", b"x", 1024).await.unwrap();
        store.remove(&filename).await;
        assert!(store.open(&filename).await.unwrap().is_none());
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
