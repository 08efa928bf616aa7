//! Object store for uploaded images.
//!
//! Objects live in named buckets under slash-separated paths and are
//! served publicly at `{base}/storage/{bucket}/{path}`.

pub mod local;
pub mod memory;

use std::fmt;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

/// Bucket for event and gallery images.
pub const EVENT_IMAGES: &str = "event_images";

/// Bucket for sponsor logos.
pub const SPONSOR_LOGOS: &str = "sponsor_logos";

/// URL segment under which objects are served.
pub const STORAGE_PREFIX: &str = "/storage/";

/// Errors raised by an [`ObjectStore`].
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// Bucket or path contains forbidden segments.
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    /// No object at this location.
    #[error("object {bucket}/{path} not found")]
    NotFound {
        /// Bucket searched.
        bucket: String,
        /// Path searched.
        path: String,
    },

    /// An object already exists at this location.
    #[error("object {bucket}/{path} already exists")]
    AlreadyExists {
        /// Bucket written to.
        bucket: String,
        /// Path written to.
        path: String,
    },

    /// Underlying storage failed.
    #[error("object store I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ObjectError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Binary storage with public URLs.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Base URL that public object URLs start with.
    fn base_url(&self) -> &str;

    /// Stores `bytes` at `bucket/path`.
    ///
    /// Existing objects are never replaced; writing to a taken location
    /// fails with [`ObjectError::AlreadyExists`].
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<(), ObjectError>;

    /// Reads the object at `bucket/path`.
    async fn read(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectError>;

    /// Removes the given objects. Missing objects are ignored.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), ObjectError>;

    /// Public URL of `bucket/path`.
    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}{STORAGE_PREFIX}{bucket}/{path}",
            self.base_url().trim_end_matches('/')
        )
    }

    /// Splits a public URL produced by this store back into bucket and
    /// path. `None` for URLs that point elsewhere.
    fn locate(&self, url: &str) -> Option<(String, String)> {
        let rest = url.strip_prefix(self.base_url().trim_end_matches('/'))?;
        let rest = rest.strip_prefix(STORAGE_PREFIX)?;
        let (bucket, path) = rest.split_once('/')?;
        check_location(bucket, path).ok()?;
        Some((bucket.to_string(), path.to_string()))
    }
}

/// Rejects empty, absolute or parent-relative locations.
///
/// # Errors
///
/// Returns [`ObjectError::InvalidPath`] for unsafe locations.
pub fn check_location(bucket: &str, path: &str) -> Result<(), ObjectError> {
    let bad_segment = |s: &str| s.is_empty() || s == "." || s == ".." || s.contains('\\');
    if bucket.contains('/') || bad_segment(bucket) || path.split('/').any(bad_segment) {
        return Err(ObjectError::InvalidPath(format!("{bucket}/{path}")));
    }
    Ok(())
}

/// An image file received from a form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name as sent by the browser.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Lower-cased extension of the file name, `bin` when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Object name for this upload: `<prefix>-<millis>-<nonce>.<ext>`, or
    /// `<millis>-<nonce>.<ext>` without a prefix.
    #[must_use]
    pub fn object_name(&self, prefix: Option<&str>, millis: i64, nonce: &str) -> String {
        let ext = self.extension();
        match prefix {
            Some(prefix) => format!("{prefix}-{millis}-{nonce}.{ext}"),
            None => format!("{millis}-{nonce}.{ext}"),
        }
    }
}

/// MIME type served for a stored object, guessed from its extension.
#[must_use]
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: None,
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn object_names() {
        assert_eq!(
            upload("Poster.PNG").object_name(None, 1_700, "ab12"),
            "1700-ab12.png"
        );
        assert_eq!(
            upload("a.b.jpeg").object_name(Some("gallery"), 42, "ff"),
            "gallery-42-ff.jpeg"
        );
        assert_eq!(upload("noext").object_name(None, 1, "0"), "1-0.bin");
    }

    #[test]
    fn unsafe_locations_are_rejected() {
        assert!(check_location("event_images", "1.png").is_ok());
        assert!(check_location("event_images", "../etc/passwd").is_err());
        assert!(check_location("", "1.png").is_err());
        assert!(check_location("a/b", "1.png").is_err());
        assert!(check_location("event_images", "dir//x.png").is_err());
    }

    #[test]
    fn url_round_trip_through_locate() {
        let store = MemoryObjectStore::new("http://localhost:3000/");
        let url = store.public_url(EVENT_IMAGES, "123.png");
        assert_eq!(url, "http://localhost:3000/storage/event_images/123.png");
        assert_eq!(
            store.locate(&url),
            Some((EVENT_IMAGES.to_string(), "123.png".to_string()))
        );
        assert_eq!(store.locate("https://images.unsplash.com/photo.jpg"), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("x.JPG"), "image/jpeg");
        assert_eq!(content_type_for("x.svg"), "application/octet-stream");
        assert_eq!(content_type_for("x"), "application/octet-stream");
    }
}
