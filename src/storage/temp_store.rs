use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process-lifetime store for uploaded images.
///
/// Files are keyed by the SHA-256 of their contents, so concurrent uploads of
/// different images can never collide and re-uploading identical bytes reuses
/// the same key. The backing directory is removed when the last handle drops.
#[derive(Clone)]
pub struct TempStore {
    dir: Arc<TempDir>,
}

impl TempStore {
    pub fn new() -> Result<Self, StoreError> {
        let dir = TempDir::with_prefix("agelens-uploads-")?;
        Ok(Self { dir: Arc::new(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `bytes` under a content-hash key, keeping the original
    /// extension (lowercased) so served files get a sensible content type.
    /// Returns the stored filename.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = hex::encode(hasher.finalize());

        let key = match extension_of(original_name) {
            Some(ext) => format!("{}.{}", hash, ext),
            None => hash,
        };
        fs::write(self.dir.path().join(&key), bytes)?;
        debug!("Stored upload as {}", key);
        Ok(key)
    }

    /// Resolves a stored filename to its on-disk path. Names containing
    /// anything outside the hash/extension alphabet are rejected, so a
    /// request can never read outside the store directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains("..") {
            return None;
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
        {
            return None;
        }
        let path = self.dir.path().join(name);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }
}

fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_bytes_read_back_exactly() {
        let store = TempStore::new().unwrap();
        let bytes = b"pretend this is a png";
        let key = store.save("a.png", bytes).unwrap();

        let path = store.resolve(&key).expect("stored file should resolve");
        assert_eq!(fs::read(path).unwrap(), bytes);
    }

    #[test]
    fn keys_are_content_hashes_with_a_lowercased_extension() {
        let store = TempStore::new().unwrap();
        let first = store.save("selfie.PNG", b"same bytes").unwrap();
        let second = store.save("other-name.png", b"same bytes").unwrap();

        assert!(first.ends_with(".png"));
        assert_eq!(first, second);
        assert_ne!(first, store.save("selfie.png", b"different").unwrap());
    }

    #[test]
    fn path_components_in_the_original_name_cannot_escape_the_store() {
        let store = TempStore::new().unwrap();
        let key = store.save("../../etc/passwd.png", b"x").unwrap();
        assert!(!key.contains('/'));
        assert!(store.resolve(&key).is_some());
    }

    #[test]
    fn resolve_rejects_unsafe_names() {
        let store = TempStore::new().unwrap();
        store.save("a.png", b"x").unwrap();

        assert!(store.resolve("").is_none());
        assert!(store.resolve("../secret").is_none());
        assert!(store.resolve("a/b.png").is_none());
        assert!(store.resolve("name with spaces.png").is_none());
        assert!(store.resolve("missing.png").is_none());
    }

    #[test]
    fn names_without_an_extension_still_store() {
        let store = TempStore::new().unwrap();
        let key = store.save("photo", b"x").unwrap();
        assert!(!key.contains('.'));
        assert!(store.resolve(&key).is_some());
    }

    #[test]
    fn dropping_the_last_handle_removes_the_directory() {
        let store = TempStore::new().unwrap();
        let clone = store.clone();
        let dir = store.path().to_path_buf();
        store.save("a.png", b"x").unwrap();

        drop(store);
        assert!(dir.exists());
        drop(clone);
        assert!(!dir.exists());
    }
}
