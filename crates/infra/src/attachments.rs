//! Delivery-document blob storage.
//!
//! IN requests must carry an uploaded delivery order; the store accepts the
//! raw bytes, files them under a generated key, and hands back the opaque
//! reference the request keeps.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use gudang_core::AttachmentRef;

use crate::store::StoreError;

pub trait AttachmentStore: Send + Sync {
    /// Store a blob, returning its reference.
    fn put(&self, original_name: &str, bytes: &[u8]) -> Result<AttachmentRef, StoreError>;
    /// Read a blob back by reference.
    fn open(&self, reference: &AttachmentRef) -> Result<Vec<u8>, StoreError>;
}

/// Filesystem-backed attachment store.
#[derive(Debug, Clone)]
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    /// Open (creating if needed) the upload directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| StoreError::backend(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    /// Keys carry a sanitized trace of the original filename for operators
    /// browsing the upload directory; uniqueness comes from the uuid prefix.
    fn make_key(original_name: &str) -> String {
        let safe: String = original_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let safe = if safe.is_empty() {
            "attachment".to_string()
        } else {
            safe
        };
        format!("{}_{safe}", Uuid::now_v7())
    }
}

impl AttachmentStore for FsAttachmentStore {
    fn put(&self, original_name: &str, bytes: &[u8]) -> Result<AttachmentRef, StoreError> {
        let key = Self::make_key(original_name);
        let path = self.root.join(&key);
        fs::write(&path, bytes)
            .map_err(|e| StoreError::backend(format!("write {}: {e}", path.display())))?;
        Ok(AttachmentRef::new(key))
    }

    fn open(&self, reference: &AttachmentRef) -> Result<Vec<u8>, StoreError> {
        let key = reference.as_str();
        // Keys are single path components; anything else never came from put().
        if key.is_empty() || key.contains('/') || key.contains('\\') || key == "." || key == ".." {
            return Err(StoreError::backend(format!("invalid attachment key: {key}")));
        }
        let path = self.root.join(key);
        fs::read(&path)
            .map_err(|e| StoreError::backend(format!("read {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FsAttachmentStore {
        let dir = std::env::temp_dir().join(format!("gudang-attach-{}", Uuid::now_v7()));
        FsAttachmentStore::new(dir).unwrap()
    }

    #[test]
    fn put_then_open_round_trips() {
        let store = store();
        let reference = store.put("surat-jalan.pdf", b"%PDF-1.4 stub").unwrap();
        assert!(reference.as_str().ends_with("surat-jalan.pdf"));
        assert_eq!(store.open(&reference).unwrap(), b"%PDF-1.4 stub");
    }

    #[test]
    fn hostile_filenames_are_sanitized() {
        let store = store();
        let reference = store.put("../../etc/passwd", b"x").unwrap();
        assert!(!reference.as_str().contains('/'));
        assert_eq!(store.open(&reference).unwrap(), b"x");
    }

    #[test]
    fn traversal_keys_are_refused_on_open() {
        let store = store();
        let err = store.open(&AttachmentRef::new("../outside")).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
