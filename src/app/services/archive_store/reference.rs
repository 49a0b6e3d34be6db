//! Stable record references
//!
//! An entry id is the first 28 characters of the URL-safe, unpadded base64
//! encoding of the SHA-512 digest of the upload id followed by the filename.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha512};

use crate::constants::archive::ENTRY_ID_LENGTH;

/// Entry id of a file within an upload
pub fn entry_id(upload_id: &str, filename: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(upload_id.as_bytes());
    hasher.update(filename.as_bytes());

    let mut encoded = URL_SAFE_NO_PAD.encode(hasher.finalize());
    encoded.truncate(ENTRY_ID_LENGTH);
    encoded
}

/// `../uploads/<upload_id>/archive/<entry_id>`
pub fn archive_reference(upload_id: &str, entry_id: &str) -> String {
    format!("../uploads/{}/archive/{}", upload_id, entry_id)
}

/// Reference to the `data` section of a stored file
pub fn hash_reference(upload_id: &str, filename: &str) -> String {
    format!(
        "{}#data",
        archive_reference(upload_id, &entry_id(upload_id, filename))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_shape() {
        let id = entry_id("local", "sample_meas.archive.yaml");
        assert_eq!(id.len(), ENTRY_ID_LENGTH);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_entry_id_is_stable_and_distinct() {
        assert_eq!(
            entry_id("local", "a.archive.yaml"),
            entry_id("local", "a.archive.yaml")
        );
        assert_ne!(
            entry_id("local", "a.archive.yaml"),
            entry_id("local", "b.archive.yaml")
        );
        assert_ne!(
            entry_id("upload-1", "a.archive.yaml"),
            entry_id("upload-2", "a.archive.yaml")
        );
    }

    #[test]
    fn test_hash_reference_format() {
        let reference = hash_reference("local", "sample_meas.archive.yaml");
        let id = entry_id("local", "sample_meas.archive.yaml");
        assert_eq!(reference, format!("../uploads/local/archive/{}#data", id));
    }
}
