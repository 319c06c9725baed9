//! Image bytes and the storage collaborator used to load and save them.

use std::fmt;
use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use imagen_wire::{Struct, Value};
use tracing::debug;

use crate::error::VisionResult;

/// Byte-level image storage.
pub trait ImageStore: Send + Sync {
    fn load_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn save_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Local filesystem storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImageStore;

impl ImageStore for LocalImageStore {
    fn load_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn save_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}

/// Encoded image (PNG, JPEG, ...). Pixels are never decoded here.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
}

impl Image {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Load an image from a local file.
    pub fn load_from_file(path: impl AsRef<Path>) -> VisionResult<Self> {
        Self::load_with(&LocalImageStore, path)
    }

    pub fn load_with(store: &dyn ImageStore, path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let bytes = store.load_bytes(path)?;
        debug!("Loaded {} image bytes from {}", bytes.len(), path.display());
        Ok(Self { bytes })
    }

    /// Save the image bytes to a local file.
    pub fn save(&self, path: impl AsRef<Path>) -> VisionResult<()> {
        self.save_with(&LocalImageStore, path)
    }

    pub fn save_with(&self, store: &dyn ImageStore, path: impl AsRef<Path>) -> VisionResult<()> {
        let path = path.as_ref();
        store.save_bytes(path, &self.bytes)?;
        debug!("Saved {} image bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }

    pub fn from_base64(encoded: &str) -> VisionResult<Self> {
        Ok(Self {
            bytes: STANDARD.decode(encoded)?,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the bytes, as the service expects in
    /// `bytesBase64Encoded`.
    pub fn as_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// MIME type sniffed from the file signature, falling back to JPEG.
    pub fn mime_type(&self) -> &'static str {
        let b = self.bytes.as_slice();
        if b.starts_with(b"\x89PNG\r\n\x1a\n") {
            "image/png"
        } else if b.starts_with(&[0xFF, 0xD8, 0xFF]) {
            "image/jpeg"
        } else if b.starts_with(b"GIF87a") || b.starts_with(b"GIF89a") {
            "image/gif"
        } else if b.len() >= 12 && &b[0..4] == b"RIFF" && &b[8..12] == b"WEBP" {
            "image/webp"
        } else {
            "image/jpeg"
        }
    }

    /// `{"bytesBase64Encoded": ...}` as a wire value.
    pub fn to_wire_instance(&self) -> Value {
        Value::StructValue(Struct::from_iter([(
            "bytesBase64Encoded".to_string(),
            Value::StringValue(self.as_base64()),
        )]))
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("mime_type", &self.mime_type())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<Vec<u8>> for Image {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisionError;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_mime_type_sniffing() {
        assert_eq!(Image::new(PNG_HEADER).mime_type(), "image/png");
        assert_eq!(Image::new(vec![0xFF, 0xD8, 0xFF, 0xE0]).mime_type(), "image/jpeg");
        assert_eq!(Image::new(b"GIF89a....".to_vec()).mime_type(), "image/gif");
        assert_eq!(Image::new(b"RIFF\0\0\0\0WEBPVP8 ".to_vec()).mime_type(), "image/webp");
        assert_eq!(Image::new(b"unknown".to_vec()).mime_type(), "image/jpeg");
    }

    #[test]
    fn test_base64_round_trip() {
        let image = Image::new(PNG_HEADER);
        let encoded = image.as_base64();
        assert_eq!(Image::from_base64(&encoded).unwrap(), image);
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            Image::from_base64("not base64!"),
            Err(VisionError::Base64(_))
        ));
    }

    #[test]
    fn test_wire_instance_shape() {
        let image = Image::new(vec![1, 2, 3]);
        let value = image.to_wire_instance();
        assert_eq!(
            value.as_struct().unwrap().get("bytesBase64Encoded"),
            Some(&Value::StringValue("AQID".into()))
        );
    }

    #[test]
    fn test_load_and_save_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");

        Image::new(PNG_HEADER).save(&path).unwrap();
        let loaded = Image::load_from_file(&path).unwrap();
        assert_eq!(loaded.bytes(), PNG_HEADER);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Image::load_from_file(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, VisionError::Io(_)));
    }

    #[test]
    fn test_debug_hides_bytes() {
        let rendered = format!("{:?}", Image::new(PNG_HEADER));
        assert!(rendered.contains("image/png"));
        assert!(!rendered.contains("137"));
    }
}
