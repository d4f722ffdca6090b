//! Binary payloads and attachment resolution capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Default MIME type for blobs created without an explicit type
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Bytes of the default placeholder blob
const PLACEHOLDER_BYTES: &[u8] = b"fingir:placeholder";

/// An immutable binary payload.
///
/// Stand-in for the emulated framework's binary stream contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    bytes: Vec<u8>,
    mime_type: String,
}

impl Blob {
    /// Create a blob from raw bytes with the default MIME type
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: OCTET_STREAM.to_string(),
        }
    }

    /// Create a blob with an explicit MIME type
    #[must_use]
    pub fn with_mime_type(bytes: impl Into<Vec<u8>>, mime_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
        }
    }

    /// Default placeholder blob, used when an item carries an attachment
    /// slot but no resolution capability
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_BYTES)
    }

    /// Whether this blob is the default placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.bytes == PLACEHOLDER_BYTES
    }

    /// Raw bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Byte length
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob holds zero bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Error produced by an attachment resolution capability.
///
/// Models both a synchronous throw and a rejected promise in the emulated
/// framework. It never crosses the collection API boundary: delayed
/// resolution converts it to a terminal null-resolved state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolution capability failed
    #[error("attachment resolution failed: {0}")]
    Failed(String),
}

/// A zero-argument resolution capability returning binary data.
///
/// `Ok(None)` models an empty/undefined result; `Err(_)` models a thrown
/// error or rejected promise.
pub type ResolveFn = Rc<dyn Fn() -> Result<Option<Blob>, ResolveError>>;

/// Reference to binary attachment content, as carried by an
/// [`Item`](crate::Item) in its explicit attachment slot.
#[derive(Clone, Default)]
pub struct AttachmentRef {
    filename: Option<String>,
    resolver: Option<ResolveFn>,
}

impl AttachmentRef {
    /// An attachment slot with no resolution capability at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An attachment backed by a custom resolution closure
    #[must_use]
    pub fn resolving<F>(resolve: F) -> Self
    where
        F: Fn() -> Result<Option<Blob>, ResolveError> + 'static,
    {
        Self {
            filename: None,
            resolver: Some(Rc::new(resolve)),
        }
    }

    /// An attachment resolving to a fixed blob
    #[must_use]
    pub fn of_blob(blob: Blob) -> Self {
        Self::resolving(move || Ok(Some(blob.clone())))
    }

    /// An attachment whose resolution always fails
    #[must_use]
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::resolving(move || Err(ResolveError::Failed(message.clone())))
    }

    /// Set the filename metadata
    #[must_use]
    pub fn named(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    /// Filename metadata, if any
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Whether a resolution capability is present
    #[must_use]
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Invoke the resolution capability directly, bypassing any deferral.
    ///
    /// A capability-less attachment resolves to the placeholder blob.
    pub fn resolve_now(&self) -> Result<Option<Blob>, ResolveError> {
        match &self.resolver {
            Some(resolve) => resolve(),
            None => Ok(Some(Blob::placeholder())),
        }
    }

    /// Shared handle to the resolution capability
    pub(crate) fn resolver(&self) -> Option<ResolveFn> {
        self.resolver.clone()
    }
}

impl fmt::Debug for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentRef")
            .field("filename", &self.filename)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_defaults() {
        let blob = Blob::new(b"pixels".to_vec());
        assert_eq!(blob.bytes(), b"pixels");
        assert_eq!(blob.mime_type(), OCTET_STREAM);
        assert_eq!(blob.len(), 6);
        assert!(!blob.is_empty());
        assert!(!blob.is_placeholder());
    }

    #[test]
    fn test_blob_placeholder() {
        let blob = Blob::placeholder();
        assert!(blob.is_placeholder());
        assert!(!blob.is_empty());
    }

    #[test]
    fn test_blob_mime_type() {
        let blob = Blob::with_mime_type(vec![0x89, 0x50], "image/png");
        assert_eq!(blob.mime_type(), "image/png");
    }

    #[test]
    fn test_attachment_of_blob_resolves() {
        let att = AttachmentRef::of_blob(Blob::new(b"a".to_vec()));
        assert!(att.has_resolver());
        assert_eq!(att.resolve_now().unwrap(), Some(Blob::new(b"a".to_vec())));
    }

    #[test]
    fn test_attachment_empty_resolves_to_placeholder() {
        let att = AttachmentRef::empty();
        assert!(!att.has_resolver());
        let resolved = att.resolve_now().unwrap().unwrap();
        assert!(resolved.is_placeholder());
    }

    #[test]
    fn test_attachment_failing() {
        let att = AttachmentRef::failing("disk on fire");
        let err = att.resolve_now().unwrap_err();
        assert_eq!(err, ResolveError::Failed("disk on fire".to_string()));
    }

    #[test]
    fn test_attachment_filename() {
        let att = AttachmentRef::empty().named("photo.png");
        assert_eq!(att.filename(), Some("photo.png"));
    }

    #[test]
    fn test_attachment_clone_shares_resolver() {
        let att = AttachmentRef::of_blob(Blob::new(b"x".to_vec()));
        let cloned = att.clone();
        assert_eq!(att.resolve_now().unwrap(), cloned.resolve_now().unwrap());
    }
}
