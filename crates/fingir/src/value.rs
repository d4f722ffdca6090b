//! Stored values: arbitrary JSON data plus an explicit attachment slot.

use crate::blob::AttachmentRef;
use crate::payload::DelayedPayload;

/// Reserved meta-attribute name for the loaded flag
pub const LOADED_KEY: &str = "_loaded";

/// Reserved meta-attribute name for the mutation-interface handle
pub const MUTATIONS_KEY: &str = "_mutations";

/// Whether `name` is one of the two reserved meta-attribute names
#[must_use]
pub fn is_reserved_key(name: &str) -> bool {
    name == LOADED_KEY || name == MUTATIONS_KEY
}

/// Attachment slot of an [`Item`]
#[derive(Debug, Clone)]
pub enum Attachment {
    /// As inserted; content is available through the carried capability
    Immediate(AttachmentRef),
    /// Substituted on insertion into a collection configured for deferred
    /// resolution
    Deferred(DelayedPayload),
}

impl Attachment {
    /// Whether this slot was replaced by a delayed payload wrapper
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// The delayed payload, if this slot was deferred
    #[must_use]
    pub fn as_deferred(&self) -> Option<&DelayedPayload> {
        match self {
            Self::Deferred(payload) => Some(payload),
            Self::Immediate(_) => None,
        }
    }

    /// The original attachment reference, if stored as inserted
    #[must_use]
    pub fn as_immediate(&self) -> Option<&AttachmentRef> {
        match self {
            Self::Immediate(att) => Some(att),
            Self::Deferred(_) => None,
        }
    }
}

/// A value stored in a collection.
///
/// Data is arbitrary JSON. Binary content lives in the explicit
/// `attachment` slot rather than being sniffed out of the data shape, so
/// the deferred-wrapping rule never needs reflection to decide whether it
/// applies.
#[derive(Debug, Clone, Default)]
pub struct Item {
    data: serde_json::Value,
    attachment: Option<Attachment>,
}

impl Item {
    /// Plain data item with no attachment
    #[must_use]
    pub fn json(data: impl Into<serde_json::Value>) -> Self {
        Self {
            data: data.into(),
            attachment: None,
        }
    }

    /// Item carrying an attachment
    #[must_use]
    pub fn with_attachment(data: impl Into<serde_json::Value>, attachment: AttachmentRef) -> Self {
        Self {
            data: data.into(),
            attachment: Some(Attachment::Immediate(attachment)),
        }
    }

    /// The JSON data
    #[must_use]
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Convenience accessor for a named data field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }

    /// The attachment slot
    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Shallow copy with the attachment slot replaced by a delayed payload
    pub(crate) fn with_deferred(mut self, payload: DelayedPayload) -> Self {
        self.attachment = Some(Attachment::Deferred(payload));
        self
    }
}

/// Result of a by-name lookup on a collection, covering both data keys
/// and the two reserved meta-attributes.
///
/// `H` is the collection's mutation-interface handle type.
#[derive(Debug, Clone)]
pub enum Field<H> {
    /// The loaded flag (always `true` for these stand-ins)
    Loaded(bool),
    /// The mutation-interface handle
    Mutations(H),
    /// A data value
    Data(Item),
}

impl<H> Field<H> {
    /// The data value, if this lookup hit a data key
    #[must_use]
    pub fn into_data(self) -> Option<Item> {
        match self {
            Self::Data(item) => Some(item),
            _ => None,
        }
    }
}
