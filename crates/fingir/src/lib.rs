//! Fingir: In-Memory Test Doubles for Collaborative Data Structures
//!
//! Fingir (Spanish: "to feign") provides fast in-memory stand-ins for a
//! reactive collaborative-data framework's collections, so application
//! code under test never touches the real syncing machinery. Collections
//! come in a record (key/value) and a list (ordered) variant, every
//! mutation goes through a call-tracked interface, and nested binary
//! attachments can optionally resolve with a configurable delay to
//! emulate a reload-from-storage scenario.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RecordCollection / ListCollection                           │
//! │    data keys: enumerable, mutable                            │
//! │    meta keys: _loaded, _mutations (addressable, hidden)      │
//! │        │                                                     │
//! │        ├──► RecordHandle / ListHandle ──► CallLog            │
//! │        │      set/delete/has/get, push/splice   (ordered)    │
//! │        │                                                     │
//! │        └──► DelayedPayload ──► ResolutionScheduler           │
//! │               Pending → Resolved    (virtual clock, timers)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use fingir::{
//!     AttachmentRef, Blob, CollectionConfig, Item, PayloadState, RecordCollection,
//!     ResolutionScheduler,
//! };
//! use std::rc::Rc;
//!
//! let scheduler = ResolutionScheduler::shared();
//! let record = RecordCollection::new(
//!     CollectionConfig::deferred().delay_ms(100),
//!     Rc::clone(&scheduler),
//! );
//!
//! let blob = Blob::new(b"pixels".to_vec());
//! record.mutations().set(
//!     "img-1",
//!     Item::with_attachment(
//!         serde_json::json!({"filename": "photo.png"}),
//!         AttachmentRef::of_blob(blob.clone()),
//!     ),
//! );
//!
//! // Attachment content is unavailable until virtual time passes the delay.
//! let payload = record.get("img-1").unwrap().attachment().unwrap().as_deferred().unwrap().clone();
//! assert_eq!(payload.state(), PayloadState::Pending);
//!
//! scheduler.advance(150);
//! assert_eq!(payload.state(), PayloadState::Resolved(Some(blob)));
//!
//! // Every mutation-interface call was recorded for later assertions.
//! assert_eq!(record.mutations().log().len(), 1);
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod blob;
mod config;
mod ids;
mod list;
mod payload;
mod record;
mod recorder;
mod scheduler;
mod value;

pub use blob::{AttachmentRef, Blob, ResolveError, ResolveFn, OCTET_STREAM};
pub use config::{CollectionConfig, DEFAULT_RESOLUTION_DELAY_MS};
pub use ids::{MockId, OwnerRef};
pub use list::{ListCollection, ListHandle};
pub use payload::{DelayedPayload, PayloadState};
pub use record::{RecordCollection, RecordHandle};
pub use recorder::{CallKind, CallLog, RecordedCall};
pub use scheduler::{ResolutionScheduler, TimerId};
pub use value::{is_reserved_key, Attachment, Field, Item, LOADED_KEY, MUTATIONS_KEY};

use std::rc::Rc;

/// Create a record-variant reactive collection stand-in
#[must_use]
pub fn create_record_collection(
    config: CollectionConfig,
    scheduler: Rc<ResolutionScheduler>,
) -> RecordCollection {
    RecordCollection::new(config, scheduler)
}

/// Create a list-variant reactive collection stand-in
#[must_use]
pub fn create_list_collection(
    config: CollectionConfig,
    scheduler: Rc<ResolutionScheduler>,
) -> ListCollection {
    ListCollection::new(config, scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // End-to-end scenario: one scheduler shared by a record and a list,
    // bulk-cancelled mid-flight.
    #[test]
    fn test_shared_scheduler_across_collections() {
        let scheduler = ResolutionScheduler::shared();
        let record = create_record_collection(
            CollectionConfig::deferred().delay_ms(100),
            Rc::clone(&scheduler),
        );
        let list = create_list_collection(
            CollectionConfig::deferred().delay_ms(200),
            Rc::clone(&scheduler),
        );

        record.mutations().set(
            "img",
            Item::with_attachment(json!({}), AttachmentRef::of_blob(Blob::new(b"r".to_vec()))),
        );
        list.mutations()
            .push(Item::with_attachment(json!({}), AttachmentRef::empty()));
        assert_eq!(scheduler.pending_timers(), 2);

        // The record's timer fires first; the list's is still pending.
        scheduler.advance(100);
        assert_eq!(scheduler.pending_timers(), 1);

        scheduler.cancel_all();
        scheduler.advance(1_000);
        let payload = list.get(0).unwrap().attachment().unwrap().as_deferred().unwrap().clone();
        assert!(payload.is_pending());
    }

    #[test]
    fn test_factories_produce_loaded_collections() {
        let scheduler = ResolutionScheduler::shared();
        let record = create_record_collection(CollectionConfig::new(), Rc::clone(&scheduler));
        let list = create_list_collection(CollectionConfig::new(), scheduler);
        assert!(record.is_loaded());
        assert!(list.is_loaded());
    }
}
