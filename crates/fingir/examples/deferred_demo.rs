//! Walkthrough of deferred attachment resolution and bulk cancellation.
//!
//! Run with: `cargo run --example deferred_demo`

use fingir::{
    AttachmentRef, Blob, CollectionConfig, Item, PayloadState, RecordCollection,
    ResolutionScheduler,
};
use std::rc::Rc;

fn state_of(record: &RecordCollection, key: &str) -> PayloadState {
    record
        .get(key)
        .and_then(|item| item.attachment().and_then(|a| a.as_deferred().cloned()))
        .map(|payload| payload.state())
        .unwrap_or(PayloadState::Pending)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fingir=trace".into()),
        )
        .init();

    let scheduler = ResolutionScheduler::shared();
    let record = RecordCollection::new(
        CollectionConfig::deferred().delay_ms(100),
        Rc::clone(&scheduler),
    );

    record.mutations().set(
        "img-1",
        Item::with_attachment(
            serde_json::json!({"filename": "photo.png"}),
            AttachmentRef::of_blob(Blob::with_mime_type(b"pixels".to_vec(), "image/png")),
        ),
    );
    record.mutations().set(
        "img-2",
        Item::with_attachment(
            serde_json::json!({"filename": "broken.png"}),
            AttachmentRef::failing("storage unavailable"),
        ),
    );

    println!("at t=0ms:    img-1 is {:?}", state_of(&record, "img-1"));

    scheduler.advance(150);
    println!("at t=150ms:  img-1 is {:?}", state_of(&record, "img-1"));
    println!("at t=150ms:  img-2 is {:?}", state_of(&record, "img-2"));

    record.mutations().set(
        "img-3",
        Item::with_attachment(serde_json::json!({}), AttachmentRef::empty()),
    );
    scheduler.cancel_all();
    scheduler.advance(1_000);
    println!("cancelled:   img-3 is {:?}", state_of(&record, "img-3"));

    println!(
        "recorded {} mutation calls on interface {}",
        record.mutations().log().len(),
        record.mutations().id()
    );
}
