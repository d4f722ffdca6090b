//! Delayed payload wrapper: one-shot emulation of attachment data
//! arriving some time after the item itself.

use crate::blob::{Blob, ResolveFn};
use crate::config::CollectionConfig;
use crate::scheduler::ResolutionScheduler;
use crate::value::{Attachment, Item};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Observable state of a [`DelayedPayload`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadState {
    /// The timer has not fired yet (or was cancelled); content is not
    /// available, as distinct from "resolved to nothing"
    Pending,
    /// Resolution ran: `Some` content, or `None` after a failed or empty
    /// resolution
    Resolved(Option<Blob>),
}

impl PayloadState {
    /// Whether resolution has not happened yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The resolved blob, if resolution produced one
    #[must_use]
    pub fn blob(&self) -> Option<&Blob> {
        match self {
            Self::Resolved(Some(blob)) => Some(blob),
            _ => None,
        }
    }
}

/// Wrapper emulating asynchronous arrival of binary attachment data.
///
/// Created at the moment an item is inserted into a collection configured
/// for deferred resolution. Clones share state, so a payload read out of a
/// collection observes the transition when the scheduler fires its timer.
/// A wrapper whose timer was bulk-cancelled stays `Pending` permanently.
#[derive(Debug, Clone)]
pub struct DelayedPayload {
    state: Rc<RefCell<PayloadState>>,
}

impl DelayedPayload {
    /// Fresh wrapper in the `Pending` state, not yet scheduled
    pub(crate) fn pending() -> Self {
        Self {
            state: Rc::new(RefCell::new(PayloadState::Pending)),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PayloadState {
        self.state.borrow().clone()
    }

    /// Whether resolution has not happened yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Shared handle to the state cell, for timer registration
    pub(crate) fn state_cell(&self) -> Rc<RefCell<PayloadState>> {
        Rc::clone(&self.state)
    }
}

/// Run the resolution procedure and store the terminal state.
///
/// Failures never propagate: a failed or empty resolution becomes
/// `Resolved(None)`, and a missing capability becomes the placeholder
/// blob.
pub(crate) fn resolve_into(resolver: Option<&ResolveFn>, state: &Rc<RefCell<PayloadState>>) {
    let outcome = match resolver {
        None => Some(Blob::placeholder()),
        Some(resolve) => match resolve() {
            Ok(Some(blob)) => Some(blob),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(error = %err, "attachment resolution failed, resolving to null");
                None
            }
        },
    };
    *state.borrow_mut() = PayloadState::Resolved(outcome);
}

/// Apply the deferred-wrapping rule for an insertion.
///
/// When the collection simulates deferred resolution and the item carries
/// an immediate attachment, the stored item is a shallow copy with the
/// attachment replaced by a wrapper whose timer is registered on the
/// collection's scheduler. Everything else is stored as-is.
pub(crate) fn wrap_for_insert(
    item: Item,
    config: &CollectionConfig,
    scheduler: &Rc<ResolutionScheduler>,
) -> Item {
    if !config.simulate_deferred_resolution {
        return item;
    }
    let Some(Attachment::Immediate(att)) = item.attachment() else {
        return item;
    };
    let resolver = att.resolver();
    let payload = DelayedPayload::pending();
    scheduler.schedule(config.resolution_delay_ms, resolver, payload.state_cell());
    item.with_deferred(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{AttachmentRef, ResolveError};

    fn resolve(resolver: Option<ResolveFn>) -> PayloadState {
        let payload = DelayedPayload::pending();
        resolve_into(resolver.as_ref(), &payload.state_cell());
        payload.state()
    }

    #[test]
    fn test_resolves_to_blob() {
        let blob = Blob::new(b"pixels".to_vec());
        let resolver: ResolveFn = {
            let blob = blob.clone();
            Rc::new(move || Ok(Some(blob.clone())))
        };
        assert_eq!(resolve(Some(resolver)), PayloadState::Resolved(Some(blob)));
    }

    #[test]
    fn test_empty_result_resolves_to_null() {
        let resolver: ResolveFn = Rc::new(|| Ok(None));
        assert_eq!(resolve(Some(resolver)), PayloadState::Resolved(None));
    }

    #[test]
    fn test_failure_resolves_to_null() {
        let resolver: ResolveFn = Rc::new(|| Err(ResolveError::Failed("x".to_string())));
        assert_eq!(resolve(Some(resolver)), PayloadState::Resolved(None));
    }

    #[test]
    fn test_missing_capability_resolves_to_placeholder() {
        match resolve(None) {
            PayloadState::Resolved(Some(blob)) => assert!(blob.is_placeholder()),
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_clones_share_state() {
        let payload = DelayedPayload::pending();
        let cloned = payload.clone();
        assert!(cloned.is_pending());

        resolve_into(None, &payload.state_cell());
        assert!(!cloned.is_pending());
    }

    #[test]
    fn test_wrap_rule_without_deferral_is_identity() {
        let scheduler = ResolutionScheduler::shared();
        let item = Item::with_attachment(serde_json::json!({}), AttachmentRef::empty());
        let stored = wrap_for_insert(item, &CollectionConfig::new(), &scheduler);
        assert!(!stored.attachment().unwrap().is_deferred());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_wrap_rule_defers_and_schedules() {
        let scheduler = ResolutionScheduler::shared();
        let item = Item::with_attachment(serde_json::json!({}), AttachmentRef::empty());
        let stored = wrap_for_insert(item, &CollectionConfig::deferred(), &scheduler);
        assert!(stored.attachment().unwrap().is_deferred());
        assert_eq!(scheduler.pending_timers(), 1);
    }

    #[test]
    fn test_wrap_rule_skips_items_without_attachment() {
        let scheduler = ResolutionScheduler::shared();
        let item = Item::json(serde_json::json!({"plain": true}));
        let stored = wrap_for_insert(item, &CollectionConfig::deferred(), &scheduler);
        assert!(stored.attachment().is_none());
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
