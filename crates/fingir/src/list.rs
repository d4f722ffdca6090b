//! List-variant collection: a call-tracked ordered stand-in.

use crate::config::CollectionConfig;
use crate::ids::{MockId, OwnerRef};
use crate::payload::wrap_for_insert;
use crate::recorder::{CallLog, RecordedCall};
use crate::scheduler::ResolutionScheduler;
use crate::value::{is_reserved_key, Field, Item, LOADED_KEY, MUTATIONS_KEY};
use std::cell::RefCell;
use std::rc::Rc;

type Backing = Rc<RefCell<Vec<Item>>>;

/// Mutation interface of a [`ListCollection`].
///
/// Every call is appended to the shared [`CallLog`]; the write only
/// reaches the backing sequence when write-through is configured.
#[derive(Debug, Clone)]
pub struct ListHandle {
    id: MockId,
    owner: OwnerRef,
    log: CallLog,
    items: Backing,
    config: CollectionConfig,
    scheduler: Rc<ResolutionScheduler>,
}

impl ListHandle {
    /// Append `value`, applying the deferred-wrapping rule on insertion.
    /// Always recorded.
    pub fn push(&self, value: Item) {
        self.log.record(RecordedCall::Push {
            value: value.clone(),
        });
        if self.config.write_through {
            let stored = wrap_for_insert(value, &self.config, &self.scheduler);
            self.items.borrow_mut().push(stored);
        }
    }

    /// Remove `delete_count` items starting at `index` and insert
    /// `inserted` in their place, each subject to the deferred-wrapping
    /// rule. Index and count are clamped to the sequence bounds. Recorded
    /// with all arguments. Returns the removed items (empty in spy-only
    /// mode, where nothing is mutated).
    pub fn splice(&self, index: usize, delete_count: usize, inserted: Vec<Item>) -> Vec<Item> {
        self.log.record(RecordedCall::Splice {
            index,
            delete_count,
            inserted: inserted.clone(),
        });
        if !self.config.write_through {
            return Vec::new();
        }
        let mut items = self.items.borrow_mut();
        let start = index.min(items.len());
        let end = start.saturating_add(delete_count).min(items.len());
        let replacement: Vec<Item> = inserted
            .into_iter()
            .map(|item| wrap_for_insert(item, &self.config, &self.scheduler))
            .collect();
        items.splice(start..end, replacement).collect()
    }

    /// Interface identity
    #[must_use]
    pub fn id(&self) -> &MockId {
        &self.id
    }

    /// Owner reference
    #[must_use]
    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// The call log shared with every clone of this handle
    #[must_use]
    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

/// In-memory stand-in for the emulated framework's ordered list
/// collection.
///
/// Indexed lookup, iteration, and length behave like a plain sequence.
/// The two reserved meta-attributes are addressable by name but never
/// surface through index-based enumeration.
#[derive(Debug, Clone)]
pub struct ListCollection {
    items: Backing,
    handle: ListHandle,
}

impl ListCollection {
    /// Create a list collection against the given scheduler
    #[must_use]
    pub fn new(config: CollectionConfig, scheduler: Rc<ResolutionScheduler>) -> Self {
        Self::with_owner(config, scheduler, OwnerRef::anonymous())
    }

    /// Create a list collection with an explicit owner
    #[must_use]
    pub fn with_owner(
        config: CollectionConfig,
        scheduler: Rc<ResolutionScheduler>,
        owner: OwnerRef,
    ) -> Self {
        let items: Backing = Rc::new(RefCell::new(Vec::new()));
        let handle = ListHandle {
            id: MockId::generate(),
            owner,
            log: CallLog::new(),
            items: Rc::clone(&items),
            config,
            scheduler,
        };
        Self { items, handle }
    }

    /// Loaded flag; always `true` for these stand-ins
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        true
    }

    /// The mutation interface
    #[must_use]
    pub fn mutations(&self) -> &ListHandle {
        &self.handle
    }

    /// Direct (unrecorded) indexed read
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Item> {
        self.items.borrow().get(index).cloned()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the list holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Snapshot of the items, in sequence order
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.items.borrow().clone()
    }

    /// By-name lookup covering the two meta-attributes and stringified
    /// indices (the emulated framework addresses list elements as
    /// properties, so `"0"` hits the first item)
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Field<ListHandle>> {
        match name {
            LOADED_KEY => Some(Field::Loaded(true)),
            MUTATIONS_KEY => Some(Field::Mutations(self.handle.clone())),
            _ => name.parse::<usize>().ok().and_then(|i| self.get(i)).map(Field::Data),
        }
    }

    /// Existence check: `true` for both meta names and in-range indices
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        if is_reserved_key(name) {
            return true;
        }
        name.parse::<usize>()
            .map(|i| i < self.len())
            .unwrap_or(false)
    }

    /// Direct indexed assignment, bypassing the mutation interface.
    ///
    /// Not recorded. In-range indices are replaced, `index == len`
    /// appends, anything beyond is silently ignored. The
    /// deferred-wrapping rule still applies.
    pub fn assign(&self, index: usize, value: Item) {
        let handle = &self.handle;
        let stored = wrap_for_insert(value, &handle.config, &handle.scheduler);
        let mut items = self.items.borrow_mut();
        if index < items.len() {
            items[index] = stored;
        } else if index == items.len() {
            items.push(stored);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{AttachmentRef, Blob};
    use crate::payload::PayloadState;
    use crate::recorder::CallKind;
    use serde_json::json;

    fn deferred_list(delay_ms: u64) -> (ListCollection, Rc<ResolutionScheduler>) {
        let scheduler = ResolutionScheduler::shared();
        let list = ListCollection::new(
            CollectionConfig::deferred().delay_ms(delay_ms),
            Rc::clone(&scheduler),
        );
        (list, scheduler)
    }

    fn deferred_state(list: &ListCollection, index: usize) -> PayloadState {
        list.get(index)
            .unwrap()
            .attachment()
            .unwrap()
            .as_deferred()
            .unwrap()
            .state()
    }

    #[test]
    fn test_push_appends_in_order() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations().push(Item::json(json!("a")));
        list.mutations().push(Item::json(json!("b")));

        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().data(), &json!("a"));
        assert_eq!(list.get(1).unwrap().data(), &json!("b"));
    }

    #[test]
    fn test_splice_replaces_range_and_returns_removed() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        for v in ["a", "b", "c", "d"] {
            list.mutations().push(Item::json(json!(v)));
        }

        let removed = list
            .mutations()
            .splice(1, 2, vec![Item::json(json!("x")), Item::json(json!("y"))]);

        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].data(), &json!("b"));
        assert_eq!(removed[1].data(), &json!("c"));

        let values: Vec<_> = list.items().iter().map(|i| i.data().clone()).collect();
        assert_eq!(values, vec![json!("a"), json!("x"), json!("y"), json!("d")]);
    }

    #[test]
    fn test_splice_inserted_items_discoverable_immediately() {
        let (list, _scheduler) = deferred_list(100);
        list.mutations().push(Item::json(json!("head")));

        list.mutations().splice(
            1,
            0,
            vec![Item::with_attachment(json!({}), AttachmentRef::empty())],
        );

        assert_eq!(list.len(), 2);
        assert_eq!(deferred_state(&list, 1), PayloadState::Pending);
    }

    #[test]
    fn test_splice_clamps_out_of_range_arguments() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations().push(Item::json(json!("a")));

        let removed = list.mutations().splice(10, 5, vec![Item::json(json!("b"))]);
        assert!(removed.is_empty());
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().data(), &json!("b"));
    }

    #[test]
    fn test_splice_records_all_arguments() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations()
            .splice(3, 1, vec![Item::json(json!("x")), Item::json(json!("y"))]);

        let calls = list.mutations().log().calls();
        let RecordedCall::Splice {
            index,
            delete_count,
            inserted,
        } = &calls[0]
        else {
            panic!("expected a splice call");
        };
        assert_eq!((*index, *delete_count), (3, 1));
        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].data(), &json!("x"));
    }

    #[test]
    fn test_spy_only_records_without_mutating() {
        let list = ListCollection::new(
            CollectionConfig::new().spy_only(),
            ResolutionScheduler::shared(),
        );
        list.mutations().push(Item::json(json!(1)));
        let removed = list.mutations().splice(0, 1, vec![]);

        assert!(list.is_empty());
        assert!(removed.is_empty());
        assert_eq!(list.mutations().log().count(CallKind::Push), 1);
        assert_eq!(list.mutations().log().count(CallKind::Splice), 1);
    }

    #[test]
    fn test_meta_attributes_not_enumerable() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations().push(Item::json(json!("a")));

        // Generic sequence inspection sees only the data items.
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.len(), 1);

        // By-name addressing still reaches the meta-attributes.
        assert!(list.contains(LOADED_KEY));
        assert!(list.contains(MUTATIONS_KEY));
        assert!(matches!(list.lookup(LOADED_KEY), Some(Field::Loaded(true))));
        assert!(matches!(
            list.lookup(MUTATIONS_KEY),
            Some(Field::Mutations(_))
        ));
    }

    #[test]
    fn test_lookup_by_stringified_index() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations().push(Item::json(json!("a")));

        let item = list.lookup("0").and_then(Field::into_data).unwrap();
        assert_eq!(item.data(), &json!("a"));
        assert!(list.contains("0"));
        assert!(!list.contains("1"));
        assert!(list.lookup("nonsense").is_none());
    }

    #[test]
    fn test_push_without_capability_resolves_to_placeholder() {
        let (list, scheduler) = deferred_list(100);
        list.mutations()
            .push(Item::with_attachment(json!({}), AttachmentRef::empty()));

        assert_eq!(deferred_state(&list, 0), PayloadState::Pending);

        scheduler.advance(100);
        match deferred_state(&list, 0) {
            PayloadState::Resolved(Some(blob)) => assert!(blob.is_placeholder()),
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_deferred_push_pending_then_resolved() {
        let (list, scheduler) = deferred_list(50);
        let blob = Blob::new(b"bytes".to_vec());
        list.mutations().push(Item::with_attachment(
            json!({"filename": "clip.bin"}),
            AttachmentRef::of_blob(blob.clone()),
        ));

        assert_eq!(deferred_state(&list, 0), PayloadState::Pending);

        scheduler.advance(50);
        assert_eq!(deferred_state(&list, 0), PayloadState::Resolved(Some(blob)));
    }

    #[test]
    fn test_assign_replaces_or_appends() {
        let list = ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared());
        list.mutations().push(Item::json(json!("a")));

        list.assign(0, Item::json(json!("a2")));
        assert_eq!(list.get(0).unwrap().data(), &json!("a2"));

        list.assign(1, Item::json(json!("b")));
        assert_eq!(list.len(), 2);

        // Far past the end: silently ignored.
        list.assign(99, Item::json(json!("zzz")));
        assert_eq!(list.len(), 2);
        assert!(list.mutations().log().is_empty());
    }

    #[test]
    fn test_handle_identity() {
        let list = ListCollection::with_owner(
            CollectionConfig::new(),
            ResolutionScheduler::shared(),
            OwnerRef::named("group-1"),
        );
        assert_eq!(list.mutations().owner().name(), Some("group-1"));
        assert_ne!(
            list.mutations().id(),
            ListCollection::new(CollectionConfig::new(), ResolutionScheduler::shared())
                .mutations()
                .id()
        );
    }
}
