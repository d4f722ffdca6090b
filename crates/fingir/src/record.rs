//! Record-variant collection: a call-tracked key/value stand-in.

use crate::config::CollectionConfig;
use crate::ids::{MockId, OwnerRef};
use crate::payload::wrap_for_insert;
use crate::recorder::{CallLog, RecordedCall};
use crate::scheduler::ResolutionScheduler;
use crate::value::{is_reserved_key, Field, Item, LOADED_KEY, MUTATIONS_KEY};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Backing = Rc<RefCell<BTreeMap<String, Item>>>;

/// Mutation interface of a [`RecordCollection`].
///
/// Every call is appended to the shared [`CallLog`]; the write only
/// reaches the backing collection when write-through is configured.
/// Clones share the backing store, the log, and identity.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    id: MockId,
    owner: OwnerRef,
    log: CallLog,
    entries: Backing,
    config: CollectionConfig,
    scheduler: Rc<ResolutionScheduler>,
}

impl RecordHandle {
    /// Set `key` to `value`, applying the deferred-wrapping rule on
    /// insertion. Always recorded.
    pub fn set(&self, key: &str, value: Item) {
        self.log.record(RecordedCall::Set {
            key: key.to_string(),
            value: value.clone(),
        });
        if self.config.write_through {
            let stored = wrap_for_insert(value, &self.config, &self.scheduler);
            self.entries.borrow_mut().insert(key.to_string(), stored);
        }
    }

    /// Remove `key`. Always recorded.
    pub fn delete(&self, key: &str) {
        self.log.record(RecordedCall::Delete {
            key: key.to_string(),
        });
        if self.config.write_through {
            self.entries.borrow_mut().remove(key);
        }
    }

    /// Live-state membership check. Recorded.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.log.record(RecordedCall::Has {
            key: key.to_string(),
        });
        self.entries.borrow().contains_key(key)
    }

    /// Live-state read. Recorded.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Item> {
        self.log.record(RecordedCall::Get {
            key: key.to_string(),
        });
        self.entries.borrow().get(key).cloned()
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

/// In-memory stand-in for the emulated framework's record (key/value)
/// collection.
///
/// Data keys are fully enumerable and mutable. The two reserved
/// meta-attributes ([`LOADED_KEY`], [`MUTATIONS_KEY`]) answer direct
/// lookups and existence checks but never show up in enumeration, and
/// assigning to them is silently ignored.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    entries: Backing,
    handle: RecordHandle,
}

impl RecordCollection {
    /// Create a record collection against the given scheduler
    #[must_use]
    pub fn new(config: CollectionConfig, scheduler: Rc<ResolutionScheduler>) -> Self {
        Self::with_owner(config, scheduler, OwnerRef::anonymous())
    }

    /// Create a record collection with an explicit owner
    #[must_use]
    pub fn with_owner(
        config: CollectionConfig,
        scheduler: Rc<ResolutionScheduler>,
        owner: OwnerRef,
    ) -> Self {
        let entries: Backing = Rc::new(RefCell::new(BTreeMap::new()));
        let handle = RecordHandle {
            id: MockId::generate(),
            owner,
            log: CallLog::new(),
            entries: Rc::clone(&entries),
            config,
            scheduler,
        };
        Self { entries, handle }
    }

    /// Loaded flag; always `true` for these stand-ins
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        true
    }

    /// The mutation interface
    #[must_use]
    pub fn mutations(&self) -> &RecordHandle {
        &self.handle
    }

    /// Direct (unrecorded) read of a data key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Item> {
        self.entries.borrow().get(key).cloned()
    }

    /// By-name lookup covering data keys and the two meta-attributes
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Field<RecordHandle>> {
        match name {
            LOADED_KEY => Some(Field::Loaded(true)),
            MUTATIONS_KEY => Some(Field::Mutations(self.handle.clone())),
            _ => self.entries.borrow().get(name).cloned().map(Field::Data),
        }
    }

    /// Existence check (the `in` operator of the emulated framework):
    /// `true` for present data keys and for both meta names
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        is_reserved_key(name) || self.entries.borrow().contains_key(name)
    }

    /// Enumerable keys, in sorted order. Meta names are excluded.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Number of data entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the collection holds no data entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of all entries, in key order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Item)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Direct property assignment, bypassing the mutation interface.
    ///
    /// Not recorded. The deferred-wrapping rule still applies, so direct
    /// writes behave like interface writes at the storage level.
    /// Assignment to a reserved meta name is silently ignored.
    pub fn assign(&self, key: &str, value: Item) {
        if is_reserved_key(key) {
            return;
        }
        let handle = &self.handle;
        let stored = wrap_for_insert(value, &handle.config, &handle.scheduler);
        self.entries.borrow_mut().insert(key.to_string(), stored);
    }

    /// Direct removal, bypassing the mutation interface. Not recorded.
    pub fn remove(&self, key: &str) -> Option<Item> {
        self.entries.borrow_mut().remove(key)
    }
}
