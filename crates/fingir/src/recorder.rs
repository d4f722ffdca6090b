//! Append-only log of mutation-interface calls.

use crate::value::Item;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Kind discriminant of a [`RecordedCall`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    /// `set(key, value)`
    Set,
    /// `delete(key)`
    Delete,
    /// `has(key)`
    Has,
    /// `get(key)`
    Get,
    /// `push(value)`
    Push,
    /// `splice(index, delete_count, inserted...)`
    Splice,
}

/// One recorded mutation-interface call, with its full arguments as
/// passed by the caller (before any deferred-wrapping)
#[derive(Debug, Clone)]
pub enum RecordedCall {
    /// `set(key, value)`
    Set {
        /// Target key
        key: String,
        /// Value argument
        value: Item,
    },
    /// `delete(key)`
    Delete {
        /// Target key
        key: String,
    },
    /// `has(key)`
    Has {
        /// Queried key
        key: String,
    },
    /// `get(key)`
    Get {
        /// Queried key
        key: String,
    },
    /// `push(value)`
    Push {
        /// Value argument
        value: Item,
    },
    /// `splice(index, delete_count, inserted...)`
    Splice {
        /// Start index
        index: usize,
        /// Number of items removed
        delete_count: usize,
        /// Inserted items
        inserted: Vec<Item>,
    },
}

impl RecordedCall {
    /// Kind of this call
    #[must_use]
    pub fn kind(&self) -> CallKind {
        match self {
            Self::Set { .. } => CallKind::Set,
            Self::Delete { .. } => CallKind::Delete,
            Self::Has { .. } => CallKind::Has,
            Self::Get { .. } => CallKind::Get,
            Self::Push { .. } => CallKind::Push,
            Self::Splice { .. } => CallKind::Splice,
        }
    }

    /// Key argument, for the record-variant calls
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Set { key, .. }
            | Self::Delete { key }
            | Self::Has { key }
            | Self::Get { key } => Some(key),
            Self::Push { .. } | Self::Splice { .. } => None,
        }
    }
}

/// Shared append-only call log.
///
/// Calls are stored in strict call order and are never reordered or
/// dropped; assertions in application tests rely on that ordering. Every
/// clone shares the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl CallLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call
    pub(crate) fn record(&self, call: RecordedCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Total number of recorded calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Snapshot of all recorded calls, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls of the given kind
    #[must_use]
    pub fn count(&self, kind: CallKind) -> usize {
        self.calls.borrow().iter().filter(|c| c.kind() == kind).count()
    }

    /// Most recent call
    #[must_use]
    pub fn last(&self) -> Option<RecordedCall> {
        self.calls.borrow().last().cloned()
    }

    /// Forget all recorded calls (for reuse between test cases)
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}
