//! Deterministic scheduler for deferred attachment resolution.
//!
//! Replaces wall-clock timers with a virtual clock: tests advance time
//! explicitly and every due timer fires synchronously, in deadline order.
//! The registry of pending timers is owned by the scheduler handle that
//! collections receive at construction, so timer lifetime stays explicit
//! instead of hiding in a process-wide singleton.

use crate::blob::ResolveFn;
use crate::payload::{resolve_into, PayloadState};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Guard against resolution callbacks that keep scheduling further
/// already-due timers
const MAX_TIMERS_PER_ADVANCE: usize = 10_000;

/// Identifier of a scheduled resolution timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct PendingTimer {
    id: TimerId,
    deadline_ms: u64,
    resolver: Option<ResolveFn>,
    state: Rc<RefCell<PayloadState>>,
}

/// Virtual clock plus registry of pending resolution timers.
///
/// Shared between every collection created against it via
/// [`ResolutionScheduler::shared`]. [`cancel_all`](Self::cancel_all)
/// clears only this scheduler's timers; unrelated schedulers are never
/// affected.
pub struct ResolutionScheduler {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<PendingTimer>>,
}

impl ResolutionScheduler {
    /// Create a scheduler with virtual time at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            next_id: Cell::new(0),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// Shared handle, ready to hand to collection constructors
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Number of timers that have not fired or been cancelled
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Register a one-shot resolution timer
    pub(crate) fn schedule(
        &self,
        delay_ms: u64,
        resolver: Option<ResolveFn>,
        state: Rc<RefCell<PayloadState>>,
    ) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let deadline_ms = self.now_ms.get().saturating_add(delay_ms);
        tracing::trace!(timer = id.0, deadline_ms, "scheduling resolution timer");
        self.timers.borrow_mut().push(PendingTimer {
            id,
            deadline_ms,
            resolver,
            state,
        });
        id
    }

    /// Advance virtual time by `ms`, firing every due timer.
    ///
    /// `advance(0)` fires timers scheduled with a zero delay.
    pub fn advance(&self, ms: u64) {
        self.advance_to(self.now_ms.get().saturating_add(ms));
    }

    /// Advance virtual time to an absolute instant, firing every timer
    /// whose deadline has been reached, in deadline order (ties in
    /// schedule order). Each timer fires exactly once and is removed from
    /// the registry on completion.
    pub fn advance_to(&self, instant_ms: u64) {
        if instant_ms > self.now_ms.get() {
            self.now_ms.set(instant_ms);
        }

        let mut fired = 0;
        while fired < MAX_TIMERS_PER_ADVANCE {
            let now = self.now_ms.get();
            let due = {
                let timers = self.timers.borrow();
                timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline_ms <= now)
                    .min_by_key(|(_, t)| (t.deadline_ms, t.id.0))
                    .map(|(i, _)| i)
            };
            let Some(index) = due else { break };
            let timer = self.timers.borrow_mut().remove(index);
            tracing::trace!(timer = timer.id.0, "firing resolution timer");
            // No borrow is held here, so a resolver may schedule new timers.
            resolve_into(timer.resolver.as_ref(), &timer.state);
            fired += 1;
        }
    }

    /// Cancel every pending timer without transitioning its wrapper.
    ///
    /// Wrappers whose timers are cancelled stay `Pending` permanently;
    /// this models aborted test teardown. Idempotent: safe to call with
    /// zero pending timers.
    pub fn cancel_all(&self) {
        let cancelled = self.timers.borrow_mut().drain(..).count();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending resolution timers");
        }
    }
}

impl Default for ResolutionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolutionScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionScheduler")
            .field("now_ms", &self.now_ms.get())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}
