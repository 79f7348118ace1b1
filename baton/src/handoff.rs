//! Who drains what, and from where.
//!
//! Every thread keeps a stack of the inboxes it is currently draining,
//! innermost last. A send that finds its target idle makes the sending
//! thread the drainer; when the declared sender is the innermost drain on
//! that thread, the takeover is an inline handoff, i.e. an ordinary nested
//! function call on the sender's stack. A target that is already running
//! (including the sender itself) only gets the operation appended.

use std::cell::RefCell;
use std::fmt;

use crate::inbox::InboxId;

thread_local! {
    static DRAINING: RefCell<Vec<InboxId>> = const { RefCell::new(Vec::new()) };
}

/// How a sent operation was handled at the moment of the send.
///
/// Which outcome a given send gets depends on timing; every outcome keeps
/// per-inbox FIFO order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Another context was already draining the target; the operation was
    /// appended and the caller returned immediately.
    Queued,
    /// The target was idle and the caller, with no sender drain on its
    /// stack, drained it to empty before returning.
    Drained,
    /// The target was idle and the declared sender's own drain took it over
    /// as a nested call before returning.
    Inline,
}

impl Delivery {
    /// Whether the caller's own thread ran the drain.
    pub fn ran_on_caller(self) -> bool {
        !matches!(self, Delivery::Queued)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Queued => "queued",
            Delivery::Drained => "drained",
            Delivery::Inline => "inline",
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if the current thread is inside any drain.
pub fn is_draining() -> bool {
    depth() > 0
}

/// Number of drains nested on the current thread.
pub fn depth() -> usize {
    DRAINING.with(|stack| stack.borrow().len())
}

/// The inbox whose operation is executing right now on this thread.
pub fn current() -> Option<InboxId> {
    DRAINING.with(|stack| stack.borrow().last().copied())
}

pub(crate) fn is_current(id: InboxId) -> bool {
    current() == Some(id)
}

/// Decides the outcome for a caller that has just won the idle->running
/// transition of a target.
pub(crate) fn classify(sender: Option<InboxId>) -> Delivery {
    match sender {
        Some(id) if is_current(id) => Delivery::Inline,
        Some(id) => {
            tracing::trace!(sender = %id, "declared sender is not draining here; treated as external");
            Delivery::Drained
        }
        None => Delivery::Drained,
    }
}

/// Marks `id` as draining on this thread for the scope's lifetime.
pub(crate) struct DrainScope {
    id: InboxId,
}

impl DrainScope {
    /// Pushes `id` and returns the scope together with the new depth.
    pub(crate) fn enter(id: InboxId) -> (Self, usize) {
        let depth = DRAINING.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(id);
            stack.len()
        });
        (Self { id }, depth)
    }
}

impl Drop for DrainScope {
    fn drop(&mut self) {
        DRAINING.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.id), "drain scopes must unwind in order");
        });
    }
}
