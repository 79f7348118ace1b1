//! The mailbox: a FIFO of pending operations plus a running flag.
//!
//! Nothing here spawns threads or tasks. Whoever sends to an idle inbox
//! drains it, on its own stack, until the queue is observed empty under the
//! lock; sends that find it running just append. The lock is held only for
//! queue bookkeeping, never while an operation executes, so operations are
//! free to send anywhere, including back to their own inbox.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::actor::Actor;
use crate::config::InboxConfig;
use crate::error::ConfigError;
use crate::handoff::{self, Delivery, DrainScope};
use crate::probe::Probe;

/// A deferred unit of work bound to one inbox.
pub type Operation = Box<dyn FnOnce() + Send + 'static>;

/// Identity of an inbox. Used to tell senders apart and to label logs;
/// never used to route anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InboxId(Uuid);

impl fmt::Display for InboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<Operation>,
    running: bool,
}

/// An actor's mailbox.
///
/// At most one execution context drains an inbox at any instant, and
/// operations execute exactly once, in the order they were appended.
/// Embed one in a struct and implement (or derive) [`Actor`] to make that
/// struct an actor.
pub struct Inbox {
    id: InboxId,
    config: InboxConfig,
    state: Mutex<State>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::build(InboxConfig::default())
    }

    pub fn with_config(config: InboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: InboxConfig) -> Self {
        Self {
            id: InboxId(Uuid::new_v4()),
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn id(&self) -> InboxId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    pub fn config(&self) -> &InboxConfig {
        &self.config
    }

    /// Number of operations waiting to run (snapshot in time).
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Whether some context is draining this inbox (snapshot in time).
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Sends `op` on behalf of `sender`.
    ///
    /// If the inbox is running, `op` is appended and this returns at once.
    /// Otherwise the calling thread drains the inbox to empty first, which
    /// runs `op` (and anything it causes to be queued here) before returning.
    /// When `sender` is the actor whose operation is currently executing on
    /// this thread, that drain is an inline handoff.
    ///
    /// Long chains of inline handoffs nest on the caller's stack; a chain
    /// deep enough overflows it.
    ///
    /// If an operation panics, the drain unwinds to whoever was running it
    /// and the inbox goes idle with the rest of its queue intact. Those
    /// leftovers run only when the next send to this inbox arrives.
    pub fn enqueue<F>(&self, sender: Option<&dyn Actor>, op: F) -> Delivery
    where
        F: FnOnce() + Send + 'static,
    {
        self.deliver(sender.map(|actor| actor.inbox().id()), Box::new(op))
    }

    /// Sends `op` from code that is not an actor.
    ///
    /// Appends or drains depending only on whether the inbox is running at
    /// the moment of the call.
    pub fn enqueue_external<F>(&self, op: F) -> Delivery
    where
        F: FnOnce() + Send + 'static,
    {
        self.deliver(None, Box::new(op))
    }

    /// Sends `op` from non-actor code and returns a handle that completes
    /// once `op` has returned. See [`Probe`].
    ///
    /// When an earlier operation panics while `op` is still queued, `op` is
    /// left behind until the next send drains the inbox, and
    /// [`Probe::wait`] blocks until then. Use [`Probe::wait_timeout`] where
    /// that matters.
    pub fn sync_exec<F, R>(&self, op: F) -> Probe<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        Probe::attach(self, op)
    }

    fn deliver(&self, sender: Option<InboxId>, op: Operation) -> Delivery {
        let head = {
            let mut state = self.lock();
            state.queue.push_back(op);
            self.note_backlog(state.queue.len());
            if state.running {
                crate::log_delivery!(self, Delivery::Queued, pending = state.queue.len());
                return Delivery::Queued;
            }
            state.running = true;
            // Not necessarily `op`: a panicked drain can leave older work behind.
            state.queue.pop_front()
        };

        let delivery = handoff::classify(sender);
        crate::log_delivery!(self, delivery);
        self.drain(head);
        delivery
    }

    /// Runs operations until the queue is observed empty, then goes idle.
    /// The caller must have flipped `running` to true.
    fn drain(&self, mut next: Option<Operation>) {
        let (_scope, depth) = DrainScope::enter(self.id);
        let _span = crate::drain_span!(self, depth).entered();
        self.note_depth(depth);

        let mut release = Release { inbox: self, armed: true };
        let mut executed = 0usize;
        while let Some(op) = next {
            op();
            executed += 1;

            let mut state = self.lock();
            next = state.queue.pop_front();
            if next.is_none() {
                state.running = false;
            }
        }
        release.armed = false;
        tracing::debug!(inbox = %self, executed, "drain finished");
    }

    fn note_backlog(&self, pending: usize) {
        if self.config.backlog_warning == Some(pending) {
            tracing::warn!(inbox = %self, pending, "inbox backlog reached warning threshold");
        }
    }

    fn note_depth(&self, depth: usize) {
        if let Some(limit) = self.config.inline_depth_warning {
            if depth == limit + 1 {
                tracing::warn!(inbox = %self, depth, limit, "inline drain nesting exceeded warning threshold");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Operations never run under this lock, so a poisoned guard still
        // holds consistent bookkeeping.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.id),
        }
    }
}

impl fmt::Debug for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Inbox")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("pending", &state.queue.len())
            .field("running", &state.running)
            .finish()
    }
}

/// Returns the inbox to idle if an operation unwinds out of a drain.
struct Release<'a> {
    inbox: &'a Inbox,
    armed: bool,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inbox.lock();
        state.running = false;
        tracing::error!(
            inbox = %self.inbox,
            orphaned = state.queue.len(),
            "operation panicked during drain; inbox released"
        );
    }
}
