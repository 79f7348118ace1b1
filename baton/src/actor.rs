use std::sync::Arc;

use crate::handoff::Delivery;
use crate::inbox::Inbox;
use crate::probe::Probe;

/// Anything that owns an [`Inbox`].
///
/// Actors are plain structs that embed an inbox and expose it here; all
/// access to the rest of the struct's state should go through operations
/// sent to that inbox. `#[derive(Actor)]` writes this impl for you.
///
/// ```rust
/// use baton::{Actor, ActorExt, Inbox};
///
/// #[derive(Actor)]
/// struct Printer {
///     inbox: Inbox,
/// }
///
/// let printer = Printer { inbox: Inbox::new() };
/// printer.act_external(|| println!("hello"));
/// ```
pub trait Actor: Send + Sync {
    fn inbox(&self) -> &Inbox;
}

impl Actor for Inbox {
    fn inbox(&self) -> &Inbox {
        self
    }
}

impl<A: Actor + ?Sized> Actor for Arc<A> {
    fn inbox(&self) -> &Inbox {
        (**self).inbox()
    }
}

impl<A: Actor + ?Sized> Actor for &A {
    fn inbox(&self) -> &Inbox {
        (**self).inbox()
    }
}

/// Sending helpers available on every [`Actor`].
pub trait ActorExt: Actor {
    /// Sends `op` to this actor on behalf of `from`. Pass the calling actor
    /// when sending from inside one of its operations so an idle target can
    /// be drained inline; pass `None` from outside the actor system.
    fn act<F>(&self, from: Option<&dyn Actor>, op: F) -> Delivery
    where
        F: FnOnce() + Send + 'static,
    {
        self.inbox().enqueue(from, op)
    }

    /// Sends `op` with no sender, for bootstrapping, timers and callbacks.
    fn act_external<F>(&self, op: F) -> Delivery
    where
        F: FnOnce() + Send + 'static,
    {
        self.inbox().enqueue_external(op)
    }

    /// Sends `op` and returns a [`Probe`] for its completion. Only for
    /// non-actor callers.
    fn sync_exec<F, R>(&self, op: F) -> Probe<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.inbox().sync_exec(op)
    }
}

impl<A: Actor + ?Sized> ActorExt for A {}
