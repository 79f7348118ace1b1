use std::fmt;
use std::sync::{Mutex, PoisonError, TryLockError};

use crate::handoff;
use crate::inbox::{Inbox, InboxId};

/// State that belongs to one inbox.
///
/// [`with`](Self::with) only hands out the value to code running inside an
/// operation of the owning inbox, which is the only place actor state may be
/// touched. Because at most one drain of an inbox is active at a time the
/// inner lock is never contended; it exists to make the type `Sync` and to
/// catch reentrant borrows.
///
/// ```rust
/// use std::sync::Arc;
/// use baton::{Actor, ActorCell, ActorExt, Inbox};
///
/// #[derive(Actor)]
/// struct Counter {
///     inbox: Inbox,
///     count: ActorCell<u64>,
/// }
///
/// let inbox = Inbox::new();
/// let count = ActorCell::new(&inbox, 0);
/// let counter = Arc::new(Counter { inbox, count });
///
/// let c = counter.clone();
/// counter.act_external(move || c.count.with(|n| *n += 1));
/// let c = counter.clone();
/// assert_eq!(baton::block(&*counter, move || c.count.with(|n| *n)), Ok(1));
/// ```
pub struct ActorCell<T> {
    owner: InboxId,
    value: Mutex<T>,
}

impl<T> ActorCell<T> {
    pub fn new(owner: &Inbox, value: T) -> Self {
        Self {
            owner: owner.id(),
            value: Mutex::new(value),
        }
    }

    pub fn owner(&self) -> InboxId {
        self.owner
    }

    /// Runs `f` with exclusive access to the value.
    ///
    /// # Panics
    ///
    /// If the calling code is not an operation of the owning inbox, or if the
    /// value is already borrowed further up the same stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        assert!(
            handoff::is_current(self.owner),
            "actor state of inbox {} accessed outside its own operations",
            self.owner
        );
        let mut value = match self.value.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                panic!("actor state of inbox {} borrowed reentrantly", self.owner)
            }
        };
        f(&mut value)
    }

    /// Direct access; holding `&mut self` already rules out any drain.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for ActorCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
