//! Actors without dedicated threads or tasks.
//!
//! Every actor owns an [`Inbox`]: a FIFO of pending operations and a flag
//! saying whether someone is draining it. Sending to an idle inbox makes the
//! sender's own thread drain it on the spot; sending to a busy one only
//! appends. An actor sending to another idle actor from inside one of its
//! operations therefore turns the message into a nested function call,
//! while per-inbox ordering and single-drainer exclusivity still hold.
//!
//! ```rust
//! use std::sync::Arc;
//! use baton::{Actor, ActorCell, ActorExt, Inbox};
//!
//! #[derive(Actor)]
//! struct Counter {
//!     inbox: Inbox,
//!     count: ActorCell<u32>,
//! }
//!
//! let inbox = Inbox::new();
//! let count = ActorCell::new(&inbox, 0);
//! let counter = Arc::new(Counter { inbox, count });
//!
//! for _ in 0..10 {
//!     let c = counter.clone();
//!     counter.act_external(move || c.count.with(|n| *n += 1));
//! }
//!
//! let c = counter.clone();
//! let seen = counter.sync_exec(move || c.count.with(|n| *n)).wait();
//! assert_eq!(seen, Ok(10));
//! ```

extern crate self as baton;

pub mod actor;
pub mod cell;
pub mod config;
pub mod error;
pub mod handoff;
pub mod inbox;
pub mod logging;
pub mod probe;

pub use actor::{Actor, ActorExt};
pub use baton_derive::Actor;
pub use cell::ActorCell;
pub use config::InboxConfig;
pub use error::{ConfigError, ProbeError};
pub use handoff::Delivery;
pub use inbox::{Inbox, InboxId, Operation};
pub use probe::{block, Probe};
