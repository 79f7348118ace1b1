use proc_macro::TokenStream;

mod actor;
mod common;

/// Derives `baton::Actor` for a struct that embeds a `baton::Inbox`.
///
/// The inbox field is found, in order of preference, from:
///
/// 1. a struct attribute naming it: `#[actor(inbox = "mailbox")]`
///    (a tuple index such as `"0"` also works),
/// 2. a field marked `#[inbox]`,
/// 3. the only field whose type is spelled `Inbox` (or `baton::Inbox`).
///
/// ```ignore
/// use baton::{Actor, Inbox};
///
/// #[derive(Actor)]
/// struct Printer {
///     inbox: Inbox,
/// }
///
/// #[derive(Actor)]
/// #[actor(inbox = "mailbox")]
/// struct Logger {
///     mailbox: Inbox,
///     lines: usize,
/// }
///
/// #[derive(Actor)]
/// struct Relay<T: Send + Sync>(T, #[inbox] baton::Inbox);
/// ```
///
/// Enums, unions, and structs with no or several candidate fields are
/// rejected at compile time.
#[proc_macro_derive(Actor, attributes(actor, inbox))]
pub fn derive_actor(input: TokenStream) -> TokenStream {
    actor::derive_actor_impl(input)
}
