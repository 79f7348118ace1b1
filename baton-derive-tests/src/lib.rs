//! Test-only crate for `#[derive(Actor)]`; see `tests/`.
