//! Deterministic, pure logic shared by the council engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests; the
//! current time always arrives as an argument, never from a global clock.

pub mod admission;
pub mod ceremony;
pub mod clock;
pub mod guard;
pub mod invariants;
pub mod ledger;
pub mod redistribute;
pub mod registry;
pub mod router;
pub mod types;
