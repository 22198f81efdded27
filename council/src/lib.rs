//! Six-agent council orchestration engine.
//!
//! This crate implements a deliberation model where a fixed roster of six
//! specialist agents on a hexagonal ring turns work briefings into deployed
//! task assignments through a strictly ordered convening ceremony. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (routing, redistribution, the
//!   ceremony state machine, admission checks, the diligence ledger). No I/O,
//!   fully testable in isolation; time always arrives as an argument.
//! - **[`io`]**: Side-effecting operations (config, briefing, state, and
//!   ledger files). Isolated to enable tempdir-backed tests.
//!
//! The orchestration module ([`convening`]) coordinates core logic with I/O
//! to implement CLI commands.

pub mod convening;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
