//! Stable exit codes for council CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid input, state, or phase order.
pub const INVALID: i32 = 1;
/// `council deliberate` ended in a wellness veto.
pub const VETOED: i32 = 2;
/// A sovereign-territory violation was refused.
pub const PROTECTED: i32 = 3;
