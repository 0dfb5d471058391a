//! Project Lifecycle for Sumano OMS
//!
//! A project's status moves along a fixed allowed-edge graph of 9 states,
//! with a status→progress mapping and an append-only audit trail. The
//! rules:
//!
//! 1. Every transition is validated against the adjacency table before any
//!    mutation; a failed validation leaves status, progress, and the audit
//!    log untouched.
//! 2. Each successful transition writes exactly one [`StatusTransition`]
//!    audit row. Rows are never mutated or deleted.
//! 3. `on_hold` freezes progress: the mapped value is only applied for
//!    statuses that define one.
//!
//! A second, independent progress signal — [`calculate_progress`] — blends
//! phase completion with document completion. It is informational and never
//! feeds back into status; the two signals must not be conflated.

#![deny(unsafe_code)]

mod errors;
mod progress;
mod transitions;

pub use errors::*;
pub use progress::*;
pub use transitions::*;
