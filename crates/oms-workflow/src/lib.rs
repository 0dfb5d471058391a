//! Workflow Overlays for Sumano OMS
//!
//! Three specialized workflows formalize project milestones, each layering
//! structured status/signature/checklist semantics atop a generic
//! [`oms_document::DocumentInstance`] payload:
//!
//! - **ChangeRequest**: formal change authorization during an active
//!   project. Two-party signing, impact assessment gate, client decision.
//! - **PilotAcceptance**: client acceptance of a delivered pilot. At most
//!   one per project. Flat 12-item checklist, two-party signing.
//! - **PilotHandover**: internal handover of a completed pilot. Sectioned
//!   25-item checklist with an 80% review gate, single team-lead signature.
//!
//! Shared mechanics live in [`signatures`] (role-resolved, monotonic
//! signature slots) and [`checklist`] (closed key sets, per-workflow
//! completion policies). The [`WorkflowStore`] facade owns the records and
//! enforces cardinality.
//!
//! Payload shape is a wire contract: the top-level `filled_data` keys in
//! [`sections`] must not be renamed — stored documents depend on them.

#![deny(unsafe_code)]

mod acceptance;
mod change_request;
mod errors;
mod handover;
mod payload;
mod status;
mod store;

pub mod checklist;
pub mod signatures;

pub use acceptance::*;
pub use change_request::*;
pub use checklist::*;
pub use errors::*;
pub use handover::*;
pub use payload::*;
pub use signatures::*;
pub use status::*;
pub use store::*;
