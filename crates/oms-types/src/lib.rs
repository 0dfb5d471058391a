//! Shared Domain Types for Sumano OMS
//!
//! The operations core tracks clients, projects, and the documents that
//! formalize project milestones. This crate holds the types every other
//! crate agrees on:
//!
//! - **Identifiers**: UUID-backed newtypes, one per entity kind.
//! - **Actor / RoleTag**: the acting user as resolved by the identity
//!   layer. Role resolution is a closed enum, checked exhaustively —
//!   there is no stringly-typed role codename anywhere in the core.
//! - **Project / ProjectStatus**: the project record and its 9-state
//!   lifecycle enum. Status and progress are only ever mutated through
//!   `oms-lifecycle`.
//! - **Timestamps**: an explicit created/updated value type embedded in
//!   each entity instead of inherited base-class fields.

#![deny(unsafe_code)]

mod actor;
mod ids;
mod project;
mod timestamps;

pub use actor::*;
pub use ids::*;
pub use project::*;
pub use timestamps::*;
