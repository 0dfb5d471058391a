//! Document Pipeline for Sumano OMS
//!
//! Every formal document in the system — intake forms, acceptance
//! certificates, change authorizations, handover packets — flows through
//! the same template→instance pipeline:
//!
//! - **DocumentTemplate / TemplateRegistry**: named, versioned blueprints
//!   declaring required/optional fields and a renderable body. Only
//!   `PUBLISHED` templates are usable for generation.
//! - **DocumentEngine**: validates data against a template, invokes the
//!   renderer, persists the artifact, and wraps the result in a
//!   `DocumentInstance`.
//! - **DocumentInstance**: one generated document, carrying the data used
//!   (`filled_data`), the rendered artifact, and signing state.
//! - **Renderer / ArtifactStore**: the seams to the external PDF engine
//!   and blob storage. In-process implementations are provided for tests
//!   and local use.
//! - **AuditSink**: fire-and-forget structured events (document generated,
//!   document stored). Sink behavior never affects pipeline results.
//!
//! Workflow overlays in `oms-workflow` build on this crate by writing
//! structured sub-sections into `filled_data`.

#![deny(unsafe_code)]

mod audit;
mod engine;
mod errors;
mod instance;
mod registry;
mod render;
mod store;
mod template;

pub use audit::*;
pub use engine::*;
pub use errors::*;
pub use instance::*;
pub use registry::*;
pub use render::*;
pub use store::*;
pub use template::*;
