//! UUID-backed identifier newtypes

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifies a project.
    ProjectId
);
entity_id!(
    /// Identifies a document template.
    TemplateId
);
entity_id!(
    /// Identifies a generated document instance.
    DocumentId
);
entity_id!(
    /// Identifies a user account.
    UserId
);
entity_id!(
    /// Identifies a workflow record (change request, acceptance, handover).
    WorkflowId
);
entity_id!(
    /// Identifies a project status transition audit row.
    TransitionId
);
