//! Acting users and resolved roles
//!
//! The identity/RBAC layer sits above this core. By the time a request
//! reaches a workflow operation the caller's role has been resolved to a
//! `RoleTag`; this core never inspects credentials or permission sets.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of roles the core distinguishes.
///
/// Anything finer-grained (per-endpoint permissions, client scoping) is the
/// authorization layer's problem; signature slot resolution and eligibility
/// checks only need these three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    /// A client-side contact (school representative, client signer).
    ClientContact,
    /// A provider-side staff member.
    Staff,
    /// A provider-side administrator. Treated as staff everywhere.
    Superadmin,
}

impl RoleTag {
    /// Whether this role counts as provider staff.
    pub fn is_staff(self) -> bool {
        matches!(self, RoleTag::Staff | RoleTag::Superadmin)
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoleTag::ClientContact => "client_contact",
            RoleTag::Staff => "staff",
            RoleTag::Superadmin => "superadmin",
        };
        f.write_str(s)
    }
}

/// The acting user, as seen by this core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub username: String,
    pub role: RoleTag,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: RoleTag) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            role,
        }
    }
}
