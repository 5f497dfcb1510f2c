//! Role gate
//!
//! Roles form a closed set and every permission is listed in one table.
//! A role name outside the set never parses, so it can never be authorized.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ClaimError;

/// Caller roles recognized by the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Lecturer,
    Coordinator,
    Manager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Lecturer, Role::Coordinator, Role::Manager];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Lecturer => "Lecturer",
            Role::Coordinator => "Coordinator",
            Role::Manager => "Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role name is not one of [`Role::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Operations a caller may invoke on claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Submit,
    Verify,
    Approve,
    Reject,
    View,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Submit,
        Action::Verify,
        Action::Approve,
        Action::Reject,
        Action::View,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::Submit => "submit",
            Action::Verify => "verify",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::View => "view",
        };
        f.write_str(verb)
    }
}

/// An authenticated caller: who they are and the role they act in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity, the lecturer email for lecturers
    pub identity: String,
    pub role: Role,
}

impl Caller {
    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    pub fn lecturer(email: impl Into<String>) -> Self {
        Self::new(email, Role::Lecturer)
    }

    pub fn coordinator(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Coordinator)
    }

    pub fn manager(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Manager)
    }
}

/// Permission table
///
/// | Action  | Lecturer | Coordinator | Manager |
/// |---------|----------|-------------|---------|
/// | Submit  | yes      | no          | no      |
/// | Verify  | no       | yes         | no      |
/// | Approve | no       | no          | yes     |
/// | Reject  | no       | yes         | yes     |
/// | View    | own only | yes         | yes     |
pub fn authorize(role: Role, action: Action) -> bool {
    use Action::*;
    use Role::*;
    matches!(
        (role, action),
        (Lecturer, Submit) |
        (Coordinator, Verify) |
        (Manager, Approve) |
        (Coordinator, Reject) |
        (Manager, Reject) |
        (_, View)
    )
}

/// Fails with `ClaimError::Unauthorized` unless the caller's role allows `action`
pub fn ensure_authorized(caller: &Caller, action: Action) -> Result<(), ClaimError> {
    if authorize(caller.role, action) {
        Ok(())
    } else {
        tracing::warn!(caller = %caller.identity, role = %caller.role, %action, "Action denied by role gate");
        Err(ClaimError::Unauthorized {
            role: caller.role,
            action,
        })
    }
}
