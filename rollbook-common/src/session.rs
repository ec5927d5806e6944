//! Explicit session context.
//!
//! Pages receive the signed-in user as a value at construction time. Login and
//! logout belong to whoever owns the session; this crate only reads it.

use serde::{Deserialize, Serialize};

/// Staff roles known to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Principal,
    SchoolAdmin,
    Supervisor,
    StudentSupervisor,
    Teacher,
}

/// The signed-in user as seen by page composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<i64>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionContext {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_school(mut self, school_id: i64) -> Self {
        self.school_id = Some(school_id);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_principal(&self) -> bool {
        self.has_role(Role::Principal)
    }

    pub fn is_school_admin(&self) -> bool {
        self.has_role(Role::SchoolAdmin)
    }

    pub fn is_supervisor(&self) -> bool {
        self.has_role(Role::Supervisor)
    }

    pub fn is_student_supervisor(&self) -> bool {
        self.has_role(Role::StudentSupervisor)
    }

    pub fn is_teacher(&self) -> bool {
        self.has_role(Role::Teacher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_predicates() {
        let session = SessionContext::anonymous()
            .with_user("u-1")
            .with_school(4)
            .with_role(Role::Supervisor)
            .with_role(Role::Supervisor);
        assert!(session.is_supervisor());
        assert!(!session.is_admin());
        assert_eq!(session.roles.len(), 1);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn roles_serialize_screaming_snake() {
        let json = serde_json::to_string(&Role::StudentSupervisor).unwrap();
        assert_eq!(json, "\"STUDENT_SUPERVISOR\"");
    }
}
