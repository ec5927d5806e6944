//! Choosing a row source by who is signed in.

use std::sync::Arc;

use async_trait::async_trait;
use rollbook_common::{ApiError, Record, SessionContext};
use rollbook_table::{QueryApi, QueryParams};
use tracing::debug;

/// Which rows a session may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Rows the user is responsible for
    User,
    /// Rows of the user's school
    School,
    All,
}

impl Scope {
    /// Supervisors within a school see their own rows, other school-bound
    /// staff see the school's rows, everyone else sees everything.
    pub fn for_session(session: &SessionContext) -> Self {
        match (session.school_id, session.user_id.as_ref()) {
            (Some(_), Some(_)) if session.is_supervisor() => Scope::User,
            (Some(_), _) => Scope::School,
            (None, _) => Scope::All,
        }
    }
}

/// A [`QueryApi`] that delegates to a per-scope source.
///
/// A scope without its own source falls back to the next wider one.
pub struct RoleScopedQuery {
    session: SessionContext,
    all: Arc<dyn QueryApi>,
    school: Option<Arc<dyn QueryApi>>,
    user: Option<Arc<dyn QueryApi>>,
}

impl RoleScopedQuery {
    pub fn new(session: SessionContext, all: Arc<dyn QueryApi>) -> Self {
        Self {
            session,
            all,
            school: None,
            user: None,
        }
    }

    pub fn for_school(mut self, source: Arc<dyn QueryApi>) -> Self {
        self.school = Some(source);
        self
    }

    pub fn for_user(mut self, source: Arc<dyn QueryApi>) -> Self {
        self.user = Some(source);
        self
    }

    pub fn scope(&self) -> Scope {
        Scope::for_session(&self.session)
    }

    pub fn source(&self) -> &Arc<dyn QueryApi> {
        let user = self.user.as_ref().filter(|_| self.scope() == Scope::User);
        let school = self
            .school
            .as_ref()
            .filter(|_| matches!(self.scope(), Scope::User | Scope::School));
        user.or(school).unwrap_or(&self.all)
    }
}

#[async_trait]
impl QueryApi for RoleScopedQuery {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        debug!(scope = ?self.scope(), "scoped query");
        self.source().query(params).await
    }
}
