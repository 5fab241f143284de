//! Session provider seam
//!
//! Authentication lives outside this subsystem; services only need to
//! know who, if anyone, is signed in. Operations requiring a user surface
//! [`ErrorCode::NotAuthenticated`](shared::ErrorCode::NotAuthenticated) as
//! a distinct signal so callers can redirect to sign-in instead of showing
//! a generic error.

use shared::{AppError, AppResult};

/// The signed-in user as reported by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }
}

/// Access to the ambient authentication state
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<CurrentUser>;

    /// Current user or `NotAuthenticated`
    fn require_user(&self) -> AppResult<CurrentUser> {
        self.current_user().ok_or_else(AppError::not_authenticated)
    }
}

/// Fixed session, for tests and single-user embeddings
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<CurrentUser>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user: Some(CurrentUser::new(user_id)),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_require_user_signed_in() {
        let session = StaticSession::signed_in("u1");
        assert_eq!(session.require_user().unwrap().id, "u1");
    }

    #[test]
    fn test_require_user_signed_out() {
        let session = StaticSession::signed_out();
        let err = session.require_user().unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }
}
