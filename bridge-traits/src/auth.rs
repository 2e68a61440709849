//! Session identity abstraction
//!
//! The host's authentication layer owns login flows; the core only needs to
//! know which user a call is made on behalf of.

/// Provides the login of the user behind the current call.
///
/// Returning `None` means the call is anonymous. Services that key data by
/// user (favourites) reject anonymous calls.
pub trait SessionContext: Send + Sync {
    fn current_user_login(&self) -> Option<String>;
}

/// Fixed identity, for single-user hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    login: Option<String>,
}

impl StaticSession {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { login: None }
    }
}

impl SessionContext for StaticSession {
    fn current_user_login(&self) -> Option<String> {
        self.login.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_session() {
        assert_eq!(
            StaticSession::new("alice").current_user_login(),
            Some("alice".to_string())
        );
        assert_eq!(StaticSession::anonymous().current_user_login(), None);
    }
}
