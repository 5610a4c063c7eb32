//! Boundary to the authentication provider.
//!
//! The orchestrator only needs to know whether someone is signed in and to
//! hand an opaque user context to the profile view.

use std::sync::RwLock;

/// Opaque description of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn(UserContext),
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn(_))
    }

    pub fn user(&self) -> Option<&UserContext> {
        match self {
            Session::SignedIn(user) => Some(user),
            Session::SignedOut => None,
        }
    }
}

impl From<Option<String>> for Session {
    fn from(user: Option<String>) -> Self {
        match user {
            Some(id) if !id.trim().is_empty() => Session::SignedIn(UserContext::new(id)),
            _ => Session::SignedOut,
        }
    }
}

/// Source of the current session
pub trait AuthProvider: Send + Sync {
    fn session(&self) -> Session;

    fn sign_in(&self, user: UserContext);

    fn sign_out(&self);
}

/// In-memory provider holding a single session
#[derive(Debug, Default)]
pub struct StaticAuth {
    session: RwLock<Session>,
}

impl StaticAuth {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn session(&self) -> Session {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn sign_in(&self, user: UserContext) {
        let mut guard = match self.session.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Session::SignedIn(user);
    }

    fn sign_out(&self) {
        let mut guard = match self.session.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Session::SignedOut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_signed_out() {
        let auth = StaticAuth::default();
        assert!(!auth.session().is_signed_in());
        assert!(auth.session().user().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let auth = StaticAuth::default();
        auth.sign_in(UserContext::new("u-42").with_display_name("Alice"));

        let session = auth.session();
        assert!(session.is_signed_in());
        assert_eq!(session.user().map(UserContext::label), Some("Alice"));

        auth.sign_out();
        assert_eq!(auth.session(), Session::SignedOut);
    }

    #[test]
    fn test_session_from_configured_user() {
        assert!(Session::from(Some("bob".to_string())).is_signed_in());
        assert!(!Session::from(Some("  ".to_string())).is_signed_in());
        assert!(!Session::from(None).is_signed_in());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        assert_eq!(UserContext::new("u-1").label(), "u-1");
    }
}
