//! Accounts and sessions.
//!
//! Identity is checked before an upload reaches the pipeline; the
//! transformation itself knows nothing about users.

pub mod credentials;
pub mod session;
pub mod store;

use chrono::Duration;

pub use credentials::{hash_password, validate_cu_id, validate_email, validate_password, verify_password};
pub use session::{Session, SessionStore, DEFAULT_SESSION_HOURS};
pub use store::{Registration, User, UserStore};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{AuthError, AuthResult};

/// Users and their sessions.
pub struct Accounts {
    users: UserStore,
    sessions: SessionStore,
}

impl Accounts {
    pub fn new(session_lifetime: Duration) -> Self {
        Self {
            users: UserStore::new(),
            sessions: SessionStore::new(session_lifetime),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn register(&self, form: &Registration) -> AuthResult<User> {
        match self.users.register(form) {
            Ok(user) => {
                log_success(format!("Registered {}", user.cu_id));
                Ok(user)
            }
            Err(e) => {
                log_warning(format!("Registration rejected: {}", e));
                Err(e)
            }
        }
    }

    /// Check credentials and open a session.
    pub fn login(&self, email: &str, password: &str) -> AuthResult<(User, Session)> {
        let user = self.users.authenticate(email, password).map_err(|e| {
            log_warning("Login failed");
            e
        })?;
        let purged = self.sessions.purge_expired();
        if purged > 0 {
            log_info(format!("Purged {} expired session(s)", purged));
        }
        let session = self.sessions.create(&user.cu_id);
        log_success(format!("{} logged in", user.cu_id));
        Ok((user, session))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token)
    }

    /// The user behind a session token.
    pub fn current_user(&self, token: &str) -> AuthResult<User> {
        let session = self.sessions.validate(token).ok_or(AuthError::Unauthorized)?;
        self.users.get(&session.cu_id).ok_or(AuthError::Unauthorized)
    }
}

impl Default for Accounts {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            cu_id: "CU12345".into(),
            email: "jane@chreso.edu".into(),
            password: "Abc12".into(),
            confirm_password: "Abc12".into(),
        }
    }

    #[test]
    fn test_register_login_logout() {
        let accounts = Accounts::default();
        accounts.register(&registration()).unwrap();

        let (user, session) = accounts.login("jane@chreso.edu", "Abc12").unwrap();
        assert_eq!(user.cu_id, "CU12345");
        assert_eq!(accounts.current_user(&session.token).unwrap().cu_id, "CU12345");

        assert!(accounts.logout(&session.token));
        assert!(matches!(
            accounts.current_user(&session.token),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_login() {
        let accounts = Accounts::new(Duration::seconds(-1));
        accounts.register(&registration()).unwrap();

        let (_, session) = accounts.login("jane@chreso.edu", "Abc12").unwrap();
        assert!(accounts.current_user(&session.token).is_err());
    }
}
