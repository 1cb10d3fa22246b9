use log::{info, warn};
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub token: String,
}

/// Gatekeeper for the admin screen.
pub trait Authenticator: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<AdminSession, AuthError>;
    fn validate(&self, token: &str) -> bool;
    fn revoke(&self, token: &str);
}

/// Checks logins against admin credentials supplied by configuration and
/// hands out random session tokens. Without configured credentials nobody
/// can log in.
pub struct ConfiguredAuthenticator {
    admin: Option<Credentials>,
    tokens: Mutex<HashSet<String>>,
}

impl ConfiguredAuthenticator {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        let admin = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => {
                warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, admin login is disabled");
                None
            }
        };
        Self {
            admin,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Compares without bailing out on the first differing byte.
fn same_secret(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl Authenticator for ConfiguredAuthenticator {
    fn login(&self, credentials: &Credentials) -> Result<AdminSession, AuthError> {
        let admin = self.admin.as_ref().ok_or(AuthError::NotConfigured)?;
        let user_ok = same_secret(&credentials.username, &admin.username);
        let pass_ok = same_secret(&credentials.password, &admin.password);
        if !(user_ok && pass_ok) {
            warn!("Rejected admin login for '{}'", credentials.username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        self.tokens().insert(token.clone());
        info!("Admin '{}' logged in", credentials.username);
        Ok(AdminSession { token })
    }

    fn validate(&self, token: &str) -> bool {
        self.tokens().contains(token)
    }

    fn revoke(&self, token: &str) {
        self.tokens().remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn authenticator() -> ConfiguredAuthenticator {
        ConfiguredAuthenticator::new(Some("librarian".to_string()), Some("s3cret".to_string()))
    }

    #[test]
    fn valid_login_issues_a_token() {
        let auth = authenticator();
        let session = auth.login(&creds("librarian", "s3cret")).unwrap();
        assert!(auth.validate(&session.token));

        auth.revoke(&session.token);
        assert!(!auth.validate(&session.token));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = authenticator();
        assert_eq!(
            auth.login(&creds("librarian", "guess")),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(auth.login(&creds("admin", "admin")), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn unconfigured_admin_cannot_log_in() {
        let auth = ConfiguredAuthenticator::new(None, Some("s3cret".to_string()));
        assert_eq!(auth.login(&creds("", "s3cret")), Err(AuthError::NotConfigured));
    }

    #[test]
    fn unknown_tokens_are_invalid() {
        assert!(!authenticator().validate("not-a-token"));
    }
}
