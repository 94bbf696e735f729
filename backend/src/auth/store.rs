//! In-memory user registry.
//!
//! Accounts live for the lifetime of the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::credentials::{
    hash_password, normalize_email, validate_cu_id, validate_email, validate_password,
    verify_password,
};
use crate::error::{AuthError, AuthResult};

/// A registered staff member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub cu_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a registration form. Absent fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub cu_id: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Default)]
struct Users {
    /// cu_id -> user
    by_cu_id: HashMap<String, User>,
    /// normalized email -> cu_id
    by_email: HashMap<String, String>,
}

/// Registry of users keyed by CU ID and email.
#[derive(Default)]
pub struct UserStore {
    users: RwLock<Users>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a registration and store the new user.
    pub fn register(&self, form: &Registration) -> AuthResult<User> {
        let cu_id = form.cu_id.trim();
        let email = normalize_email(&form.email);

        if cu_id.is_empty() {
            return Err(AuthError::MissingField("cuId"));
        }
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if form.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if form.confirm_password.is_empty() {
            return Err(AuthError::MissingField("confirmPassword"));
        }
        validate_cu_id(cu_id)?;
        validate_email(&email)?;
        validate_password(&form.password)?;
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        // Hash before taking the write lock
        let password_hash = hash_password(&form.password)?;

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.by_cu_id.contains_key(cu_id) {
            return Err(AuthError::CuIdTaken(cu_id.to_string()));
        }
        if users.by_email.contains_key(&email) {
            return Err(AuthError::EmailTaken);
        }

        let user = User {
            cu_id: cu_id.to_string(),
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        users.by_email.insert(email, user.cu_id.clone());
        users.by_cu_id.insert(user.cu_id.clone(), user.clone());

        Ok(user)
    }

    /// Check an email/password pair.
    pub fn authenticate(&self, email: &str, password: &str) -> AuthResult<User> {
        let user = self
            .find_by_email(email)
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users
            .by_email
            .get(&normalize_email(email))
            .and_then(|cu_id| users.by_cu_id.get(cu_id))
            .cloned()
    }

    pub fn get(&self, cu_id: &str) -> Option<User> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.by_cu_id.get(cu_id).cloned()
    }

    pub fn len(&self) -> usize {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.by_cu_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
