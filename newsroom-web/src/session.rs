//! Cookie-token sessions and password hashing.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use newsroom_core::{NewsroomError, Result};

pub const SESSION_COOKIE: &str = "newsroom_session";

/// In-process session store: opaque token -> user id. Sessions do not
/// survive a restart; readers just log in again.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Uuid>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(token.clone(), user_id);
        token
    }

    pub fn user_id(&self, token: &str) -> Option<Uuid> {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .get(token)
            .copied()
    }

    pub fn destroy(&self, token: &str) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(token);
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| NewsroomError::Validation(format!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Pull one cookie value out of a `Cookie:` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_resolve_until_destroyed() {
        let store = SessionStore::new();
        let user_id = Uuid::new_v4();
        let token = store.create(user_id);
        assert_eq!(store.user_id(&token), Some(user_id));
        store.destroy(&token);
        assert_eq!(store.user_id(&token), None);
    }

    #[test]
    fn password_verification_round_trips() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "!"));
    }

    #[test]
    fn cookie_values_are_extracted() {
        let header = "theme=dark; newsroom_session=abc123; other=1";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(header, "missing"), None);
    }
}
