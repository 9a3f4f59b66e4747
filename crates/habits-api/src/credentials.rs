use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use anyhow::anyhow;
use tracing::info;
use uuid::Uuid;

use habits_db::{Database, InsertOutcome};
use habits_types::models::User;

use crate::error::AppError;
use crate::rows::user_from_row;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=128;

/// Well-formed Argon2id hash with default cost parameters that matches no
/// password. Verified against when the username is unknown.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Ozp34lpNNvYWC9/orkhbrg$AHPoA9HkxU6VtR1TGMgwFsgEGpidrx3xE0940gMVyFk";

/// Registers and authenticates users against the `users` table.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Argon2id digest with a fresh random salt, as a PHC string.
    pub fn hash_password(&self, plaintext: &str) -> Result<String, AppError> {
        hash_password(plaintext)
    }

    pub fn check_password(&self, hash: &str, plaintext: &str) -> Result<(), AppError> {
        check_password(hash, plaintext)
    }

    pub fn register(&self, username: &str, plaintext: &str) -> Result<Uuid, AppError> {
        let username = username.trim();
        if !USERNAME_LEN.contains(&username.chars().count()) {
            return Err(AppError::validation("Username must be 3 to 32 characters"));
        }
        if !PASSWORD_LEN.contains(&plaintext.chars().count()) {
            return Err(AppError::validation("Password must be 6 to 128 characters"));
        }

        let password_hash = hash_password(plaintext)?;
        let user_id = Uuid::new_v4();

        match self.db.create_user(&user_id.to_string(), username, &password_hash)? {
            InsertOutcome::Inserted => {
                info!("Registered user {} ({})", username, user_id);
                Ok(user_id)
            }
            InsertOutcome::Duplicate => Err(AppError::Conflict("Username taken".into())),
        }
    }

    /// Unknown usernames and wrong passwords fail identically, and both pay
    /// for one Argon2 verification.
    pub fn authenticate(&self, username: &str, plaintext: &str) -> Result<User, AppError> {
        let Some(row) = self.db.get_user_by_username(username.trim())? else {
            let _ = check_password(DUMMY_HASH, plaintext);
            return Err(AppError::Authentication);
        };

        check_password(&row.password_hash, plaintext)?;
        Ok(user_from_row(row)?)
    }
}

fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

fn check_password(hash: &str, plaintext: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("stored hash unreadable: {e}"))?;
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .map_err(|_| AppError::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let store = store();
        let a = store.hash_password("testpassword123").unwrap();
        let b = store.hash_password("testpassword123").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("testpassword123"));

        store.check_password(&a, "testpassword123").unwrap();
        store.check_password(&b, "testpassword123").unwrap();
        assert!(matches!(
            store.check_password(&a, "wrongpassword"),
            Err(AppError::Authentication)
        ));
    }

    #[test]
    fn register_then_authenticate() {
        let store = store();
        let id = store.register("alice", "secret1").unwrap();

        let user = store.authenticate("alice", "secret1").unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn duplicate_registration_conflicts_and_keeps_first() {
        let store = store();
        store.register("testuser", "password123").unwrap();

        let err = store.register("testuser", "otherpass").unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Username taken"));

        store.authenticate("testuser", "password123").unwrap();
        assert!(store.authenticate("testuser", "otherpass").is_err());
    }

    #[test]
    fn bad_credentials_are_indistinguishable() {
        let store = store();
        store.register("authuser", "authpassword").unwrap();

        let wrong_password = store.authenticate("authuser", "wrongpassword").unwrap_err();
        let unknown_user = store.authenticate("nonexistent", "authpassword").unwrap_err();
        assert!(matches!(wrong_password, AppError::Authentication));
        assert!(matches!(unknown_user, AppError::Authentication));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        let parsed = PasswordHash::new(DUMMY_HASH).unwrap();
        let params = argon2::Params::try_from(&parsed).unwrap();
        let defaults = argon2::Params::default();
        assert_eq!(
            (params.m_cost(), params.t_cost(), params.p_cost()),
            (defaults.m_cost(), defaults.t_cost(), defaults.p_cost())
        );
        assert!(matches!(
            check_password(DUMMY_HASH, "not-a-real-password"),
            Err(AppError::Authentication)
        ));
    }

    #[test]
    fn register_validates_input() {
        let store = store();
        assert!(matches!(store.register("ab", "password123"), Err(AppError::Validation(_))));
        assert!(matches!(store.register("carol", "short"), Err(AppError::Validation(_))));
        assert!(matches!(store.register("   ", "password123"), Err(AppError::Validation(_))));
    }
}
