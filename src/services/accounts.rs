//! Account Registration
//!
//! One-table user registration with salted PBKDF2 password hashes. An
//! optional idea prompt given at sign-up is queued in the prompts table.

use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine};
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::{params, OptionalExtension};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::request::RegisterRequest;
use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_SIZE: usize = 16;
const HASH_SIZE: usize = 32;
const HASH_SCHEME: &str = "pbkdf2-sha256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created { user_id: String },
    AlreadyExists,
}

/// Hash a password as `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut derived = [0u8; HASH_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut derived);
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        PBKDF2_ITERATIONS,
        BASE64.encode(salt),
        BASE64.encode(derived)
    )
}

#[derive(Clone, Debug)]
pub struct AccountService {
    db: Database,
}

impl AccountService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn register(&self, request: RegisterRequest) -> AppResult<Registration> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        if !request.email.contains('@') {
            return Err(AppError::validation("a valid email is required"));
        }
        if request.password.is_empty() {
            return Err(AppError::validation("password is required"));
        }

        let mut conn = self.db.get_connection()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![request.email],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            tracing::info!("registration rejected, email already registered");
            return Ok(Registration::AlreadyExists);
        }

        let user_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                request.name,
                request.email,
                hash_password(&request.password),
                now
            ],
        );
        match inserted {
            Ok(_) => {}
            // lost a race with a concurrent sign-up for the same email
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Ok(Registration::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(prompt) = request.prompt.filter(|p| !p.trim().is_empty()) {
            tx.execute(
                "INSERT INTO prompts (user_id, prompt, status, created_at)
                 VALUES (?1, ?2, 'pending', ?3)",
                params![user_id, prompt, now],
            )?;
        }
        tx.commit()?;

        tracing::info!(user_id = %user_id, "user registered");
        Ok(Registration::Created { user_id })
    }
}
