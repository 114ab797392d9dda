//! User Storage
//! Mission: Store user accounts in SQLite and serve credential lookups for login

use crate::auth::models::{Credential, Identity, User};
use anyhow::{Context, Result};
use bcrypt::hash;
use chrono::Utc;
use rusqlite::{params, types::Type, Connection, ErrorCode, Row};
use tracing::info;
use uuid::Uuid;

/// Read-only credential lookup used by the login flow.
///
/// Implemented by [`UserStore`]; tests plug in an in-memory map.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<Credential>>;
}

/// Why a user could not be created
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    EmailTaken,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open user database at {}", self.db_path))
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            email,
        )
    }

    /// Get user by id (the token subject)
    pub fn get_user_by_id(&self, id: &Identity) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            &id.to_string(),
        )
    }

    fn query_one(&self, sql: &str, key: &str) -> Result<Option<User>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;

        match stmt.query_row(params![key], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a new user, hashing the password with the given bcrypt cost
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        cost: u32,
    ) -> Result<User, CreateUserError> {
        let password_hash = hash(password, cost).context("Failed to hash password")?;

        let user = User {
            id: Identity::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(CreateUserError::EmailTaken);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }

        info!("✅ Created user: {} ({})", user.email, user.id);

        Ok(user)
    }
}

impl CredentialStore for UserStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        Ok(self.get_user_by_email(email)?.map(|u| u.credential()))
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(User {
        id: Identity::new(id),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}
