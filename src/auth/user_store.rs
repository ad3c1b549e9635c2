//! User Storage
//! Mission: Persist user accounts in SQLite

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, ErrorCode, OptionalExtension, Row};
use std::time::Duration;
use tracing::info;

const USER_COLUMNS: &str = "id, name, email, encrypted_pass, role, created_at, updated_at";

/// Fields required to insert a user; id and timestamps are assigned here
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub role: UserRole,
}

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
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open user database at {}", self.db_path))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                encrypted_pass TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    /// Get user by ID
    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        conn.query_row(&sql, params![id], user_from_row)
            .optional()
            .context("Failed to load user by id")
    }

    /// Get user by (already normalized) email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");

        conn.query_row(&sql, params![email], user_from_row)
            .optional()
            .context("Failed to load user by email")
    }

    /// Check whether an email is already registered
    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )
        .context("Failed to check email")
    }

    /// Create a new user.
    ///
    /// Returns `Ok(None)` when the email is already taken, including when a
    /// concurrent registration wins the unique constraint.
    pub fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let conn = self.connect()?;
        let now = Utc::now();

        let inserted = conn.execute(
            "INSERT INTO users (name, email, encrypted_pass, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new_user.name,
                new_user.email,
                new_user.hashed_password,
                new_user.role.as_str(),
                now,
                now,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to insert user"),
        }

        let user = User {
            id: conn.last_insert_rowid(),
            name: new_user.name,
            email: new_user.email,
            hashed_password: new_user.hashed_password,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        info!("✅ Created user: {} ({})", user.id, user.role);

        Ok(Some(user))
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");

        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list users")?;

        Ok(users)
    }

    /// Delete a user by ID, returning whether a row was removed
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;

        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .context("Failed to delete user")?;

        if rows_affected > 0 {
            info!("🗑️  Deleted user: {}", id);
        }

        Ok(rows_affected > 0)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(4)?;
    let role = role_str
        .parse::<UserRole>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let created_at: DateTime<Utc> = row.get(5)?;
    let updated_at: DateTime<Utc> = row.get(6)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        role,
        created_at,
        updated_at,
    })
}
