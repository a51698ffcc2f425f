//! PostgreSQL credential store
//!
//! Uses SQLx with runtime-checked queries. Soft-deleted rows are excluded by
//! every lookup, and email uniqueness among live rows is enforced by a
//! partial unique index.

use super::{StoreError, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use usergate_core::{DatabaseConfig, NewUser, User, UserFilter};
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        password TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'DEV',
        activated_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_live_idx ON users (email) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS users_role_idx ON users (role)",
    "CREATE INDEX IF NOT EXISTS users_deleted_at_idx ON users (deleted_at)",
];

const USER_COLUMNS: &str =
    "id, name, email, phone, password, role, activated_at, created_at, updated_at, deleted_at";

/// PostgreSQL-backed [`UserStore`]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new store connection
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the users table and its indexes if they do not exist
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        }
        tracing::info!("users table migrated");
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    password: String,
    role: String,
    activated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password: row.password,
            role: row.role,
            activated_at: row.activated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn store(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::from_new(user);

        let query = format!(
            r#"
            INSERT INTO users (id, name, email, phone, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password)
            .bind(&user.role)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<User, StoreError> {
        let row = match filter {
            UserFilter::Email(email) => {
                let query = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL LIMIT 1"
                );
                sqlx::query_as::<_, UserRow>(&query)
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await?
            }
            UserFilter::Id(id) => {
                let query = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
                );
                sqlx::query_as::<_, UserRow>(&query)
                    .bind(*id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        row.map(User::from).ok_or(StoreError::NotFound)
    }
}
