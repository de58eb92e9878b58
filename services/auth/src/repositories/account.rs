//! PostgreSQL credential store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseError;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::CredentialStore;
use crate::{
    error::{DuplicateField, StoreError},
    models::{Account, NewAccount},
};

/// Unique index on `LOWER(username)`
pub const USERNAME_CONSTRAINT: &str = "accounts_username_lower_key";
/// Unique index on `LOWER(email)`
pub const EMAIL_CONSTRAINT: &str = "accounts_email_lower_key";

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, created_at, last_login, is_active";

/// Credential store backed by the `accounts` table
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new credential store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, new_account: &NewAccount) -> Result<Account, StoreError> {
        info!("Inserting account: {}", new_account.username);

        let query = format!(
            r#"
            INSERT INTO accounts (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_account.username)
            .bind(&new_account.email)
            .bind(&new_account.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        debug!("Finding active account by username: {}", username);

        let query = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE LOWER(username) = LOWER($1) AND is_active
            "#
        );

        let account = sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        debug!("Finding active account by ID: {}", id);

        let query = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE id = $1 AND is_active
            "#
        );

        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(account)
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        matches!(common::database::health_check(&self.pool).await, Ok(true))
    }
}

/// Map a constraint name reported by PostgreSQL to the identity field it guards
pub fn duplicate_field_for_constraint(constraint: &str) -> Option<DuplicateField> {
    match constraint {
        USERNAME_CONSTRAINT => Some(DuplicateField::Username),
        EMAIL_CONSTRAINT => Some(DuplicateField::Email),
        _ => None,
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(field) = db_err.constraint().and_then(duplicate_field_for_constraint) {
                info!("Rejected duplicate {} on insert", field);
                return StoreError::Duplicate { field };
            }
        }
    }

    StoreError::Database(DatabaseError::Query(err))
}
