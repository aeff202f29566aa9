use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, types::Json, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::account::{Account, AvailabilitySlot, NewAccount, ProfileUpdate, Role},
};

/// Persistence for accounts.
///
/// Implementations must enforce email uniqueness themselves; callers may
/// check first, but only the store's answer is authoritative.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account. `AppError::AlreadyExists` if the email is taken.
    async fn insert(&self, account: NewAccount) -> Result<Account>;

    /// Finds an account by its normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Finds an account by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Applies the present fields of `update` in one atomic write and bumps
    /// `updated_at`. `None` if the account does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>>;

    /// Replaces the password hash. `false` if the account does not exist.
    async fn update_password(&self, id: Uuid, password_hash: String, now: DateTime<Utc>)
    -> Result<bool>;
}

/// Accounts stored in PostgreSQL.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: Pool,
}

impl PgAccountRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// A helper function to map a `tokio_postgres::Row` to an `Account`.
fn row_to_account(row: &Row) -> Result<Account> {
    let role: String = row.try_get("role")?;
    let availability: Json<Vec<AvailabilitySlot>> = row.try_get("availability")?;

    Ok(Account {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<Role>().map_err(AppError::Internal)?,
        grade_level: row.try_get("grade_level")?,
        major: row.try_get("major")?,
        degree_type: row.try_get("degree_type")?,
        completed_courses: row.try_get("completed_courses")?,
        current_courses: row.try_get("current_courses")?,
        career_interests: row.try_get("career_interests")?,
        disabilities: row.try_get("disabilities")?,
        availability: availability.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(&self, account: NewAccount) -> Result<Account> {
        let client = self.pool.get().await?;
        let role = account.role.as_str();
        let row = client
            .query_one(
                r#"
                INSERT INTO accounts (id, name, email, password_hash, role, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                RETURNING *
                "#,
                &[
                    &account.id,
                    &account.name,
                    &account.email,
                    &account.password_hash,
                    &role,
                    &account.created_at,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::AlreadyExists
                } else {
                    AppError::Database(e)
                }
            })?;
        row_to_account(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT *
                FROM accounts
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT *
                FROM accounts
                WHERE id = $1
                "#,
                &[&id],
            )
            .await?;
        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let client = self.pool.get().await?;
        let availability = update.availability.as_ref().map(Json);
        let row = client
            .query_opt(
                r#"
                UPDATE accounts
                SET
                    grade_level = COALESCE($2::TEXT, grade_level),
                    major = COALESCE($3::TEXT, major),
                    degree_type = COALESCE($4::TEXT, degree_type),
                    completed_courses = COALESCE($5::TEXT[], completed_courses),
                    current_courses = COALESCE($6::TEXT[], current_courses),
                    career_interests = COALESCE($7::TEXT[], career_interests),
                    disabilities = COALESCE($8::TEXT[], disabilities),
                    availability = COALESCE($9::JSONB, availability),
                    updated_at = $10
                WHERE id = $1
                RETURNING *
                "#,
                &[
                    &id,
                    &update.grade_level,
                    &update.major,
                    &update.degree_type,
                    &update.completed_courses,
                    &update.current_courses,
                    &update.career_interests,
                    &update.disabilities,
                    &availability,
                    &now,
                ],
            )
            .await?;
        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                r#"
                UPDATE accounts
                SET password_hash = $1, updated_at = $2
                WHERE id = $3
                "#,
                &[&password_hash, &now, &id],
            )
            .await?;
        Ok(updated == 1)
    }
}
