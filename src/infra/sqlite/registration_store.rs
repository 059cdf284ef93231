//! SQLite-backed registration store for local development and tests
//!
//! Ids and timestamps are stored as text; timestamps use a fixed-width
//! RFC 3339 form so that ordering by `created_at` is chronological.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{NewRegistration, Registration, RegistrationId};
use crate::infra::{RegistrationError, RegistrationStore, Result};

/// SQLite registration store
#[derive(Clone)]
pub struct SqliteRegistrationStore {
    pool: SqlitePool,
}

impl SqliteRegistrationStore {
    /// Create a new SQLite registration store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Private in-memory database, already migrated.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.initialize().await?;
        Ok(store)
    }

    /// Apply the embedded migrations
    pub async fn initialize(&self) -> Result<()> {
        crate::migrations::run_sqlite(&self.pool)
            .await
            .map_err(|e| RegistrationError::Configuration(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RegistrationError::CorruptRecord(format!("Invalid {column}: {e}")))
}

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: String,
    name: String,
    roll_number: String,
    section: String,
    department: String,
    year: String,
    transaction_id: String,
    payment_proof: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = RegistrationError;

    fn try_from(row: RegistrationRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| RegistrationError::CorruptRecord(format!("Invalid id: {e}")))?;

        Ok(Registration {
            id: RegistrationId::from_uuid(id),
            name: row.name,
            roll_number: row.roll_number,
            section: row.section,
            department: row.department,
            year: row.year,
            transaction_id: row.transaction_id,
            payment_proof: row.payment_proof,
            created_at: parse_timestamp("created_at", &row.created_at)?,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
        })
    }
}

#[async_trait]
impl RegistrationStore for SqliteRegistrationStore {
    async fn exists_conflicting(&self, roll_number: &str, transaction_id: &str) -> Result<bool> {
        let (exists,): (i64,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM registrations
                WHERE roll_number = ? OR transaction_id = ?
            )
            "#,
        )
        .bind(roll_number)
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    async fn insert(&self, new: NewRegistration) -> Result<Registration> {
        let registration = Registration::create(new);

        sqlx::query(
            r#"
            INSERT INTO registrations (
                id, name, roll_number, section, department, year,
                transaction_id, payment_proof, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(registration.id.0.to_string())
        .bind(&registration.name)
        .bind(&registration.roll_number)
        .bind(&registration.section)
        .bind(&registration.department)
        .bind(&registration.year)
        .bind(&registration.transaction_id)
        .bind(registration.payment_proof.as_deref())
        .bind(format_timestamp(&registration.created_at))
        .bind(format_timestamp(&registration.updated_at))
        .execute(&self.pool)
        .await
        .map_err(RegistrationError::from_insert)?;

        Ok(registration)
    }

    async fn list(&self) -> Result<Vec<Registration>> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, name, roll_number, section, department, year,
                   transaction_id, payment_proof, created_at, updated_at
            FROM registrations
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
