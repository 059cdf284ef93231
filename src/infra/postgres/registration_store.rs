//! PostgreSQL-backed registration store
//!
//! Roll number and transaction id uniqueness is enforced by the
//! `registrations_roll_number_key` and `registrations_transaction_id_key`
//! constraints. Concurrent submissions that both pass
//! [`RegistrationStore::exists_conflicting`] are resolved by whichever insert
//! commits first; the loser gets `RegistrationError::Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{NewRegistration, Registration, RegistrationId};
use crate::infra::{RegistrationError, RegistrationStore, Result};

/// PostgreSQL registration store
#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    /// Create a new PostgreSQL registration store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations
    pub async fn initialize(&self) -> Result<()> {
        crate::migrations::run_postgres(&self.pool)
            .await
            .map_err(|e| RegistrationError::Configuration(e.to_string()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: Uuid,
    name: String,
    roll_number: String,
    section: String,
    department: String,
    year: String,
    transaction_id: String,
    payment_proof: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            id: RegistrationId::from_uuid(row.id),
            name: row.name,
            roll_number: row.roll_number,
            section: row.section,
            department: row.department,
            year: row.year,
            transaction_id: row.transaction_id,
            payment_proof: row.payment_proof,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn exists_conflicting(&self, roll_number: &str, transaction_id: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM registrations
                WHERE roll_number = $1 OR transaction_id = $2
            )
            "#,
        )
        .bind(roll_number)
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, new: NewRegistration) -> Result<Registration> {
        let registration = Registration::create(new);

        sqlx::query(
            r#"
            INSERT INTO registrations (
                id, name, roll_number, section, department, year,
                transaction_id, payment_proof, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(registration.id.0)
        .bind(&registration.name)
        .bind(&registration.roll_number)
        .bind(&registration.section)
        .bind(&registration.department)
        .bind(&registration.year)
        .bind(&registration.transaction_id)
        .bind(registration.payment_proof.as_deref())
        .bind(registration.created_at)
        .bind(registration.updated_at)
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
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Registration::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
