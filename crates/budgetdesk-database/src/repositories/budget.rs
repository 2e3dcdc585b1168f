//! PostgreSQL budget store.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use budgetdesk_core::error::{AppError, ErrorKind};
use budgetdesk_core::result::AppResult;
use budgetdesk_entity::budget::{BudgetRecord, NewBudgetRecord, Rubro};

use super::traits::BudgetStore;

/// A rubro row together with the record it belongs to.
#[derive(Debug, sqlx::FromRow)]
struct RubroRow {
    budget_id: Uuid,
    name: String,
    code: String,
    assigned_amount: Decimal,
}

/// [`BudgetStore`] backed by the `budget_records` and `rubros` tables.
#[derive(Debug, Clone)]
pub struct PgBudgetStore {
    pool: PgPool,
}

impl PgBudgetStore {
    /// Create a new budget store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the rubros of `records` and attach them in their stored order.
    async fn attach_rubros(&self, mut records: Vec<BudgetRecord>) -> AppResult<Vec<BudgetRecord>> {
        if records.is_empty() {
            return Ok(records);
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let rows = sqlx::query_as::<_, RubroRow>(
            "SELECT budget_id, name, code, assigned_amount FROM rubros \
             WHERE budget_id = ANY($1) ORDER BY budget_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load rubros", e))?;

        let mut by_record: HashMap<Uuid, Vec<Rubro>> = HashMap::new();
        for row in rows {
            by_record.entry(row.budget_id).or_default().push(Rubro {
                name: row.name,
                code: row.code,
                assigned_amount: row.assigned_amount,
            });
        }

        for record in &mut records {
            record.rubros = by_record.remove(&record.id).unwrap_or_default();
        }
        Ok(records)
    }
}

#[async_trait]
impl BudgetStore for PgBudgetStore {
    async fn find_by_certificate(
        &self,
        owner_id: Uuid,
        certificate_number: &str,
    ) -> AppResult<Option<BudgetRecord>> {
        let record = sqlx::query_as::<_, BudgetRecord>(
            "SELECT * FROM budget_records WHERE created_by = $1 AND certificate_number = $2",
        )
        .bind(owner_id)
        .bind(certificate_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find budget record", e)
        })?;

        match record {
            Some(record) => Ok(self.attach_rubros(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<BudgetRecord>> {
        let records = sqlx::query_as::<_, BudgetRecord>(
            "SELECT * FROM budget_records WHERE created_by = $1 ORDER BY certificate_number ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list budget records", e)
        })?;

        self.attach_rubros(records).await
    }

    async fn find_all_by_certificate_prefix(
        &self,
        owner_id: Uuid,
        prefix: &str,
    ) -> AppResult<Vec<BudgetRecord>> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let records = sqlx::query_as::<_, BudgetRecord>(
            "SELECT * FROM budget_records \
             WHERE created_by = $1 AND certificate_number ILIKE $2 \
             ORDER BY certificate_number ASC",
        )
        .bind(owner_id)
        .bind(format!("{escaped}%"))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to search budget records", e)
        })?;

        self.attach_rubros(records).await
    }

    async fn insert(&self, record: &NewBudgetRecord, owner_id: Uuid) -> AppResult<BudgetRecord> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut created = sqlx::query_as::<_, BudgetRecord>(
            "INSERT INTO budget_records \
                 (id, certificate_number, issuance_date, total_assigned_amount, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&record.certificate_number)
        .bind(record.issuance_date)
        .bind(record.total_assigned_amount)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("budget_records_owner_certificate_key") =>
            {
                AppError::conflict(format!(
                    "Certificate number {} already exists",
                    record.certificate_number
                ))
                .on_field("certificateNumber")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create budget record", e),
        })?;

        for (position, rubro) in record.rubros.iter().enumerate() {
            sqlx::query(
                "INSERT INTO rubros (budget_id, position, name, code, assigned_amount) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(created.id)
            .bind(position as i32)
            .bind(&rubro.name)
            .bind(&rubro.code)
            .bind(rubro.assigned_amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create rubro", e))?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit budget record", e)
        })?;

        created.rubros = record.rubros.clone();
        Ok(created)
    }
}
