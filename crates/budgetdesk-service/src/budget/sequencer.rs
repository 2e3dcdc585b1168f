//! Budget-certificate creation and listing.
//!
//! Certificates of one owner form a numeric sequence whose issuance dates
//! must not decrease: certificate N is dated no earlier than N-1 and no
//! later than N+1. Only the immediate numeric neighbors are checked, so
//! gaps in the sequence leave a new certificate unconstrained.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use budgetdesk_cache::keys;
use budgetdesk_cache::provider::CacheManager;
use budgetdesk_core::error::AppError;
use budgetdesk_core::result::AppResult;
use budgetdesk_core::traits::CacheProvider;
use budgetdesk_database::repositories::BudgetStore;
use budgetdesk_entity::budget::{BudgetRecord, NewBudgetRecord, Rubro};

/// Unvalidated budget certificate as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecordInput {
    /// Certificate number; must parse as a number.
    pub certificate_number: String,
    /// Issuance date, `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub issuance_date: String,
    /// Total amount assigned.
    pub total_assigned_amount: Decimal,
    /// Ordered line items.
    pub rubros: Vec<Rubro>,
}

/// Validates and orders an owner's budget certificates.
#[derive(Debug, Clone)]
pub struct BudgetSequencer {
    store: Arc<dyn BudgetStore>,
    cache: Arc<CacheManager>,
}

impl BudgetSequencer {
    /// Creates a new sequencer.
    pub fn new(store: Arc<dyn BudgetStore>, cache: Arc<CacheManager>) -> Self {
        Self { store, cache }
    }

    /// Create a certificate for `owner_id` after checking it against its
    /// numeric neighbors.
    pub async fn create(&self, input: BudgetRecordInput, owner_id: Uuid) -> AppResult<BudgetRecord> {
        let outcome: AppResult<BudgetRecord> = async {
            let certificate_number = input.certificate_number.trim().to_string();
            let number = parse_certificate_number(&certificate_number)
                .ok_or_else(|| AppError::conflict("Invalid certificate number"))?;
            let issuance_date = parse_issuance_date(&input.issuance_date)
                .ok_or_else(|| AppError::conflict("Invalid issuance date"))?;

            if self
                .store
                .find_by_certificate(owner_id, &certificate_number)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(format!(
                    "A budget with certificate number {certificate_number} already exists"
                ))
                .on_field("certificateNumber"));
            }

            let mut existing = self.store.find_all(owner_id).await?;
            sort_by_certificate(&mut existing);

            let previous = number
                .checked_sub(Decimal::ONE)
                .and_then(|n| find_certificate(&existing, n));
            let next = number
                .checked_add(Decimal::ONE)
                .and_then(|n| find_certificate(&existing, n));
            check_neighbors(&certificate_number, issuance_date, previous, next)?;

            let record = self
                .store
                .insert(
                    &NewBudgetRecord {
                        certificate_number,
                        issuance_date,
                        total_assigned_amount: input.total_assigned_amount,
                        rubros: input.rubros,
                    },
                    owner_id,
                )
                .await?;

            if let Err(e) = self.cache.delete(&keys::budget_list(owner_id)).await {
                warn!(owner_id = %owner_id, error = %e, "Budget list cache invalidation failed");
            }

            info!(
                owner_id = %owner_id,
                certificate_number = %record.certificate_number,
                "Budget certificate created"
            );
            Ok(record)
        }
        .await;

        outcome.map_err(|e| e.or_internal("Could not create the budget. Try again later."))
    }

    /// The owner's certificates sorted by numeric certificate number,
    /// optionally restricted to those whose number starts with `prefix`.
    pub async fn get_all(&self, owner_id: Uuid, prefix: Option<&str>) -> AppResult<Vec<BudgetRecord>> {
        let outcome: AppResult<Vec<BudgetRecord>> = async {
            let prefix = prefix.map(str::trim).filter(|p| !p.is_empty());
            let mut records = match prefix {
                Some(prefix) => {
                    self.store
                        .find_all_by_certificate_prefix(owner_id, prefix)
                        .await?
                }
                None => return self.get_all_cached(owner_id).await,
            };
            sort_by_certificate(&mut records);
            Ok(records)
        }
        .await;

        outcome.map_err(|e| {
            e.or_internal("Could not load the budget information. Try again later.")
        })
    }

    async fn get_all_cached(&self, owner_id: Uuid) -> AppResult<Vec<BudgetRecord>> {
        let key = keys::budget_list(owner_id);
        match self.cache.get_json::<Vec<CachedRecord>>(&key).await {
            Ok(Some(cached)) => return Ok(cached.into_iter().map(BudgetRecord::from).collect()),
            Ok(None) => {}
            Err(e) => warn!(owner_id = %owner_id, error = %e, "Budget list cache read failed"),
        }

        let mut records = self.store.find_all(owner_id).await?;
        sort_by_certificate(&mut records);

        let cached: Vec<CachedRecord> = records.iter().map(CachedRecord::from).collect();
        if let Err(e) = self
            .cache
            .set_json(&key, &cached, self.cache.default_ttl())
            .await
        {
            warn!(owner_id = %owner_id, error = %e, "Budget list cache write failed");
        }
        Ok(records)
    }
}

/// Cached form of a budget record. Amounts are kept as decimal strings so
/// a cached list carries exactly the stored values.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRecord {
    id: Uuid,
    certificate_number: String,
    issuance_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    total_assigned_amount: Decimal,
    rubros: Vec<CachedRubro>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRubro {
    name: String,
    code: String,
    #[serde(with = "rust_decimal::serde::str")]
    assigned_amount: Decimal,
}

impl From<&BudgetRecord> for CachedRecord {
    fn from(record: &BudgetRecord) -> Self {
        Self {
            id: record.id,
            certificate_number: record.certificate_number.clone(),
            issuance_date: record.issuance_date,
            total_assigned_amount: record.total_assigned_amount,
            rubros: record
                .rubros
                .iter()
                .map(|r| CachedRubro {
                    name: r.name.clone(),
                    code: r.code.clone(),
                    assigned_amount: r.assigned_amount,
                })
                .collect(),
            created_by: record.created_by,
            created_at: record.created_at,
        }
    }
}

impl From<CachedRecord> for BudgetRecord {
    fn from(cached: CachedRecord) -> Self {
        Self {
            id: cached.id,
            certificate_number: cached.certificate_number,
            issuance_date: cached.issuance_date,
            total_assigned_amount: cached.total_assigned_amount,
            rubros: cached
                .rubros
                .into_iter()
                .map(|r| Rubro {
                    name: r.name,
                    code: r.code,
                    assigned_amount: r.assigned_amount,
                })
                .collect(),
            created_by: cached.created_by,
            created_at: cached.created_at,
        }
    }
}

fn parse_certificate_number(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

fn parse_issuance_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|d| d.date_naive())
        })
}

/// Ascending by numeric value. Unparseable numbers sort last.
fn sort_by_certificate(records: &mut [BudgetRecord]) {
    records.sort_by(|a, b| {
        let left = parse_certificate_number(&a.certificate_number);
        let right = parse_certificate_number(&b.certificate_number);
        match (left, right) {
            (Some(l), Some(r)) => l.cmp(&r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.certificate_number.cmp(&b.certificate_number))
    });
}

fn find_certificate(records: &[BudgetRecord], number: Decimal) -> Option<&BudgetRecord> {
    records
        .iter()
        .find(|r| parse_certificate_number(&r.certificate_number) == Some(number))
}

fn check_neighbors(
    certificate_number: &str,
    issuance_date: NaiveDate,
    previous: Option<&BudgetRecord>,
    next: Option<&BudgetRecord>,
) -> AppResult<()> {
    if let Some(previous) = previous.filter(|p| issuance_date < p.issuance_date) {
        return Err(AppError::conflict(format!(
            "The issuance date of certificate {certificate_number} must be on or after that of the previous certificate ('{}': {})",
            previous.certificate_number,
            previous.issuance_date.format("%Y-%m-%d"),
        ))
        .on_field("issuanceDate"));
    }

    if let Some(next) = next.filter(|n| issuance_date > n.issuance_date) {
        return Err(AppError::conflict(format!(
            "The issuance date of certificate {certificate_number} must be on or before that of the next certificate ('{}': {})",
            next.certificate_number,
            next.issuance_date.format("%Y-%m-%d"),
        ))
        .on_field("issuanceDate"));
    }

    Ok(())
}
