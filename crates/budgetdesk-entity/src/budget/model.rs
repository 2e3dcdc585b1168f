//! Budget-certificate entity model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A budget line item attached to a certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rubro {
    /// Line item name.
    pub name: String,
    /// Line item code.
    pub code: String,
    /// Amount assigned to this line item.
    pub assigned_amount: Decimal,
}

/// A persisted budget certificate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Numeric certificate number, unique per owner.
    pub certificate_number: String,
    /// Date the certificate was issued.
    pub issuance_date: NaiveDate,
    /// Total amount assigned by the certificate.
    pub total_assigned_amount: Decimal,
    /// Ordered line items. Loaded separately from the record row.
    #[sqlx(skip)]
    pub rubros: Vec<Rubro>,
    /// Principal that created the record.
    pub created_by: Uuid,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a budget record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudgetRecord {
    /// Certificate number, trimmed.
    pub certificate_number: String,
    /// Parsed issuance date.
    pub issuance_date: NaiveDate,
    /// Total amount assigned.
    pub total_assigned_amount: Decimal,
    /// Ordered line items.
    pub rubros: Vec<Rubro>,
}

impl NewBudgetRecord {
    /// Materialize the record for `owner_id`.
    pub fn into_record(self, owner_id: Uuid) -> BudgetRecord {
        BudgetRecord {
            id: Uuid::new_v4(),
            certificate_number: self.certificate_number,
            issuance_date: self.issuance_date,
            total_assigned_amount: self.total_assigned_amount,
            rubros: self.rubros,
            created_by: owner_id,
            created_at: Utc::now(),
        }
    }
}
