//! Request DTOs with validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use budgetdesk_auth::{AdminProfileUpdate, Credentials, ProfileUpdate, Registration};
use budgetdesk_entity::budget::Rubro;
use budgetdesk_entity::user::UserRole;
use budgetdesk_service::BudgetRecordInput;

/// Account registration body (admin only).
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 5, max = 15, message = "Username must be between 5 and 15 characters"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}

/// Login request body.
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email.
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

/// Self-service profile update. At least one field is required.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_profile_fields"))]
pub struct UpdateUserRequest {
    /// New email.
    #[validate(email(message = "Email is not valid"))]
    pub email: Option<String>,
    /// New username.
    #[validate(length(min = 5, max = 15, message = "Username must be between 5 and 15 characters"))]
    pub username: Option<String>,
    /// New password.
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.password.is_none()
    }
}

impl From<UpdateUserRequest> for ProfileUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            password: req.password,
        }
    }
}

fn validate_profile_fields(req: &UpdateUserRequest) -> Result<(), ValidationError> {
    if req.is_empty() {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one of email, username or password is required".into()));
    }
    Ok(())
}

/// Administrative user update. At least one field is required.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_admin_fields"))]
pub struct AdminUpdateUserRequest {
    /// New email.
    #[validate(email(message = "Email is not valid"))]
    pub email: Option<String>,
    /// New username.
    #[validate(length(min = 5, max = 15, message = "Username must be between 5 and 15 characters"))]
    pub username: Option<String>,
    /// New password.
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    pub password: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl From<AdminUpdateUserRequest> for AdminProfileUpdate {
    fn from(req: AdminUpdateUserRequest) -> Self {
        Self {
            profile: ProfileUpdate {
                email: req.email,
                username: req.username,
                password: req.password,
            },
            role: req.role,
            is_active: req.is_active,
        }
    }
}

fn validate_admin_fields(req: &AdminUpdateUserRequest) -> Result<(), ValidationError> {
    let untouched = req.email.is_none()
        && req.username.is_none()
        && req.password.is_none()
        && req.role.is_none()
        && req.is_active.is_none();
    if untouched {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one field to update is required".into()));
    }
    Ok(())
}

macro_rules! redacted_debug {
    ($ty:ty, $($field:ident),*) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($field), &self.$field))*
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(RegisterRequest, username, email);
redacted_debug!(LoginRequest, email);
redacted_debug!(UpdateUserRequest, email, username);
redacted_debug!(AdminUpdateUserRequest, email, username, role, is_active);

/// One budget line item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RubroRequest {
    /// Line item name.
    #[validate(length(min = 1, message = "Rubro name is required"))]
    pub name: String,
    /// Line item code.
    #[validate(length(min = 1, message = "Rubro code is required"))]
    pub code: String,
    /// Amount assigned.
    #[validate(custom(function = "positive_amount"))]
    pub assigned_amount: Decimal,
}

/// Budget certificate creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    /// Certificate number.
    #[validate(length(min = 1, message = "Certificate number is required"))]
    pub certificate_number: String,
    /// Issuance date.
    #[validate(length(min = 1, message = "Issuance date is required"))]
    pub issuance_date: String,
    /// Total assigned amount.
    #[validate(custom(function = "positive_amount"))]
    pub total_assigned_amount: Decimal,
    /// Line items.
    #[validate(length(min = 1, message = "At least one rubro is required"), nested)]
    pub rubros: Vec<RubroRequest>,
}

impl From<CreateBudgetRequest> for BudgetRecordInput {
    fn from(req: CreateBudgetRequest) -> Self {
        Self {
            certificate_number: req.certificate_number,
            issuance_date: req.issuance_date,
            total_assigned_amount: req.total_assigned_amount,
            rubros: req
                .rubros
                .into_iter()
                .map(|r| Rubro {
                    name: r.name,
                    code: r.code,
                    assigned_amount: r.assigned_amount,
                })
                .collect(),
        }
    }
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message("Amount must be greater than zero".into()));
    }
    Ok(())
}

/// Query string of the budget listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetQuery {
    /// Certificate number prefix.
    pub certificate_number: Option<String>,
}
