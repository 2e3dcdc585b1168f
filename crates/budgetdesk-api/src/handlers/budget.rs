//! Budget certificate handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use budgetdesk_core::error::AppError;
use budgetdesk_entity::budget::BudgetRecord;

use crate::dto::request::{BudgetQuery, CreateBudgetRequest};
use crate::dto::response::MessageResponse;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /budget/create-budget-info
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.sequencer.create(req.into(), auth.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Budget information created successfully")),
    ))
}

/// GET /budget/get-budget-info?certificateNumber=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<BudgetRecord>>, AppError> {
    let records = state
        .sequencer
        .get_all(auth.user_id, query.certificate_number.as_deref())
        .await?;
    Ok(Json(records))
}
