// src/handlers/assignment.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, messages, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedAgent,
        i18n::Locale,
        rbac::{GateAssignment, RequireRole},
    },
    models::agent::AssignmentOutcome,
    models::lead::AssignLeadsPayload,
};

// POST /api/leads/assign
//
// Modo único: a carga é relida lead a lead e cada alvo fica com o
// counsellor menos carregado naquele momento.
#[utoipa::path(
    post,
    path = "/api/leads/assign",
    tag = "Atribuição",
    request_body = AssignLeadsPayload,
    responses(
        (status = 200, description = "Resultado com atribuídos e não atribuídos", body = AssignmentOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_to_counsellors(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateAssignment>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Json(payload): Json<AssignLeadsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .assignment_service
        .assign_to_counsellors(&payload.lead_ids, &agent)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "leads_assigned"),
            outcome,
        )),
    ))
}

// POST /api/leads/auto-assign
//
// Modo lote: ranking calculado uma vez por país e leads espalhados
// ciclicamente (i mod K) sobre ele.
#[utoipa::path(
    post,
    path = "/api/leads/auto-assign",
    tag = "Atribuição",
    request_body = AssignLeadsPayload,
    responses(
        (status = 200, description = "Resultado com atribuídos e não atribuídos", body = AssignmentOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn auto_assign(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateAssignment>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Json(payload): Json<AssignLeadsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .assignment_service
        .auto_assign(&payload.lead_ids, &agent)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "leads_assigned"),
            outcome,
        )),
    ))
}
