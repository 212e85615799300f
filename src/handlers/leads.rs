// src/handlers/leads.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, messages, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedAgent,
        i18n::Locale,
        rbac::{GateIntake, RequireRole},
    },
    models::lead::{
        CreateLeadPayload, Lead, LeadCountryStatus, LeadDetails, UpdateLeadPayload,
        UpdateLeadStatusPayload,
    },
};

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado e distribuído", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail/telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateIntake>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.create_lead(&payload, &agent).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "lead_created"),
            lead,
        )),
    ))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com status por país e remarks", body = LeadDetails),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let details = app_state.lead_service.get_lead(id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "lead_found"),
            details,
        )),
    ))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateIntake>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .update_lead(id, &payload, &agent)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "lead_updated"),
            lead,
        )),
    ))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead removido (soft delete)"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateIntake>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete_lead(id, &agent).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::message(messages::success(
            &locale.0,
            "lead_deleted",
        ))),
    ))
}

// GET /api/leads/{id}/history
#[utoipa::path(
    get,
    path = "/api/leads/{id}/history",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Trilha de auditoria, da mais nova para a mais antiga"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.lead_service.lead_history(id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "history_listed"),
            entries,
        )),
    ))
}

// PUT /api/leads/{id}/status
//
// Sem RequireRole aqui: o portão deste endpoint é por status,
// via matriz status_access_roles, dentro do serviço.
#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadStatusPayload,
    responses(
        (status = 200, description = "Status por país atualizado", body = LeadCountryStatus),
        (status = 403, description = "Cargo sem acesso a este status"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let row = app_state
        .lead_service
        .update_lead_status(id, &payload, &agent)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "status_updated"),
            row,
        )),
    ))
}
