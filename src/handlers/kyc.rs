// src/handlers/kyc.rs

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
        rbac::{GateKyc, RequireRole},
    },
    models::application::{Application, ApproveKycPayload, ProceedKycPayload, RejectKycPayload},
};

// POST /api/kyc/proceed
#[utoipa::path(
    post,
    path = "/api/kyc/proceed",
    tag = "KYC",
    request_body = ProceedKycPayload,
    responses(
        (status = 200, description = "Applications criadas/reativadas", body = Vec<Application>),
        (status = 409, description = "Tarefa inexistente ou já concluída"),
        (status = 422, description = "Lead sem preferência para o país")
    ),
    security(("api_jwt" = []))
)]
pub async fn proceed_to_kyc(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateKyc>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Json(payload): Json<ProceedKycPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let applications = app_state
        .kyc_service
        .proceed_to_kyc(
            payload.student_id,
            payload.task_id,
            payload.country_id,
            &agent,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "kyc_proceeded"),
            applications,
        )),
    ))
}

// POST /api/kyc/{application_id}/approve
#[utoipa::path(
    post,
    path = "/api/kyc/{application_id}/approve",
    tag = "KYC",
    params(("application_id" = Uuid, Path, description = "ID da application")),
    request_body = ApproveKycPayload,
    responses(
        (status = 200, description = "KYC aprovado", body = Application),
        (status = 404, description = "Application fora do alcance do lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_kyc(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateKyc>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<ApproveKycPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let application = app_state
        .kyc_service
        .approve_kyc(application_id, payload.student_id, &agent)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "kyc_approved"),
            application,
        )),
    ))
}

// POST /api/kyc/{application_id}/reject
#[utoipa::path(
    post,
    path = "/api/kyc/{application_id}/reject",
    tag = "KYC",
    params(("application_id" = Uuid, Path, description = "ID da application")),
    request_body = RejectKycPayload,
    responses(
        (status = 200, description = "KYC rejeitado, compensações aplicadas", body = Application),
        (status = 404, description = "Application fora do alcance do lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_kyc(
    State(app_state): State<AppState>,
    locale: Locale,
    _gate: RequireRole<GateKyc>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<RejectKycPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let application = app_state
        .kyc_service
        .reject_kyc(
            application_id,
            payload.student_id,
            &payload.remarks,
            payload.country_id,
            &agent,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            messages::success(&locale.0, "kyc_rejected"),
            application,
        )),
    ))
}
