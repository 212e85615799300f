// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedAgent,
    models::agent::Agent,
    models::auth::{AuthResponse, LoginPayload, RegisterAgentPayload},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterAgentPayload,
    responses(
        (status = 201, description = "Agente cadastrado", body = Agent),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterAgentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let agent = app_state.auth_service.register_agent(&payload).await?;

    Ok((StatusCode::CREATED, Json(agent)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/agents/me
#[utoipa::path(
    get,
    path = "/api/agents/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Agente autenticado", body = Agent)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedAgent(agent): AuthenticatedAgent) -> Json<Agent> {
    Json(agent)
}
