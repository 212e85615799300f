// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::agent::Agent};

// O middleware em si: resolve o Bearer token para um Agent
// e o pendura nas extensions da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let agent = app_state.auth_service.validate_token(token).await?;

            // Insere o agente nos "extensions" da requisição
            request.extensions_mut().insert(agent);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o agente autenticado diretamente nos handlers
pub struct AuthenticatedAgent(pub Agent);

impl<S> FromRequestParts<S> for AuthenticatedAgent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Agent>()
            .cloned()
            .map(AuthenticatedAgent)
            .ok_or(AppError::InvalidToken)
    }
}
