// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Todas as respostas de falha saem no mesmo envelope
// { "status": false, "message": ... } que as de sucesso.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // O agente autenticado não tem o cargo exigido pela operação
    #[error("Cargo sem permissão: {0}")]
    RoleNotAllowed(String),

    // O cargo do agente não pode aplicar este status (matriz status_access_roles)
    #[error("Status não permitido para este cargo")]
    StatusNotAllowed,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // UPDATE que precisava afetar uma linha afetou zero.
    // A transação inteira é desfeita pelo chamador.
    #[error("Nenhuma linha afetada em {0}")]
    NoRowsAffected(&'static str),

    // Falha de integridade da operação (ex.: template de descrição
    // não renderizou, lead sem preferência para o país pedido)
    #[error("Falha de integridade: {0}")]
    IntegrityFailure(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Helper para criar erro de validação de um campo específico
// (ids de referência que não existem, por exemplo)
pub(crate) fn field_validation_error(field: &str, message: &str) -> AppError {
    let mut err = validator::ValidationErrors::new();
    let mut validation_err = validator::ValidationError::new("invalid_reference");
    validation_err.message = Some(message.to_string().into());

    // Leak seguro para erro estático
    let static_field: &'static str = Box::leak(field.to_string().into_boxed_str());
    err.add(static_field, validation_err);

    AppError::ValidationError(err)
}

impl AppError {
    // Mapeamento HTTP da taxonomia. Mantido fora do IntoResponse
    // para ser testável sem montar uma Response.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::RoleNotAllowed(_) | AppError::StatusNotAllowed => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::NoRowsAffected(_) => StatusCode::CONFLICT,
            AppError::IntegrityFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Validação devolve todos os detalhes por campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "status": false,
                "message": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (status, body).into_response();
        }

        let message = match &self {
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.".to_string(),
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::RoleNotAllowed(role) => {
                format!("O cargo '{}' não pode executar esta ação.", role)
            }
            AppError::StatusNotAllowed => {
                "O seu cargo não pode aplicar este status ao lead.".to_string()
            }
            AppError::NotFound(entity) => format!("{} não encontrado(a).", entity),
            AppError::UniqueConstraintViolation(msg) => msg.clone(),
            AppError::NoRowsAffected(entity) => {
                format!("Nenhum registro de {} foi atualizado.", entity)
            }
            AppError::IntegrityFailure(msg) => msg.clone(),

            // Todos os outros erros viram 500 genérico.
            // O `tracing` loga a mensagem detalhada; o cliente não vê nada interno.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "status": false, "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomia_mapeia_para_os_status_http_corretos() {
        assert_eq!(
            AppError::NotFound("Lead").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NoRowsAffected("tasks").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::UniqueConstraintViolation("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::StatusNotAllowed.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::IntegrityFailure("sem preferências".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn erro_de_banco_vira_500() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
