// src/common/response.rs

use serde::Serialize;

// O envelope padrão de sucesso: { status, message, data? }.
// O lado de falha do mesmo envelope sai do IntoResponse do AppError.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    // Para operações que não devolvem corpo, só confirmação.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omite_data_quando_ausente() {
        let body = serde_json::to_value(ApiResponse::message("feito")).unwrap();
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "feito");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn envelope_carrega_data_quando_presente() {
        let body = serde_json::to_value(ApiResponse::ok("ok", vec![1, 2, 3])).unwrap();
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }
}
