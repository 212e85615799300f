// src/models/history.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Entrada imutável da trilha de auditoria de um lead.
// Criada, nunca alterada ou removida.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub lead_id: Uuid,

    // Texto já formatado pelo chamador (nomes de cargo e de
    // destino resolvidos antes de chegar aqui).
    pub action: String,

    pub action_by: Uuid,
    pub country_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
