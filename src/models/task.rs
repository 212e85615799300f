// src/models/task.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// A tarefa de follow-up que liga um lead a um agente.
// No máximo uma ativa (não rejeitada) por par (lead, agente);
// rejeições de KYC criam uma linha NOVA com is_rejected = true.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub agent_id: Uuid,

    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,

    pub is_completed: bool,
    pub is_proceed_to_kyc: bool,
    pub is_rejected: bool,

    pub assigned_country_id: Option<Uuid>,

    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Remark de KYC anexado à tarefa (tabela filha, append-only)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRemark {
    pub id: i64,
    pub task_id: Uuid,
    pub remark: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
