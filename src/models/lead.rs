// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_stage do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_stage", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStage {
    Intake,
    Cre,
    Counsellor,
    RegionalManager,
    Kyc,
    Application,
    Unknown,
}

// --- LEAD (o estudante em prospecção) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub mobile: Option<String>,

    pub stage: LeadStage,

    pub source_id: Option<Uuid>,
    pub channel_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,

    // Ponteiros de atribuição por cargo. O vínculo com counsellors
    // fica na tabela lead_counsellors (N:N por país).
    pub assigned_cre: Option<Uuid>,
    pub assigned_cre_tl: Option<Uuid>,
    pub assigned_regional_manager: Option<Uuid>,
    pub assigned_branch_counselor: Option<Uuid>,
    pub assigned_counsellor_tl: Option<Uuid>,

    pub is_deleted: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Remark de lead (tabela filha, ordenada pelo id BIGSERIAL)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadRemark {
    pub id: i64,
    pub lead_id: Uuid,
    pub remark: String,
    pub status_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// Status + follow-up do lead em um país específico
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadCountryStatus {
    pub lead_id: Uuid,
    pub country_id: Uuid,
    pub status_id: Option<Uuid>,
    pub followup_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// --- PREFERÊNCIAS DE ESTUDO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreference {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub country_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreferenceDetail {
    pub id: Uuid,
    pub study_preference_id: Uuid,
    pub university_name: String,
    pub campus: Option<String>,
    pub course_name: String,
    pub intake_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreferenceDetailPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "University of Toronto")]
    pub university_name: String,

    pub campus: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Computer Science")]
    pub course_name: String,

    #[schema(example = 2027)]
    pub intake_year: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreferencePayload {
    pub country_id: Uuid,

    // Pode vir vazio: o lead sabe o país, mas ainda não o curso.
    #[serde(default)]
    #[validate(nested)]
    pub details: Vec<StudyPreferenceDetailPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "João Pereira")]
    pub full_name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@email.com")]
    pub email: String,

    #[validate(length(min = 8, message = "invalid_phone"))]
    #[schema(example = "+5511999990000")]
    pub phone: String,
    pub mobile: Option<String>,

    pub source_id: Option<Uuid>,
    pub channel_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,

    // Os países de interesse saem daqui (um por preferência)
    #[validate(length(min = 1, message = "required"), nested)]
    pub study_preferences: Vec<StudyPreferencePayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub full_name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "invalid_phone"))]
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub source_id: Option<Uuid>,
    pub channel_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusPayload {
    pub status_id: Uuid,
    pub country_id: Uuid,

    // Vira o vencimento da tarefa de follow-up
    #[schema(value_type = Option<String>, format = DateTime, example = "2026-08-10T12:00:00Z")]
    pub followup_date: Option<DateTime<Utc>>,

    pub remark: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadsPayload {
    #[validate(length(min = 1, message = "required"))]
    pub lead_ids: Vec<Uuid>,
}

// --- RESPOSTA COMPOSTA (GET /leads/{id}) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetails {
    pub lead: Lead,
    pub countries: Vec<LeadCountryStatus>,
    pub remarks: Vec<LeadRemark>,
}
