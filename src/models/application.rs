// src/models/application.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "kyc_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

// --- APPLICATION ---

// Deriva de um StudyPreferenceDetail; é por ela que o lead
// atravessa (ou não) o portão de KYC.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub study_preference_detail_id: Uuid,

    pub application_status: ApplicationStatus,
    pub kyc_status: KycStatus,
    pub is_rejected_kyc: bool,
    pub proceed_to_application_manager: bool,

    pub counsellor_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRemark {
    pub id: i64,
    pub application_id: Uuid,
    pub remark: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// As sete verificações que destravam a progressão.
// Nascem todas falsas junto com a application.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCheck {
    pub application_id: Uuid,
    pub passport_ok: bool,
    pub academic_docs_ok: bool,
    pub english_test_ok: bool,
    pub financial_docs_ok: bool,
    pub visa_history_ok: bool,
    pub work_history_ok: bool,
    pub references_ok: bool,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProceedKycPayload {
    pub student_id: Uuid,
    pub task_id: Uuid,
    pub country_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveKycPayload {
    pub student_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectKycPayload {
    pub student_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Histórico escolar incompleto")]
    pub remarks: String,

    pub country_id: Uuid,
}
