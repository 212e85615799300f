// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::get_lead_history,
        handlers::leads::update_lead_status,

        // --- Atribuição ---
        handlers::assignment::assign_to_counsellors,
        handlers::assignment::auto_assign,

        // --- KYC ---
        handlers::kyc::proceed_to_kyc,
        handlers::kyc::approve_kyc,
        handlers::kyc::reject_kyc,
    ),
    components(
        schemas(
            models::agent::Agent,
            models::agent::AgentRole,
            models::agent::AgentLoad,
            models::agent::AssignedPair,
            models::agent::UnassignedTarget,
            models::agent::AssignmentOutcome,
            models::auth::RegisterAgentPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::lead::Lead,
            models::lead::LeadStage,
            models::lead::LeadRemark,
            models::lead::LeadCountryStatus,
            models::lead::LeadDetails,
            models::lead::StudyPreference,
            models::lead::StudyPreferenceDetail,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::UpdateLeadStatusPayload,
            models::lead::AssignLeadsPayload,
            models::lead::StudyPreferencePayload,
            models::lead::StudyPreferenceDetailPayload,
            models::task::Task,
            models::task::TaskRemark,
            models::application::Application,
            models::application::ApplicationStatus,
            models::application::KycStatus,
            models::application::ApplicationRemark,
            models::application::EligibilityCheck,
            models::application::ProceedKycPayload,
            models::application::ApproveKycPayload,
            models::application::RejectKycPayload,
            models::history::HistoryEntry,
            models::reference::Country,
            models::reference::Status,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Cadastro e autenticação de agentes"),
        (name = "Leads", description = "Intake, consulta e status por país"),
        (name = "Atribuição", description = "Distribuição de leads por carga"),
        (name = "KYC", description = "Máquina de estados da verificação")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
