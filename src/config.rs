// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AgentRepository, ApplicationRepository, HistoryRepository, LeadRepository,
        ReferenceRepository, TaskRepository,
    },
    services::{
        assignment_service::AssignmentService, auth::AuthService, kyc_service::KycService,
        lead_service::LeadService, task_service::TaskService,
    },
};

// Os ajustes do motor de distribuição/KYC, resolvidos UMA vez na
// subida e injetados nos serviços, nada de globals espalhados.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub default_task_due_days: i64,
    pub followup_status_slug: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let default_task_due_days = env::var("DEFAULT_TASK_DUE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let followup_status_slug =
            env::var("FOLLOWUP_STATUS_SLUG").unwrap_or_else(|_| "followup".to_string());

        Self {
            default_task_due_days,
            followup_status_slug,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub engine: EngineConfig,

    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub assignment_service: AssignmentService,
    pub kyc_service: KycService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let engine = EngineConfig::from_env();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let agent_repo = AgentRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let application_repo = ApplicationRepository::new(db_pool.clone());
        let history_repo = HistoryRepository::new(db_pool.clone());
        let reference_repo = ReferenceRepository::new(db_pool.clone());

        let task_service = TaskService::new(
            task_repo.clone(),
            lead_repo.clone(),
            engine.default_task_due_days,
        );
        let assignment_service = AssignmentService::new(
            db_pool.clone(),
            agent_repo.clone(),
            lead_repo.clone(),
            history_repo.clone(),
            task_service.clone(),
        );
        let kyc_service = KycService::new(
            db_pool.clone(),
            application_repo,
            task_repo,
            lead_repo.clone(),
            history_repo.clone(),
            reference_repo.clone(),
            task_service.clone(),
            engine.followup_status_slug.clone(),
        );
        let lead_service = LeadService::new(
            db_pool.clone(),
            lead_repo,
            reference_repo.clone(),
            history_repo,
            assignment_service.clone(),
            task_service,
        );
        let auth_service =
            AuthService::new(agent_repo, reference_repo, jwt_secret.clone(), db_pool.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            engine,
            auth_service,
            lead_service,
            assignment_service,
            kyc_service,
        })
    }
}
