// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{field_validation_error, AppError},
    db::{AgentRepository, ReferenceRepository},
    models::agent::Agent,
    models::auth::{Claims, RegisterAgentPayload},
    models::reference::ReferenceKind,
};

#[derive(Clone)]
pub struct AuthService {
    agent_repo: AgentRepository,
    reference_repo: ReferenceRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        agent_repo: AgentRepository,
        reference_repo: ReferenceRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            agent_repo,
            reference_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_agent(&self, payload: &RegisterAgentPayload) -> Result<Agent, AppError> {
        // O escopo geográfico informado precisa existir
        let scope_refs = [
            (ReferenceKind::Country, payload.country_id, "countryId"),
            (ReferenceKind::Franchise, payload.franchise_id, "franchiseId"),
            (ReferenceKind::Branch, payload.branch_id, "branchId"),
            (ReferenceKind::Region, payload.region_id, "regionId"),
        ];
        for (kind, id, field) in scope_refs {
            if let Some(id) = id {
                if !self.reference_repo.exists(&self.pool, kind, id).await? {
                    return Err(field_validation_error(
                        field,
                        &format!("invalid_{}", kind.label()),
                    ));
                }
            }
        }

        // Hashing em thread separada para não travar o runtime
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let agent = self
            .agent_repo
            .create_agent(
                &self.pool,
                &payload.full_name,
                &payload.email,
                &hashed_password,
                payload.role,
                payload.country_id,
                payload.franchise_id,
                payload.branch_id,
                payload.region_id,
            )
            .await?;

        tracing::info!("👤 Agente {} cadastrado como {:?}", agent.email, agent.role);

        Ok(agent)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let agent = self
            .agent_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Agente desativado não entra, mesmo com a senha certa
        if !agent.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = agent.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(agent.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Agent, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.agent_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::NotFound("Agente"))
    }

    fn create_token(&self, agent_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: agent_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
