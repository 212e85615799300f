// src/db/agent_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::agent::{Agent, AgentLoad, AgentRole, AssignScope},
};

const AGENT_COLUMNS: &str = r#"
    id, full_name, email, password_hash, role,
    country_id, franchise_id, branch_id, region_id,
    is_active, created_at, updated_at
"#;

#[derive(Clone)]
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CADASTRO / AUTENTICAÇÃO
    // =========================================================================

    pub async fn create_agent<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: &str,
        password_hash: &str,
        role: AgentRole,
        country_id: Option<Uuid>,
        franchise_id: Option<Uuid>,
        branch_id: Option<Uuid>,
        region_id: Option<Uuid>,
    ) -> Result<Agent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO agents (
                full_name, email, password_hash, role,
                country_id, franchise_id, branch_id, region_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {AGENT_COLUMNS}
            "#
        );

        let agent = sqlx::query_as::<_, Agent>(&sql)
            .bind(full_name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(country_id)
            .bind(franchise_id)
            .bind(branch_id)
            .bind(region_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Tratamento de erro de chave duplicada
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })?;

        Ok(agent)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Agent>, AppError> {
        let sql = format!("SELECT {AGENT_COLUMNS} FROM agents WHERE email = $1");

        let agent = sqlx::query_as::<_, Agent>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, AppError> {
        let sql = format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1");

        let agent = sqlx::query_as::<_, Agent>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    // =========================================================================
    //  ELEGIBILIDADE E CARGA (o ranking da distribuição)
    // =========================================================================
    //
    // A carga é contada direto no banco, num agregado único
    // (COUNT + ORDER BY + LIMIT), em vez de trazer linhas e decidir
    // em memória. Conjunto vazio é resultado válido: significa
    // "nenhum agente elegível", e o chamador pula a atribuição.
    //
    // Desempate sempre por id ASC para o resultado ser reprodutível.

    /// Lista os agentes elegíveis para o escopo, do menos para o mais
    /// carregado. CRE conta pelo ponteiro direto em leads; counsellors
    /// contam pelas linhas de lead_counsellors.
    pub async fn resolve_candidates<'e, E>(
        &self,
        executor: E,
        scope: &AssignScope,
    ) -> Result<Vec<AgentLoad>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = match scope {
            AssignScope::Cre => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(l.id) AS "load"
                FROM agents a
                LEFT JOIN leads l ON l.assigned_cre = a.id AND NOT l.is_deleted
                WHERE a.role = 'CRE' AND a.is_active
                GROUP BY a.id
                ORDER BY COUNT(l.id) ASC, a.id ASC
                "#,
            ),
            AssignScope::Counsellor { country_id } => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(lc.lead_id) AS "load"
                FROM agents a
                LEFT JOIN lead_counsellors lc ON lc.counsellor_id = a.id
                WHERE a.role = 'COUNSELLOR' AND a.is_active AND a.country_id = $1
                GROUP BY a.id
                ORDER BY COUNT(lc.lead_id) ASC, a.id ASC
                "#,
            )
            .bind(*country_id),
            AssignScope::FranchiseCounsellor {
                franchise_id,
                country_id,
            } => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(lc.lead_id) AS "load"
                FROM agents a
                LEFT JOIN lead_counsellors lc ON lc.counsellor_id = a.id
                WHERE a.role = 'FRANCHISE_COUNSELLOR' AND a.is_active
                  AND a.franchise_id = $1 AND a.country_id = $2
                GROUP BY a.id
                ORDER BY COUNT(lc.lead_id) ASC, a.id ASC
                "#,
            )
            .bind(*franchise_id)
            .bind(*country_id),
        };

        let ranked = query.fetch_all(executor).await?;
        Ok(ranked)
    }

    /// O mesmo agregado com LIMIT 1: o agente menos carregado do escopo,
    /// ou None quando não há elegíveis.
    pub async fn pick_least_loaded<'e, E>(
        &self,
        executor: E,
        scope: &AssignScope,
    ) -> Result<Option<AgentLoad>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = match scope {
            AssignScope::Cre => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(l.id) AS "load"
                FROM agents a
                LEFT JOIN leads l ON l.assigned_cre = a.id AND NOT l.is_deleted
                WHERE a.role = 'CRE' AND a.is_active
                GROUP BY a.id
                ORDER BY COUNT(l.id) ASC, a.id ASC
                LIMIT 1
                "#,
            ),
            AssignScope::Counsellor { country_id } => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(lc.lead_id) AS "load"
                FROM agents a
                LEFT JOIN lead_counsellors lc ON lc.counsellor_id = a.id
                WHERE a.role = 'COUNSELLOR' AND a.is_active AND a.country_id = $1
                GROUP BY a.id
                ORDER BY COUNT(lc.lead_id) ASC, a.id ASC
                LIMIT 1
                "#,
            )
            .bind(*country_id),
            AssignScope::FranchiseCounsellor {
                franchise_id,
                country_id,
            } => sqlx::query_as::<_, AgentLoad>(
                r#"
                SELECT a.id, COUNT(lc.lead_id) AS "load"
                FROM agents a
                LEFT JOIN lead_counsellors lc ON lc.counsellor_id = a.id
                WHERE a.role = 'FRANCHISE_COUNSELLOR' AND a.is_active
                  AND a.franchise_id = $1 AND a.country_id = $2
                GROUP BY a.id
                ORDER BY COUNT(lc.lead_id) ASC, a.id ASC
                LIMIT 1
                "#,
            )
            .bind(*franchise_id)
            .bind(*country_id),
        };

        let best = query.fetch_optional(executor).await?;
        Ok(best)
    }
}
