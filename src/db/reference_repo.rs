// src/db/reference_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::agent::AgentRole,
    models::reference::{Country, ReferenceKind, Status},
};

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checagem de existência de dados de referência.
    /// O CRUD dessas tabelas fica fora deste serviço.
    pub async fn exists<'e, E>(
        &self,
        executor: E,
        kind: ReferenceKind,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = match kind {
            ReferenceKind::Country => "SELECT EXISTS (SELECT 1 FROM countries WHERE id = $1)",
            ReferenceKind::Branch => "SELECT EXISTS (SELECT 1 FROM branches WHERE id = $1)",
            ReferenceKind::Source => "SELECT EXISTS (SELECT 1 FROM sources WHERE id = $1)",
            ReferenceKind::Channel => "SELECT EXISTS (SELECT 1 FROM channels WHERE id = $1)",
            ReferenceKind::Franchise => "SELECT EXISTS (SELECT 1 FROM franchises WHERE id = $1)",
            ReferenceKind::Region => "SELECT EXISTS (SELECT 1 FROM regions WHERE id = $1)",
        };

        let exists: bool = sqlx::query_scalar(sql).bind(id).fetch_one(executor).await?;

        Ok(exists)
    }

    pub async fn find_status_by_slug<'e, E>(
        &self,
        executor: E,
        slug: &str,
    ) -> Result<Option<Status>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_as::<_, Status>(
            "SELECT id, name, slug, created_at FROM statuses WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(executor)
        .await?;

        Ok(status)
    }

    pub async fn countries_by_ids<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<Country>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O SQLx lida bem com arrays usando ANY
        let countries = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, code
            FROM countries
            WHERE id = ANY($1)
            ORDER BY code ASC
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(countries)
    }

    /// O portão do updateLeadStatus: o par (status, cargo) precisa
    /// estar na matriz status_access_roles.
    pub async fn role_can_set_status<'e, E>(
        &self,
        executor: E,
        role: AgentRole,
        status_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM status_access_roles
                WHERE status_id = $1 AND role = $2
            )
            "#,
        )
        .bind(status_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(allowed)
    }
}
