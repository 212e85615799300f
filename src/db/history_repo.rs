// src/db/history_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::history::HistoryEntry};

// A trilha de auditoria só conhece INSERT e SELECT.
// Não existe método de update ou delete de propósito.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acrescenta uma entrada. Deve ser chamado SEMPRE dentro da
    /// transação da mutação que ele documenta. Nunca avulso, senão
    /// um rollback deixaria histórico órfão.
    pub async fn append<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        action: &str,
        action_by: Uuid,
        country_id: Option<Uuid>,
    ) -> Result<HistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO lead_history (lead_id, action, action_by, country_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, lead_id, action, action_by, country_id, created_at
            "#,
        )
        .bind(lead_id)
        .bind(action)
        .bind(action_by)
        .bind(country_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    /// Leitura do mais novo para o mais antigo; id desempata
    /// inserções no mesmo instante.
    pub async fn list_for_lead<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<HistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT id, lead_id, action, action_by, country_id, created_at
            FROM lead_history
            WHERE lead_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }
}
