// src/db/task_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{Task, TaskRemark},
};

const TASK_COLUMNS: &str = r#"
    id, lead_id, agent_id, title, description, due_date,
    is_completed, is_proceed_to_kyc, is_rejected,
    assigned_country_id, created_by, updated_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A tarefa ativa do par (lead, agente). Tarefas de rejeição
    /// ficam de fora: são itens novos, não continuação da antiga.
    pub async fn find_active_for_pair<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE lead_id = $1 AND agent_id = $2 AND NOT is_rejected
            ORDER BY created_at DESC
            LIMIT 1
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(lead_id)
            .bind(agent_id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    /// Metade "update" do upsert: reaproveita a tarefa ativa do par
    /// em vez de acumular duplicatas.
    pub async fn update_task<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        title: &str,
        description: &str,
        due_date: DateTime<Utc>,
        assigned_country_id: Option<Uuid>,
        updated_by: Uuid,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE tasks SET
                title = $2,
                description = $3,
                due_date = $4,
                assigned_country_id = COALESCE($5, assigned_country_id),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(title)
            .bind(description)
            .bind(due_date)
            .bind(assigned_country_id)
            .bind(updated_by)
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    pub async fn insert_task<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        agent_id: Uuid,
        title: &str,
        description: &str,
        due_date: DateTime<Utc>,
        assigned_country_id: Option<Uuid>,
        is_rejected: bool,
        created_by: Uuid,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO tasks (
                lead_id, agent_id, title, description, due_date,
                assigned_country_id, is_rejected, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(lead_id)
            .bind(agent_id)
            .bind(title)
            .bind(description)
            .bind(due_date)
            .bind(assigned_country_id)
            .bind(is_rejected)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    /// Conclui a tarefa como "encaminhada para KYC". Devolve quantas
    /// linhas mudaram: zero significa tarefa inexistente, de outro
    /// lead, ou já concluída. Nesses casos o chamador aborta a transição.
    pub async fn complete_for_kyc<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        lead_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                is_completed = TRUE,
                is_proceed_to_kyc = TRUE,
                updated_at = NOW()
            WHERE id = $1 AND lead_id = $2 AND NOT is_completed
            "#,
        )
        .bind(task_id)
        .bind(lead_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn append_remark<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        remark: &str,
        created_by: Uuid,
    ) -> Result<TaskRemark, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, TaskRemark>(
            r#"
            INSERT INTO task_remarks (task_id, remark, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, remark, created_by, created_at
            "#,
        )
        .bind(task_id)
        .bind(remark)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }
}
