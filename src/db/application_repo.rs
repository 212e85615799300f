// src/db/application_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::application::{Application, ApplicationRemark},
};

const APPLICATION_COLUMNS: &str = r#"
    id, study_preference_detail_id, application_status, kyc_status,
    is_rejected_kyc, proceed_to_application_manager, counsellor_id,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Application>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(application)
    }

    pub async fn find_by_detail<'e, E>(
        &self,
        executor: E,
        study_preference_detail_id: Uuid,
    ) -> Result<Option<Application>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE study_preference_detail_id = $1"
        );

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(study_preference_detail_id)
            .fetch_optional(executor)
            .await?;

        Ok(application)
    }

    /// A application só é aprovável/rejeitável se pertencer ao lead
    /// através de um detalhe de preferência ativo. Fora disso a
    /// operação é recusada, não "indefinida".
    pub async fn belongs_to_lead<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
        lead_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM applications a
                JOIN study_preference_details d ON d.id = a.study_preference_detail_id
                JOIN study_preferences sp ON sp.id = d.study_preference_id
                WHERE a.id = $1 AND sp.lead_id = $2
            )
            "#,
        )
        .bind(application_id)
        .bind(lead_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        study_preference_detail_id: Uuid,
        counsellor_id: Option<Uuid>,
    ) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO applications (study_preference_detail_id, counsellor_id)
            VALUES ($1, $2)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(study_preference_detail_id)
            .bind(counsellor_id)
            .fetch_one(executor)
            .await?;

        Ok(application)
    }

    /// Caminho de re-submissão: a application volta ao estado
    /// pendente e perde as marcas de rejeição.
    pub async fn reset_to_pending<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
        counsellor_id: Option<Uuid>,
    ) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE applications SET
                application_status = 'PENDING',
                kyc_status = 'PENDING',
                is_rejected_kyc = FALSE,
                proceed_to_application_manager = FALSE,
                counsellor_id = COALESCE($2, counsellor_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .bind(counsellor_id)
            .fetch_one(executor)
            .await?;

        Ok(application)
    }

    pub async fn approve<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
    ) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE applications SET
                application_status = 'APPROVED',
                kyc_status = 'APPROVED',
                proceed_to_application_manager = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .fetch_one(executor)
            .await?;

        Ok(application)
    }

    pub async fn reject<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
    ) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE applications SET
                application_status = 'REJECTED',
                kyc_status = 'REJECTED',
                is_rejected_kyc = TRUE,
                proceed_to_application_manager = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .fetch_one(executor)
            .await?;

        Ok(application)
    }

    /// As sete verificações nascem falsas junto com a application.
    /// ON CONFLICT cobre a re-submissão (a linha já existe).
    pub async fn insert_eligibility_defaults<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO eligibility_checks (application_id)
            VALUES ($1)
            ON CONFLICT (application_id) DO NOTHING
            "#,
        )
        .bind(application_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn append_remark<'e, E>(
        &self,
        executor: E,
        application_id: Uuid,
        remark: &str,
        created_by: Uuid,
    ) -> Result<ApplicationRemark, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ApplicationRemark>(
            r#"
            INSERT INTO application_remarks (application_id, remark, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, application_id, remark, created_by, created_at
            "#,
        )
        .bind(application_id)
        .bind(remark)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }
}
