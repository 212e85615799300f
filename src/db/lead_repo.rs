// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{
        Lead, LeadCountryStatus, LeadRemark, LeadStage, StudyPreference, StudyPreferenceDetail,
    },
    models::reference::Country,
};

const LEAD_COLUMNS: &str = r#"
    id, full_name, email, phone, mobile, stage,
    source_id, channel_id, branch_id,
    assigned_cre, assigned_cre_tl, assigned_regional_manager,
    assigned_branch_counselor, assigned_counsellor_tl,
    is_deleted, created_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEAD (o registro em si)
    // =========================================================================

    pub async fn insert_lead<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: &str,
        phone: &str,
        mobile: Option<&str>,
        source_id: Option<Uuid>,
        channel_id: Option<Uuid>,
        branch_id: Option<Uuid>,
        created_by: Uuid,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO leads (
                full_name, email, phone, mobile,
                source_id, channel_id, branch_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .bind(mobile)
            .bind(source_id)
            .bind(channel_id)
            .bind(branch_id)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // E-mail/telefone duplicado entre leads vivos
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation(
                            "Já existe um lead ativo com este e-mail ou telefone.".into(),
                        );
                    }
                }
                e.into()
            })?;

        Ok(lead)
    }

    /// Busca um lead vivo (soft-delete filtrado aqui, não no chamador).
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND NOT is_deleted");

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(lead)
    }

    pub async fn update_lead<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        mobile: Option<&str>,
        source_id: Option<Uuid>,
        channel_id: Option<Uuid>,
        branch_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // COALESCE mantém o valor atual quando o campo não veio no payload
        let sql = format!(
            r#"
            UPDATE leads SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                mobile = COALESCE($5, mobile),
                source_id = COALESCE($6, source_id),
                channel_id = COALESCE($7, channel_id),
                branch_id = COALESCE($8, branch_id),
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .bind(mobile)
            .bind(source_id)
            .bind(channel_id)
            .bind(branch_id)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation(
                            "Já existe um lead ativo com este e-mail ou telefone.".into(),
                        );
                    }
                }
                e.into()
            })?;

        Ok(lead)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE leads SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stage: LeadStage,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE leads SET stage = $2, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(stage)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ATRIBUIÇÕES
    // =========================================================================

    pub async fn set_assigned_cre<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        agent_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE leads SET assigned_cre = $2, stage = 'CRE', updated_at = NOW() WHERE id = $1",
        )
        .bind(lead_id)
        .bind(agent_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Vincula um counsellor ao lead. Idempotente: o par já existente
    /// não gera linha nova nem erro.
    pub async fn link_counsellor<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        counsellor_id: Uuid,
        country_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO lead_counsellors (lead_id, counsellor_id, country_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(lead_id)
        .bind(counsellor_id)
        .bind(country_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  STATUS POR PAÍS
    // =========================================================================

    pub async fn upsert_country_status<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        country_id: Uuid,
        status_id: Option<Uuid>,
        followup_date: Option<DateTime<Utc>>,
    ) -> Result<LeadCountryStatus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, LeadCountryStatus>(
            r#"
            INSERT INTO lead_countries (lead_id, country_id, status_id, followup_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (lead_id, country_id) DO UPDATE SET
                status_id = EXCLUDED.status_id,
                followup_date = EXCLUDED.followup_date,
                updated_at = NOW()
            RETURNING lead_id, country_id, status_id, followup_date, updated_at
            "#,
        )
        .bind(lead_id)
        .bind(country_id)
        .bind(status_id)
        .bind(followup_date)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn list_country_statuses<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<LeadCountryStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LeadCountryStatus>(
            r#"
            SELECT lead_id, country_id, status_id, followup_date, updated_at
            FROM lead_countries
            WHERE lead_id = $1
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  REMARKS (tabela filha, append-only)
    // =========================================================================

    pub async fn append_remark<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        remark: &str,
        status_id: Option<Uuid>,
        created_by: Uuid,
    ) -> Result<LeadRemark, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, LeadRemark>(
            r#"
            INSERT INTO lead_remarks (lead_id, remark, status_id, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, lead_id, remark, status_id, created_by, created_at
            "#,
        )
        .bind(lead_id)
        .bind(remark)
        .bind(status_id)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn list_remarks<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<LeadRemark>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LeadRemark>(
            r#"
            SELECT id, lead_id, remark, status_id, created_by, created_at
            FROM lead_remarks
            WHERE lead_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  PREFERÊNCIAS DE ESTUDO
    // =========================================================================

    pub async fn create_study_preference<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        country_id: Uuid,
    ) -> Result<StudyPreference, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, StudyPreference>(
            r#"
            INSERT INTO study_preferences (lead_id, country_id)
            VALUES ($1, $2)
            RETURNING id, lead_id, country_id, created_at
            "#,
        )
        .bind(lead_id)
        .bind(country_id)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn create_study_preference_detail<'e, E>(
        &self,
        executor: E,
        study_preference_id: Uuid,
        university_name: &str,
        campus: Option<&str>,
        course_name: &str,
        intake_year: Option<i32>,
    ) -> Result<StudyPreferenceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, StudyPreferenceDetail>(
            r#"
            INSERT INTO study_preference_details (
                study_preference_id, university_name, campus, course_name, intake_year
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, study_preference_id, university_name, campus,
                      course_name, intake_year, created_at
            "#,
        )
        .bind(study_preference_id)
        .bind(university_name)
        .bind(campus)
        .bind(course_name)
        .bind(intake_year)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Países de interesse do lead, deduplicados, em ordem de código
    /// (a ordem entra na composição do título da tarefa).
    pub async fn preferred_countries<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<Country>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Country>(
            r#"
            SELECT DISTINCT c.id, c.name, c.code
            FROM countries c
            INNER JOIN study_preferences sp ON sp.country_id = c.id
            WHERE sp.lead_id = $1
            ORDER BY c.code ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Todos os detalhes de preferência do lead (insumo do template
    /// de descrição da tarefa).
    pub async fn details_for_lead<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<StudyPreferenceDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StudyPreferenceDetail>(
            r#"
            SELECT d.id, d.study_preference_id, d.university_name, d.campus,
                   d.course_name, d.intake_year, d.created_at
            FROM study_preference_details d
            INNER JOIN study_preferences sp ON sp.id = d.study_preference_id
            WHERE sp.lead_id = $1
            ORDER BY d.created_at ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Detalhes de preferência do lead restritos a um país
    /// (é deles que nascem as applications no proceedToKyc).
    pub async fn details_for_country<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        country_id: Uuid,
    ) -> Result<Vec<StudyPreferenceDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StudyPreferenceDetail>(
            r#"
            SELECT d.id, d.study_preference_id, d.university_name, d.campus,
                   d.course_name, d.intake_year, d.created_at
            FROM study_preference_details d
            INNER JOIN study_preferences sp ON sp.id = d.study_preference_id
            WHERE sp.lead_id = $1 AND sp.country_id = $2
            ORDER BY d.created_at ASC
            "#,
        )
        .bind(lead_id)
        .bind(country_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
