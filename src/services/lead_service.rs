// src/services/lead_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{field_validation_error, AppError},
    db::{HistoryRepository, LeadRepository, ReferenceRepository},
    models::agent::Agent,
    models::history::HistoryEntry,
    models::lead::{
        CreateLeadPayload, Lead, LeadCountryStatus, LeadDetails, UpdateLeadPayload,
        UpdateLeadStatusPayload,
    },
    models::reference::ReferenceKind,
    services::assignment_service::AssignmentService,
    services::task_service::TaskService,
};

#[derive(Clone)]
pub struct LeadService {
    pool: PgPool,
    lead_repo: LeadRepository,
    reference_repo: ReferenceRepository,
    history_repo: HistoryRepository,
    assignment: AssignmentService,
    task_service: TaskService,
}

impl LeadService {
    pub fn new(
        pool: PgPool,
        lead_repo: LeadRepository,
        reference_repo: ReferenceRepository,
        history_repo: HistoryRepository,
        assignment: AssignmentService,
        task_service: TaskService,
    ) -> Self {
        Self {
            pool,
            lead_repo,
            reference_repo,
            history_repo,
            assignment,
            task_service,
        }
    }

    // =========================================================================
    //  INTAKE
    // =========================================================================

    /// Cria o lead, suas preferências e o status inicial por país,
    /// e já o entrega ao CRE menos carregado, tudo numa transação.
    pub async fn create_lead(
        &self,
        payload: &CreateLeadPayload,
        actor: &Agent,
    ) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Referências precisam existir antes de qualquer escrita
        self.check_reference(&mut tx, ReferenceKind::Source, payload.source_id, "sourceId")
            .await?;
        self.check_reference(&mut tx, ReferenceKind::Channel, payload.channel_id, "channelId")
            .await?;
        self.check_reference(&mut tx, ReferenceKind::Branch, payload.branch_id, "branchId")
            .await?;

        let mut country_ids: Vec<Uuid> =
            payload.study_preferences.iter().map(|p| p.country_id).collect();
        country_ids.sort();
        country_ids.dedup();
        for country_id in &country_ids {
            if !self
                .reference_repo
                .exists(&mut *tx, ReferenceKind::Country, *country_id)
                .await?
            {
                return Err(field_validation_error("studyPreferences", "invalid_country"));
            }
        }

        // 2. O lead em si (duplicidade de e-mail/telefone explode aqui)
        let lead = self
            .lead_repo
            .insert_lead(
                &mut *tx,
                &payload.full_name,
                &payload.email,
                &payload.phone,
                payload.mobile.as_deref(),
                payload.source_id,
                payload.channel_id,
                payload.branch_id,
                actor.id,
            )
            .await?;

        // 3. Preferências + status inicial por país
        let initial_status = self
            .reference_repo
            .find_status_by_slug(&mut *tx, "new")
            .await?;

        for preference in &payload.study_preferences {
            let created = self
                .lead_repo
                .create_study_preference(&mut *tx, lead.id, preference.country_id)
                .await?;

            for detail in &preference.details {
                self.lead_repo
                    .create_study_preference_detail(
                        &mut *tx,
                        created.id,
                        &detail.university_name,
                        detail.campus.as_deref(),
                        &detail.course_name,
                        detail.intake_year,
                    )
                    .await?;
            }
        }
        for country_id in &country_ids {
            self.lead_repo
                .upsert_country_status(
                    &mut *tx,
                    lead.id,
                    *country_id,
                    initial_status.as_ref().map(|s| s.id),
                    None,
                )
                .await?;
        }

        self.history_repo
            .append(&mut *tx, lead.id, "Lead criado", actor.id, None)
            .await?;

        // 4. Distribuição imediata ao CRE (sem elegível não é erro)
        self.assignment
            .assign_cre_on_intake(&mut *tx, &lead, actor.id)
            .await?;

        // Relê para devolver os ponteiros de atribuição já preenchidos
        let lead = self
            .lead_repo
            .find_by_id(&mut *tx, lead.id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        tx.commit().await?;

        tracing::info!("🎓 Lead {} criado e distribuído", lead.id);

        Ok(lead)
    }

    pub async fn update_lead(
        &self,
        id: Uuid,
        payload: &UpdateLeadPayload,
        actor: &Agent,
    ) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        self.check_reference(&mut tx, ReferenceKind::Source, payload.source_id, "sourceId")
            .await?;
        self.check_reference(&mut tx, ReferenceKind::Channel, payload.channel_id, "channelId")
            .await?;
        self.check_reference(&mut tx, ReferenceKind::Branch, payload.branch_id, "branchId")
            .await?;

        let lead = self
            .lead_repo
            .update_lead(
                &mut *tx,
                id,
                payload.full_name.as_deref(),
                payload.email.as_deref(),
                payload.phone.as_deref(),
                payload.mobile.as_deref(),
                payload.source_id,
                payload.channel_id,
                payload.branch_id,
            )
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        self.history_repo
            .append(&mut *tx, lead.id, "Lead atualizado", actor.id, None)
            .await?;

        tx.commit().await?;

        Ok(lead)
    }

    /// Soft delete: o registro fica, some das consultas.
    pub async fn delete_lead(&self, id: Uuid, actor: &Agent) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = self.lead_repo.soft_delete(&mut *tx, id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("Lead"));
        }

        self.history_repo
            .append(&mut *tx, id, "Lead removido", actor.id, None)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn get_lead(&self, id: Uuid) -> Result<LeadDetails, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        let countries = self.lead_repo.list_country_statuses(&self.pool, id).await?;
        let remarks = self.lead_repo.list_remarks(&self.pool, id).await?;

        Ok(LeadDetails {
            lead,
            countries,
            remarks,
        })
    }

    pub async fn lead_history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
        self.lead_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        self.history_repo.list_for_lead(&self.pool, id).await
    }

    // =========================================================================
    //  STATUS POR PAÍS (com portão por cargo)
    // =========================================================================

    /// Muda o status do lead em um país. O par (status, cargo) precisa
    /// estar na matriz de acesso; senão 403, sem nenhuma escrita.
    /// A data de follow-up informada vira o vencimento da tarefa.
    pub async fn update_lead_status(
        &self,
        lead_id: Uuid,
        payload: &UpdateLeadStatusPayload,
        actor: &Agent,
    ) -> Result<LeadCountryStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        // O portão por cargo vem antes de tudo: o par (status, cargo)
        // fora da matriz derruba a operação, não importa o resto do
        // payload. Status inexistente também cai aqui (não está na
        // matriz para cargo nenhum).
        if !self
            .reference_repo
            .role_can_set_status(&mut *tx, actor.role, payload.status_id)
            .await?
        {
            return Err(AppError::StatusNotAllowed);
        }

        let lead = self
            .lead_repo
            .find_by_id(&mut *tx, lead_id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        let countries = self
            .reference_repo
            .countries_by_ids(&mut *tx, &[payload.country_id])
            .await?;
        let Some(country) = countries.first() else {
            return Err(field_validation_error("countryId", "invalid_country"));
        };

        let row = self
            .lead_repo
            .upsert_country_status(
                &mut *tx,
                lead.id,
                country.id,
                Some(payload.status_id),
                payload.followup_date,
            )
            .await?;

        // A tarefa de follow-up do agente acompanha a mudança
        self.task_service
            .upsert_followup(
                &mut *tx,
                &lead,
                actor.id,
                payload.followup_date,
                Some(country),
                actor.id,
            )
            .await?;

        if let Some(remark) = &payload.remark {
            self.lead_repo
                .append_remark(&mut *tx, lead.id, remark, Some(payload.status_id), actor.id)
                .await?;
        }

        self.history_repo
            .append(
                &mut *tx,
                lead.id,
                "Status do lead atualizado",
                actor.id,
                Some(country.id),
            )
            .await?;

        tx.commit().await?;

        Ok(row)
    }

    // --- helpers ---

    async fn check_reference(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: ReferenceKind,
        id: Option<Uuid>,
        field: &str,
    ) -> Result<(), AppError> {
        if let Some(id) = id {
            if !self.reference_repo.exists(&mut **tx, kind, id).await? {
                return Err(field_validation_error(field, &format!("invalid_{}", kind.label())));
            }
        }
        Ok(())
    }
}
