// src/services/kyc_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::db_utils::expect_rows_affected,
    common::error::AppError,
    db::{ApplicationRepository, HistoryRepository, LeadRepository, ReferenceRepository, TaskRepository},
    models::agent::Agent,
    models::application::{Application, KycStatus},
    models::lead::LeadStage,
    models::reference::ReferenceKind,
    services::task_service::TaskService,
};

// A máquina de estados do KYC:
//
//   INTAKE -> AWAITING_KYC -> (APROVADO | REJEITADO)
//
// proceedToKyc materializa/reativa as applications; aprovação entrega
// ao application manager; rejeição desfaz status do país e devolve o
// lead ao counsellor com uma tarefa corretiva. Cada transição roda
// inteira numa transação: falhou um passo, nada persiste.
#[derive(Clone)]
pub struct KycService {
    pool: PgPool,
    application_repo: ApplicationRepository,
    task_repo: TaskRepository,
    lead_repo: LeadRepository,
    history_repo: HistoryRepository,
    reference_repo: ReferenceRepository,
    task_service: TaskService,
    followup_status_slug: String,
}

/// Aprovar/rejeitar exige a application ainda aguardando KYC.
pub(crate) fn ensure_awaiting_kyc(application: &Application) -> Result<(), AppError> {
    if application.kyc_status != KycStatus::Pending {
        return Err(AppError::IntegrityFailure(
            "A application não está aguardando verificação de KYC.".into(),
        ));
    }
    Ok(())
}

impl KycService {
    pub fn new(
        pool: PgPool,
        application_repo: ApplicationRepository,
        task_repo: TaskRepository,
        lead_repo: LeadRepository,
        history_repo: HistoryRepository,
        reference_repo: ReferenceRepository,
        task_service: TaskService,
        followup_status_slug: String,
    ) -> Self {
        Self {
            pool,
            application_repo,
            task_repo,
            lead_repo,
            history_repo,
            reference_repo,
            task_service,
            followup_status_slug,
        }
    }

    // =========================================================================
    //  INTAKE -> AWAITING_KYC
    // =========================================================================

    /// Encaminha o lead para KYC no escopo de um país:
    /// 1. exige ao menos um detalhe de preferência naquele país;
    /// 2. conclui a tarefa de follow-up (zero linhas afetadas = aborta);
    /// 3. cria a application + eligibility check de cada detalhe, ou
    ///    reativa a application existente (re-submissão);
    /// 4. status do país vira "KYC pendente", stage do lead vira KYC.
    pub async fn proceed_to_kyc(
        &self,
        student_id: Uuid,
        task_id: Uuid,
        country_id: Uuid,
        actor: &Agent,
    ) -> Result<Vec<Application>, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .lead_repo
            .find_by_id(&mut *tx, student_id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        if !self
            .reference_repo
            .exists(&mut *tx, ReferenceKind::Country, country_id)
            .await?
        {
            return Err(AppError::NotFound("País"));
        }

        let details = self
            .lead_repo
            .details_for_country(&mut *tx, lead.id, country_id)
            .await?;
        if details.is_empty() {
            return Err(AppError::IntegrityFailure(
                "O lead não possui preferências de estudo para este país.".into(),
            ));
        }

        // Sem tarefa concluída não há progressão; nenhuma escrita sobrevive.
        let rows = self.task_repo.complete_for_kyc(&mut *tx, task_id, lead.id).await?;
        expect_rows_affected(rows, "tasks")?;

        let mut applications = Vec::with_capacity(details.len());
        for detail in &details {
            let existing = self.application_repo.find_by_detail(&mut *tx, detail.id).await?;

            let application = match existing {
                // Re-submissão: volta a pendente e limpa a rejeição
                Some(app) => {
                    self.application_repo
                        .reset_to_pending(&mut *tx, app.id, Some(actor.id))
                        .await?
                }
                None => {
                    self.application_repo
                        .insert(&mut *tx, detail.id, Some(actor.id))
                        .await?
                }
            };

            self.application_repo
                .insert_eligibility_defaults(&mut *tx, application.id)
                .await?;

            applications.push(application);
        }

        if let Some(status) = self
            .reference_repo
            .find_status_by_slug(&mut *tx, "kyc_pending")
            .await?
        {
            self.lead_repo
                .upsert_country_status(&mut *tx, lead.id, country_id, Some(status.id), None)
                .await?;
        }

        self.lead_repo.update_stage(&mut *tx, lead.id, LeadStage::Kyc).await?;

        self.history_repo
            .append(
                &mut *tx,
                lead.id,
                "Lead encaminhado para verificação de KYC",
                actor.id,
                Some(country_id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📋 Lead {} encaminhado para KYC com {} application(s)",
            lead.id,
            applications.len()
        );

        Ok(applications)
    }

    // =========================================================================
    //  AWAITING_KYC -> APROVADO
    // =========================================================================

    /// Aprova o KYC: a application segue para o application manager e
    /// o lead avança para o estágio de application.
    pub async fn approve_kyc(
        &self,
        application_id: Uuid,
        student_id: Uuid,
        actor: &Agent,
    ) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .lead_repo
            .find_by_id(&mut *tx, student_id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        let application = self
            .application_repo
            .find_by_id(&mut *tx, application_id)
            .await?
            .ok_or(AppError::NotFound("Application"))?;

        // A application precisa ser alcançável a partir de uma
        // preferência ativa DESTE lead.
        if !self
            .application_repo
            .belongs_to_lead(&mut *tx, application.id, lead.id)
            .await?
        {
            return Err(AppError::NotFound("Application"));
        }

        ensure_awaiting_kyc(&application)?;

        let approved = self.application_repo.approve(&mut *tx, application.id).await?;

        self.lead_repo
            .update_stage(&mut *tx, lead.id, LeadStage::Application)
            .await?;

        self.history_repo
            .append(
                &mut *tx,
                lead.id,
                "KYC aprovado; application liberada para o application manager",
                actor.id,
                None,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("✅ KYC aprovado para a application {}", approved.id);

        Ok(approved)
    }

    // =========================================================================
    //  AWAITING_KYC -> REJEITADO (com compensações)
    // =========================================================================

    /// Rejeita o KYC e compensa: remark na application, status do país
    /// de volta a follow-up com data = agora, tarefa corretiva NOVA
    /// para o counsellor original e duas entradas de histórico.
    pub async fn reject_kyc(
        &self,
        application_id: Uuid,
        student_id: Uuid,
        remarks: &str,
        country_id: Uuid,
        actor: &Agent,
    ) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .lead_repo
            .find_by_id(&mut *tx, student_id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        let application = self
            .application_repo
            .find_by_id(&mut *tx, application_id)
            .await?
            .ok_or(AppError::NotFound("Application"))?;

        if !self
            .application_repo
            .belongs_to_lead(&mut *tx, application.id, lead.id)
            .await?
        {
            return Err(AppError::NotFound("Application"));
        }

        let countries = self
            .reference_repo
            .countries_by_ids(&mut *tx, &[country_id])
            .await?;
        let country = countries.first().ok_or(AppError::NotFound("País"))?;

        ensure_awaiting_kyc(&application)?;

        let rejected = self.application_repo.reject(&mut *tx, application.id).await?;

        self.application_repo
            .append_remark(&mut *tx, rejected.id, remarks, actor.id)
            .await?;

        // Status do país volta ao follow-up, com vencimento imediato
        let followup = self
            .reference_repo
            .find_status_by_slug(&mut *tx, &self.followup_status_slug)
            .await?
            .ok_or_else(|| {
                AppError::IntegrityFailure(format!(
                    "Status de follow-up '{}' não está cadastrado.",
                    self.followup_status_slug
                ))
            })?;

        self.lead_repo
            .upsert_country_status(
                &mut *tx,
                lead.id,
                country_id,
                Some(followup.id),
                Some(Utc::now()),
            )
            .await?;

        // A tarefa corretiva volta para o counsellor responsável
        let counsellor_id = rejected.counsellor_id.ok_or_else(|| {
            AppError::IntegrityFailure("A application não tem counsellor responsável.".into())
        })?;

        self.task_service
            .create_rejection_task(&mut *tx, &lead, counsellor_id, country, remarks, actor.id)
            .await?;

        self.lead_repo
            .update_stage(&mut *tx, lead.id, LeadStage::Counsellor)
            .await?;

        self.history_repo
            .append(
                &mut *tx,
                lead.id,
                &format!("KYC rejeitado: {remarks}"),
                actor.id,
                Some(country_id),
            )
            .await?;
        self.history_repo
            .append(
                &mut *tx,
                lead.id,
                "Tarefa corretiva criada para o counsellor",
                actor.id,
                Some(country_id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🚫 KYC rejeitado para a application {}", rejected.id);

        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;

    fn application(kyc: KycStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            study_preference_detail_id: Uuid::new_v4(),
            application_status: ApplicationStatus::Pending,
            kyc_status: kyc,
            is_rejected_kyc: false,
            proceed_to_application_manager: false,
            counsellor_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pendente_pode_ser_decidida() {
        assert!(ensure_awaiting_kyc(&application(KycStatus::Pending)).is_ok());
    }

    #[test]
    fn ja_aprovada_nao_pode_ser_decidida_de_novo() {
        let err = ensure_awaiting_kyc(&application(KycStatus::Approved)).unwrap_err();
        assert!(matches!(err, AppError::IntegrityFailure(_)));
    }

    #[test]
    fn ja_rejeitada_nao_pode_ser_decidida_de_novo() {
        assert!(ensure_awaiting_kyc(&application(KycStatus::Rejected)).is_err());
    }
}
