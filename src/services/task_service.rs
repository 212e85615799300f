// src/services/task_service.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, TaskRepository},
    models::lead::Lead,
    models::reference::Country,
    models::task::Task,
    services::templates,
};

// Ciclo de vida da tarefa de follow-up: uma ativa por par
// (lead, agente). Os métodos recebem a conexão da transação aberta
// pelo chamador; tarefa nunca é gravada fora da mutação que a gerou.
#[derive(Clone)]
pub struct TaskService {
    task_repo: TaskRepository,
    lead_repo: LeadRepository,
    default_due_days: i64,
}

/// Título determinístico: "<nome do lead> - <códigos de país>".
pub(crate) fn compose_title(full_name: &str, countries: &[Country]) -> String {
    let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
    format!("{} - {}", full_name, codes.join(", "))
}

/// Vencimento: o informado pelo chamador (ex.: data de follow-up de
/// uma mudança de status) ou agora + prazo padrão.
pub(crate) fn resolve_due_date(
    explicit: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    default_days: i64,
) -> DateTime<Utc> {
    explicit.unwrap_or(now + Duration::days(default_days))
}

impl TaskService {
    pub fn new(task_repo: TaskRepository, lead_repo: LeadRepository, default_due_days: i64) -> Self {
        Self {
            task_repo,
            lead_repo,
            default_due_days,
        }
    }

    /// Upsert da tarefa do par (lead, agente): atualiza a ativa se
    /// existir, senão cria. Nunca acumula duplicatas.
    ///
    /// `country_scope` restringe o título a um país (tarefa de
    /// counsellor); sem ele o título junta todos os países de
    /// interesse (tarefa de CRE).
    pub async fn upsert_followup(
        &self,
        conn: &mut PgConnection,
        lead: &Lead,
        agent_id: Uuid,
        due_date: Option<DateTime<Utc>>,
        country_scope: Option<&Country>,
        actor_id: Uuid,
    ) -> Result<Task, AppError> {
        let preferred = self.lead_repo.preferred_countries(&mut *conn, lead.id).await?;
        let details = self.lead_repo.details_for_lead(&mut *conn, lead.id).await?;

        // Se o template falhar, o `?` derruba a transação do chamador.
        let description = templates::render_task_description(lead, &preferred, &details)?;

        let title_countries = match country_scope {
            Some(country) => std::slice::from_ref(country),
            None => preferred.as_slice(),
        };
        let title = compose_title(&lead.full_name, title_countries);

        let due = resolve_due_date(due_date, Utc::now(), self.default_due_days);
        let country_id = country_scope.map(|c| c.id);

        let existing = self
            .task_repo
            .find_active_for_pair(&mut *conn, lead.id, agent_id)
            .await?;

        let task = match existing {
            Some(task) => {
                self.task_repo
                    .update_task(&mut *conn, task.id, &title, &description, due, country_id, actor_id)
                    .await?
            }
            None => {
                self.task_repo
                    .insert_task(
                        &mut *conn,
                        lead.id,
                        agent_id,
                        &title,
                        &description,
                        due,
                        country_id,
                        false,
                        actor_id,
                    )
                    .await?
            }
        };

        Ok(task)
    }

    /// Rejeição de KYC sempre produz uma tarefa NOVA (is_rejected),
    /// com o remark anexado; a tarefa original fica como registro.
    pub async fn create_rejection_task(
        &self,
        conn: &mut PgConnection,
        lead: &Lead,
        counsellor_id: Uuid,
        country: &Country,
        remark: &str,
        actor_id: Uuid,
    ) -> Result<Task, AppError> {
        let preferred = self.lead_repo.preferred_countries(&mut *conn, lead.id).await?;
        let details = self.lead_repo.details_for_lead(&mut *conn, lead.id).await?;
        let description = templates::render_task_description(lead, &preferred, &details)?;

        let title = compose_title(&lead.full_name, std::slice::from_ref(country));
        let due = resolve_due_date(None, Utc::now(), self.default_due_days);

        let task = self
            .task_repo
            .insert_task(
                &mut *conn,
                lead.id,
                counsellor_id,
                &title,
                &description,
                due,
                Some(country.id),
                true,
                actor_id,
            )
            .await?;

        self.task_repo
            .append_remark(&mut *conn, task.id, remark, actor_id)
            .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pais(code: &str) -> Country {
        Country {
            id: Uuid::new_v4(),
            name: code.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn titulo_junta_os_codigos_por_virgula() {
        let titulo = compose_title("João Pereira", &[pais("CA"), pais("UK"), pais("US")]);
        assert_eq!(titulo, "João Pereira - CA, UK, US");
    }

    #[test]
    fn titulo_com_um_pais_so() {
        let titulo = compose_title("João Pereira", &[pais("US")]);
        assert_eq!(titulo, "João Pereira - US");
    }

    #[test]
    fn vencimento_padrao_e_amanha() {
        let agora = Utc::now();
        let due = resolve_due_date(None, agora, 1);
        assert_eq!(due, agora + Duration::days(1));
    }

    #[test]
    fn vencimento_explicito_prevalece() {
        let agora = Utc::now();
        let followup = agora + Duration::days(10);
        let due = resolve_due_date(Some(followup), agora, 1);
        assert_eq!(due, followup);
    }
}
