// src/services/assignment_service.rs

use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AgentRepository, HistoryRepository, LeadRepository},
    models::agent::{Agent, AgentLoad, AssignScope, AssignedPair, AssignmentOutcome, UnassignedTarget},
    models::lead::{Lead, LeadStage},
    models::reference::Country,
    services::task_service::TaskService,
};

// Distribuição de leads: o resolver de elegibilidade/carga vive no
// AgentRepository; aqui fica a seleção (único e lote) e a orquestração
// atribuição + tarefa + histórico, uma transação por lead.
#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
    agent_repo: AgentRepository,
    lead_repo: LeadRepository,
    history_repo: HistoryRepository,
    task_service: TaskService,
}

/// Distribuição cíclica do lote: o alvo de índice `i` fica com
/// `ranked[i % K]`. Lista vazia significa "ninguém elegível".
pub(crate) fn cyclic_pick(ranked: &[AgentLoad], index: usize) -> Option<&AgentLoad> {
    if ranked.is_empty() {
        return None;
    }
    ranked.get(index % ranked.len())
}

/// Escopo de counsellor para o país, conforme o agente que pede:
/// agentes de franquia só distribuem dentro da própria franquia.
pub(crate) fn counsellor_scope(actor: &Agent, country_id: Uuid) -> AssignScope {
    match actor.franchise_id {
        Some(franchise_id) => AssignScope::FranchiseCounsellor {
            franchise_id,
            country_id,
        },
        None => AssignScope::Counsellor { country_id },
    }
}

impl AssignmentService {
    pub fn new(
        pool: PgPool,
        agent_repo: AgentRepository,
        lead_repo: LeadRepository,
        history_repo: HistoryRepository,
        task_service: TaskService,
    ) -> Self {
        Self {
            pool,
            agent_repo,
            lead_repo,
            history_repo,
            task_service,
        }
    }

    // =========================================================================
    //  MODO ÚNICO
    // =========================================================================

    /// Atribui o CRE menos carregado a um lead recém-criado, já dentro
    /// da transação do createLead. Sem CRE ativo não é erro: o lead
    /// fica sem atribuição e o chamador segue.
    pub async fn assign_cre_on_intake(
        &self,
        conn: &mut PgConnection,
        lead: &Lead,
        actor_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let best = self
            .agent_repo
            .pick_least_loaded(&mut *conn, &AssignScope::Cre)
            .await?;

        let Some(cre) = best else {
            tracing::warn!("⚠️ Nenhum CRE ativo para receber o lead {}", lead.id);
            return Ok(None);
        };

        self.lead_repo
            .set_assigned_cre(&mut *conn, lead.id, cre.id)
            .await?;

        self.task_service
            .upsert_followup(&mut *conn, lead, cre.id, None, None, actor_id)
            .await?;

        self.history_repo
            .append(&mut *conn, lead.id, "Lead atribuído ao CRE", actor_id, None)
            .await?;

        Ok(Some(cre.id))
    }

    // =========================================================================
    //  ATRIBUIÇÃO A COUNSELLORS (modo único, lead a lead)
    // =========================================================================

    /// Para cada lead e cada país de interesse, escolhe o counsellor
    /// menos carregado NAQUELE momento (a carga é relida a cada lead).
    /// Alvos sem elegível voltam em `unassigned`.
    pub async fn assign_to_counsellors(
        &self,
        lead_ids: &[Uuid],
        actor: &Agent,
    ) -> Result<AssignmentOutcome, AppError> {
        let mut outcome = AssignmentOutcome::default();

        for &lead_id in lead_ids {
            let mut tx = self.pool.begin().await?;

            let Some(lead) = self.lead_repo.find_by_id(&mut *tx, lead_id).await? else {
                outcome.unassigned.push(UnassignedTarget {
                    lead_id,
                    country_id: None,
                });
                continue;
            };

            let countries = self.lead_repo.preferred_countries(&mut *tx, lead.id).await?;
            if countries.is_empty() {
                outcome.unassigned.push(UnassignedTarget {
                    lead_id,
                    country_id: None,
                });
                continue;
            }

            let mut assigned_here = false;
            for country in &countries {
                let scope = counsellor_scope(actor, country.id);
                let best = self.agent_repo.pick_least_loaded(&mut *tx, &scope).await?;

                match best {
                    Some(counsellor) => {
                        self.attach_counsellor(&mut tx, &lead, counsellor.id, country, actor.id)
                            .await?;
                        assigned_here = true;
                        outcome.assigned.push(AssignedPair {
                            lead_id: lead.id,
                            agent_id: counsellor.id,
                            country_id: Some(country.id),
                        });
                    }
                    None => outcome.unassigned.push(UnassignedTarget {
                        lead_id: lead.id,
                        country_id: Some(country.id),
                    }),
                }
            }

            if assigned_here {
                self.finish_counsellor_assignment(&mut tx, &lead, actor.id).await?;
            }

            tx.commit().await?;
        }

        Ok(outcome)
    }

    // =========================================================================
    //  AUTO-ASSIGN (modo lote, distribuição cíclica)
    // =========================================================================

    /// Distribui N leads de uma vez. O ranking por país é calculado
    /// UMA vez por chamada e os leads são espalhados ciclicamente
    /// (i mod K) sobre ele, em vez de todo lead cair no mesmo
    /// "menos carregado" recalculado. As escolhas não são reservadas
    /// entre transações concorrentes; o isolamento do banco é quem
    /// serializa escritas conflitantes.
    pub async fn auto_assign(
        &self,
        lead_ids: &[Uuid],
        actor: &Agent,
    ) -> Result<AssignmentOutcome, AppError> {
        let mut outcome = AssignmentOutcome::default();

        // Fase de leitura: plano (lead -> países) + ranking por país
        let mut plan: Vec<(Lead, Vec<Country>)> = Vec::new();
        for &lead_id in lead_ids {
            let Some(lead) = self.lead_repo.find_by_id(&self.pool, lead_id).await? else {
                outcome.unassigned.push(UnassignedTarget {
                    lead_id,
                    country_id: None,
                });
                continue;
            };
            let countries = self.lead_repo.preferred_countries(&self.pool, lead.id).await?;
            if countries.is_empty() {
                outcome.unassigned.push(UnassignedTarget {
                    lead_id,
                    country_id: None,
                });
                continue;
            }
            plan.push((lead, countries));
        }

        let mut ranked: HashMap<Uuid, Vec<AgentLoad>> = HashMap::new();
        for (_, countries) in &plan {
            for country in countries {
                if !ranked.contains_key(&country.id) {
                    let scope = counsellor_scope(actor, country.id);
                    let list = self.agent_repo.resolve_candidates(&self.pool, &scope).await?;
                    ranked.insert(country.id, list);
                }
            }
        }

        // Fase de escrita: uma transação por lead, cursor cíclico por país
        let mut cursors: HashMap<Uuid, usize> = HashMap::new();

        for (lead, countries) in &plan {
            let mut tx = self.pool.begin().await?;

            let mut assigned_here = false;
            for country in countries {
                let index = cursors.entry(country.id).or_insert(0);
                let pick = cyclic_pick(&ranked[&country.id], *index).cloned();
                *index += 1;

                match pick {
                    Some(counsellor) => {
                        self.attach_counsellor(&mut tx, lead, counsellor.id, country, actor.id)
                            .await?;
                        assigned_here = true;
                        outcome.assigned.push(AssignedPair {
                            lead_id: lead.id,
                            agent_id: counsellor.id,
                            country_id: Some(country.id),
                        });
                    }
                    None => outcome.unassigned.push(UnassignedTarget {
                        lead_id: lead.id,
                        country_id: Some(country.id),
                    }),
                }
            }

            if assigned_here {
                self.finish_counsellor_assignment(&mut tx, lead, actor.id).await?;
            }

            tx.commit().await?;
        }

        Ok(outcome)
    }

    // --- passos compartilhados pelos dois modos ---

    async fn attach_counsellor(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        lead: &Lead,
        counsellor_id: Uuid,
        country: &Country,
        actor_id: Uuid,
    ) -> Result<(), AppError> {
        self.lead_repo
            .link_counsellor(&mut **tx, lead.id, counsellor_id, Some(country.id))
            .await?;

        self.task_service
            .upsert_followup(&mut **tx, lead, counsellor_id, None, Some(country), actor_id)
            .await?;

        Ok(())
    }

    async fn finish_counsellor_assignment(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        lead: &Lead,
        actor_id: Uuid,
    ) -> Result<(), AppError> {
        self.lead_repo
            .update_stage(&mut **tx, lead.id, LeadStage::Counsellor)
            .await?;

        self.history_repo
            .append(&mut **tx, lead.id, "Lead atribuído aos counsellors", actor_id, None)
            .await?;
        self.history_repo
            .append(&mut **tx, lead.id, "Tarefa atribuída aos counsellors", actor_id, None)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn carga(id: Uuid, load: i64) -> AgentLoad {
        AgentLoad { id, load }
    }

    fn ranking_ordenado() -> (Vec<AgentLoad>, Vec<Uuid>) {
        // Já na ordem do banco: carga ASC, id ASC
        let mut ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        ids.sort();
        let ranked = vec![carga(ids[0], 0), carga(ids[1], 2), carga(ids[2], 5)];
        (ranked, ids)
    }

    #[test]
    fn indice_zero_escolhe_o_menos_carregado() {
        let (ranked, ids) = ranking_ordenado();
        assert_eq!(cyclic_pick(&ranked, 0).unwrap().id, ids[0]);
    }

    #[test]
    fn lote_espalha_ciclicamente_sobre_o_ranking() {
        let (ranked, ids) = ranking_ordenado();
        // 7 leads sobre 3 agentes: 0,1,2,0,1,2,0
        let escolhidos: Vec<Uuid> = (0..7)
            .map(|i| cyclic_pick(&ranked, i).unwrap().id)
            .collect();
        assert_eq!(
            escolhidos,
            vec![ids[0], ids[1], ids[2], ids[0], ids[1], ids[2], ids[0]]
        );
        // O agente de rank r recebe os leads {r, r+3, r+6, ...}
        assert_eq!(escolhidos[0], escolhidos[3]);
        assert_eq!(escolhidos[3], escolhidos[6]);
        assert_eq!(escolhidos[1], escolhidos[4]);
    }

    #[test]
    fn ranking_vazio_nao_escolhe_ninguem() {
        assert!(cyclic_pick(&[], 0).is_none());
        assert!(cyclic_pick(&[], 42).is_none());
    }

    #[test]
    fn agente_de_franquia_recebe_escopo_de_franquia() {
        let franchise_id = Uuid::new_v4();
        let country_id = Uuid::new_v4();
        let actor = Agent {
            id: Uuid::new_v4(),
            full_name: "Gestora".into(),
            email: "g@agencia.com".into(),
            password_hash: "x".into(),
            role: crate::models::agent::AgentRole::FranchiseCounsellor,
            country_id: None,
            franchise_id: Some(franchise_id),
            branch_id: None,
            region_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            counsellor_scope(&actor, country_id),
            AssignScope::FranchiseCounsellor {
                franchise_id,
                country_id
            }
        );

        let sem_franquia = Agent {
            franchise_id: None,
            ..actor
        };
        assert_eq!(
            counsellor_scope(&sem_franquia, country_id),
            AssignScope::Counsellor { country_id }
        );
    }
}
