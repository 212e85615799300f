// src/models/agent.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE agent_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "agent_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    ItTeam,
    Cre,
    CreTl,
    Counsellor,
    CountryManager,
    RegionalManager,
    BranchCounsellor,
    FranchiseCounsellor,
    ApplicationManager,
}

// --- AGENTE (equipe interna) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: AgentRole,

    // Escopo geográfico do agente (nem todo cargo usa todos)
    pub country_id: Option<Uuid>,
    pub franchise_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub region_id: Option<Uuid>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- DISTRIBUIÇÃO DE LEADS ---

/// Escopo de elegibilidade para atribuição de um lead.
/// Cada variante carrega o recorte geográfico que o cargo exige,
/// e o repositório escolhe a query de carga correspondente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignScope {
    Cre,
    Counsellor { country_id: Uuid },
    FranchiseCounsellor { franchise_id: Uuid, country_id: Uuid },
}

impl AssignScope {
    pub fn role(&self) -> AgentRole {
        match self {
            AssignScope::Cre => AgentRole::Cre,
            AssignScope::Counsellor { .. } => AgentRole::Counsellor,
            AssignScope::FranchiseCounsellor { .. } => AgentRole::FranchiseCounsellor,
        }
    }
}

/// Uma linha do ranking de carga: agente + quantidade de
/// atribuições abertas. Ordenado por carga ASC, id ASC.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoad {
    pub id: Uuid,
    pub load: i64,
}

// --- RESULTADO DAS OPERAÇÕES DE ATRIBUIÇÃO ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPair {
    pub lead_id: Uuid,
    pub agent_id: Uuid,
    pub country_id: Option<Uuid>,
}

/// Alvo que ficou sem counsellor (nenhum agente elegível).
/// Não é erro: o chamador decide o que fazer com eles.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedTarget {
    pub lead_id: Uuid,
    pub country_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub assigned: Vec<AssignedPair>,
    pub unassigned: Vec<UnassignedTarget>,
}
