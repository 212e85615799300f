// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::agent::Agent, models::agent::AgentRole};

/// 1. O Trait que define uma capacidade e os cargos que a possuem
pub trait RoleGate: Send + Sync + 'static {
    fn allowed() -> &'static [AgentRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<G>(pub PhantomData<G>);

// 3. Implementação do FromRequestParts
//
// O auth_guard já pendurou o Agent nas extensions; aqui só
// comparamos o cargo dele com a lista da capacidade. O portão de
// status por cargo é outro: fica na matriz status_access_roles.
impl<G, S> FromRequestParts<S> for RequireRole<G>
where
    G: RoleGate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agent = parts
            .extensions
            .get::<Agent>()
            .ok_or(AppError::InvalidToken)?;

        if !G::allowed().contains(&agent.role) {
            return Err(AppError::RoleNotAllowed(format!("{:?}", agent.role)));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

/// Intake: criar, editar e remover leads
pub struct GateIntake;
impl RoleGate for GateIntake {
    fn allowed() -> &'static [AgentRole] {
        &[AgentRole::ItTeam, AgentRole::Cre, AgentRole::CreTl]
    }
}

/// Distribuição de leads para counsellors
pub struct GateAssignment;
impl RoleGate for GateAssignment {
    fn allowed() -> &'static [AgentRole] {
        &[
            AgentRole::ItTeam,
            AgentRole::CreTl,
            AgentRole::CountryManager,
            AgentRole::RegionalManager,
        ]
    }
}

/// Transições de KYC (encaminhar, aprovar, rejeitar)
pub struct GateKyc;
impl RoleGate for GateKyc {
    fn allowed() -> &'static [AgentRole] {
        &[
            AgentRole::Counsellor,
            AgentRole::BranchCounsellor,
            AgentRole::FranchiseCounsellor,
            AgentRole::CountryManager,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counsellor_opera_kyc_mas_nao_intake() {
        assert!(GateKyc::allowed().contains(&AgentRole::Counsellor));
        assert!(!GateIntake::allowed().contains(&AgentRole::Counsellor));
    }

    #[test]
    fn cre_faz_intake_mas_nao_distribui() {
        assert!(GateIntake::allowed().contains(&AgentRole::Cre));
        assert!(!GateAssignment::allowed().contains(&AgentRole::Cre));
    }

    #[test]
    fn application_manager_nao_opera_o_funil() {
        assert!(!GateIntake::allowed().contains(&AgentRole::ApplicationManager));
        assert!(!GateAssignment::allowed().contains(&AgentRole::ApplicationManager));
        assert!(!GateKyc::allowed().contains(&AgentRole::ApplicationManager));
    }
}
