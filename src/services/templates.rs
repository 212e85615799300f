// src/services/templates.rs

// O colaborador de template: gera a descrição da tarefa de follow-up
// a partir do lead + preferências. Se não houver insumo suficiente,
// falha, e a operação inteira do chamador falha junto (nunca
// persistimos tarefa com descrição vazia ou truncada).

use crate::{
    common::error::AppError,
    models::lead::{Lead, StudyPreferenceDetail},
    models::reference::Country,
};

pub fn render_task_description(
    lead: &Lead,
    countries: &[Country],
    details: &[StudyPreferenceDetail],
) -> Result<String, AppError> {
    if countries.is_empty() {
        return Err(AppError::IntegrityFailure(
            "O lead não possui países de interesse; a descrição da tarefa não pôde ser gerada."
                .into(),
        ));
    }

    let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();

    let mut description = format!(
        "Follow-up com {} ({} / {}).\nPaíses de interesse: {}.",
        lead.full_name,
        lead.email,
        lead.phone,
        codes.join(", ")
    );

    if !details.is_empty() {
        description.push_str("\nCursos pretendidos:");
        for detail in details {
            description.push_str(&format!(
                "\n- {} / {}",
                detail.course_name, detail.university_name
            ));
            if let Some(campus) = &detail.campus {
                description.push_str(&format!(" ({campus})"));
            }
            if let Some(year) = detail.intake_year {
                description.push_str(&format!(" [{year}]"));
            }
        }
    }

    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn lead_de_teste() -> Lead {
        Lead {
            id: Uuid::new_v4(),
            full_name: "João Pereira".into(),
            email: "joao@email.com".into(),
            phone: "+5511999990000".into(),
            mobile: None,
            stage: crate::models::lead::LeadStage::Intake,
            source_id: None,
            channel_id: None,
            branch_id: None,
            assigned_cre: None,
            assigned_cre_tl: None,
            assigned_regional_manager: None,
            assigned_branch_counselor: None,
            assigned_counsellor_tl: None,
            is_deleted: false,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pais(code: &str) -> Country {
        Country {
            id: Uuid::new_v4(),
            name: code.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn descricao_inclui_lead_e_paises() {
        let lead = lead_de_teste();
        let out = render_task_description(&lead, &[pais("CA"), pais("US")], &[]).unwrap();
        assert!(out.contains("João Pereira"));
        assert!(out.contains("CA, US"));
    }

    #[test]
    fn falha_sem_paises_de_interesse() {
        let lead = lead_de_teste();
        let err = render_task_description(&lead, &[], &[]).unwrap_err();
        assert!(matches!(err, AppError::IntegrityFailure(_)));
    }

    #[test]
    fn detalhes_entram_na_descricao() {
        let lead = lead_de_teste();
        let detail = StudyPreferenceDetail {
            id: Uuid::new_v4(),
            study_preference_id: Uuid::new_v4(),
            university_name: "University of Toronto".into(),
            campus: Some("St. George".into()),
            course_name: "Computer Science".into(),
            intake_year: Some(2027),
            created_at: Utc::now(),
        };
        let out = render_task_description(&lead, &[pais("CA")], &[detail]).unwrap();
        assert!(out.contains("Computer Science / University of Toronto (St. George) [2027]"));
    }
}
