// src/common/messages.rs

// Catálogo mínimo pt/en para as mensagens de sucesso do envelope.
// O idioma vem do extractor Locale (Accept-Language); "en" é o padrão
// quando o cabeçalho não ajuda.

pub fn success(locale: &str, key: &str) -> String {
    let (pt, en) = match key {
        "agent_registered" => ("Agente cadastrado.", "Agent registered."),
        "logged_in" => ("Login efetuado.", "Logged in."),
        "lead_created" => ("Lead criado e distribuído.", "Lead created and routed."),
        "lead_updated" => ("Lead atualizado.", "Lead updated."),
        "lead_deleted" => ("Lead removido.", "Lead removed."),
        "lead_found" => ("Lead encontrado.", "Lead found."),
        "history_listed" => ("Histórico do lead.", "Lead history."),
        "status_updated" => ("Status do lead atualizado.", "Lead status updated."),
        "leads_assigned" => (
            "Leads atribuídos aos counsellors.",
            "Leads assigned to counsellors.",
        ),
        "kyc_proceeded" => ("Lead encaminhado para KYC.", "Lead moved to KYC."),
        "kyc_approved" => ("KYC aprovado.", "KYC approved."),
        "kyc_rejected" => ("KYC rejeitado.", "KYC rejected."),
        _ => ("Operação concluída.", "Operation completed."),
    };

    if locale == "pt" { pt.to_string() } else { en.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cai_no_ingles_por_padrao() {
        assert_eq!(success("fr", "kyc_approved"), "KYC approved.");
        assert_eq!(success("pt", "kyc_approved"), "KYC aprovado.");
    }
}
