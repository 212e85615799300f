// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Guarda de linhas afetadas
// ---
/// Converte um UPDATE que afetou zero linhas em erro de conflito.
/// Usado nos passos em que a transição exige exatamente uma linha
/// (ex.: concluir a tarefa ao encaminhar para KYC); o `?` no
/// chamador desfaz a transação inteira.
pub(crate) fn expect_rows_affected(rows: u64, entity: &'static str) -> Result<(), AppError> {
    if rows == 0 {
        return Err(AppError::NoRowsAffected(entity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_linhas_vira_conflito() {
        assert!(matches!(
            expect_rows_affected(0, "tasks"),
            Err(AppError::NoRowsAffected("tasks"))
        ));
        assert!(expect_rows_affected(1, "tasks").is_ok());
    }
}
