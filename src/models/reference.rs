// src/models/reference.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Entidades de referência com checagem de existência.
/// O CRUD delas fica fora deste serviço; aqui só validamos ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Country,
    Branch,
    Source,
    Channel,
    Franchise,
    Region,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Country => "country",
            ReferenceKind::Branch => "branch",
            ReferenceKind::Source => "source",
            ReferenceKind::Channel => "channel",
            ReferenceKind::Franchise => "franchise",
            ReferenceKind::Region => "region",
        }
    }
}
