use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::services::identity::IdentifierKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    User,
}

/// Which tax identifier a client carries: CPF for people, CNPJ for companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "clientkind", rename_all = "lowercase")]
pub(crate) enum ClientKind {
    #[serde(alias = "Fisica", alias = "fisica", alias = "Natural")]
    Natural,
    #[serde(alias = "Juridica", alias = "juridica", alias = "Legal")]
    Legal,
}

impl From<ClientKind> for IdentifierKind {
    fn from(kind: ClientKind) -> Self {
        match kind {
            ClientKind::Natural => Self::Natural,
            ClientKind::Legal => Self::Legal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "drawstatus", rename_all = "lowercase")]
pub(crate) enum DrawStatus {
    Scheduled,
    Completed,
    Cancelled,
}
