use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Client;
use crate::db::types::ClientKind;

/// Accepts both the English field names and the Portuguese ones older
/// clients still send (`nome`, `tipo`, `cpf_cnpj`, ...).
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClientCreate {
    #[serde(alias = "nome")]
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default, alias = "sexo")]
    #[validate(length(max = 32, message = "gender is too long"))]
    pub(crate) gender: Option<String>,
    #[serde(default, alias = "telefone")]
    #[validate(length(max = 32, message = "phone is too long"))]
    pub(crate) phone: Option<String>,
    #[serde(alias = "tipo", alias = "tipo_cliente")]
    pub(crate) kind: ClientKind,
    #[serde(alias = "cpf_cnpj", alias = "documento")]
    pub(crate) document: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClientUpdate {
    #[serde(default, alias = "nome")]
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default, alias = "sexo")]
    #[validate(length(max = 32, message = "gender is too long"))]
    pub(crate) gender: Option<String>,
    #[serde(default, alias = "telefone")]
    #[validate(length(max = 32, message = "phone is too long"))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClientResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) gender: String,
    pub(crate) phone: String,
    pub(crate) kind: ClientKind,
    pub(crate) document: String,
    pub(crate) enabled: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ClientResponse {
    pub(crate) fn from_db(client: Client) -> Self {
        Self {
            id: client.id,
            user_id: client.user_id,
            name: client.name,
            email: client.email,
            gender: client.gender,
            phone: client.phone,
            kind: client.kind,
            document: client.document,
            enabled: client.enabled,
            created_at: format_primitive(client.created_at),
            updated_at: format_primitive(client.updated_at),
        }
    }
}
