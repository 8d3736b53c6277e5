use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_offset, format_primitive};
use crate::db::models::Draw;
use crate::db::types::DrawStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DrawCreate {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "prize is too long"))]
    pub(crate) prize: String,
    /// RFC 3339, or a zone-less local timestamp taken as UTC.
    pub(crate) draw_date: String,
    #[serde(default = "default_status")]
    pub(crate) status: DrawStatus,
    #[serde(default = "default_true")]
    pub(crate) enabled: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DrawUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "prize is too long"))]
    pub(crate) prize: Option<String>,
    #[serde(default)]
    pub(crate) draw_date: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<DrawStatus>,
    #[serde(default)]
    pub(crate) enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DrawResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) prize: String,
    pub(crate) draw_date: String,
    pub(crate) status: DrawStatus,
    pub(crate) enabled: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl DrawResponse {
    pub(crate) fn from_db(draw: Draw) -> Self {
        Self {
            id: draw.id,
            title: draw.title,
            description: draw.description,
            prize: draw.prize,
            draw_date: format_offset(draw.draw_date),
            status: draw.status,
            enabled: draw.enabled,
            created_by: draw.created_by,
            created_at: format_primitive(draw.created_at),
            updated_at: format_primitive(draw.updated_at),
        }
    }
}

fn default_status() -> DrawStatus {
    DrawStatus::Scheduled
}

fn default_true() -> bool {
    true
}
