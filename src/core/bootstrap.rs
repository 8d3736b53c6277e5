use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories::users::{NewUser, UserChanges};
use crate::services::text::normalize_email;

/// Makes sure the configured first superuser exists, is an enabled admin and
/// still accepts the configured password.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = normalize_email(&admin.first_superuser_email);
    let now = primitive_now_utc();

    if let Some(user) = state.users().find_by_email(&email).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        let hashed_password = if verified {
            None
        } else {
            Some(security::hash_password(&admin.first_superuser_password)?)
        };
        let role = (user.role != UserRole::Admin).then_some(UserRole::Admin);
        let enabled = (!user.enabled).then_some(true);

        if hashed_password.is_none() && role.is_none() && enabled.is_none() {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        state
            .users()
            .update(
                &user.id,
                UserChanges { name: None, role, enabled, hashed_password, updated_at: now },
            )
            .await?;

        tracing::info!(email = %email, "Updated default superuser");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;

    state
        .users()
        .create(NewUser {
            id: Uuid::new_v4().to_string(),
            name: "Super Admin".to_string(),
            email: email.clone(),
            hashed_password,
            role: UserRole::Admin,
            enabled: true,
            created_at: now,
        })
        .await?;

    tracing::info!(email = %email, "Created default superuser");
    Ok(())
}
