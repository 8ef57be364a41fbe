//! Bootstrap admin initialization.

use anyhow::{Result, bail};
use ecocart_core::UserRole;
use ecocart_core::config::AdminConfig;
use ecocart_metadata::MetadataStore;
use ecocart_metadata::models::{TokenRow, UserRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Ensure the configured admin account and token exist.
///
/// The admin token hash comes from configuration; if no token row matches
/// it, an admin user (reusing the configured email if already registered)
/// and a token row are created. A hash matching a revoked or expired token
/// is rejected so a stale credential cannot silently come back to life.
pub async fn ensure_admin(metadata: &dyn MetadataStore, config: &AdminConfig) -> Result<()> {
    // Normalize to lowercase to match auth's lowercase hex encoding.
    let hash = config
        .token_hash
        .strip_prefix("sha256:")
        .unwrap_or(&config.token_hash)
        .to_lowercase();
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid admin token_hash: expected 64 hex chars");
    }

    let now = OffsetDateTime::now_utc();

    if let Some(existing) = metadata.get_token_by_hash(&hash).await? {
        if existing.revoked_at.is_some() {
            bail!(
                "admin token hash matches a revoked token (id={}); use a new token",
                existing.token_id
            );
        }
        if let Some(expires_at) = existing.expires_at {
            if expires_at <= now {
                bail!(
                    "admin token hash matches an expired token (id={}, expired={}); use a new token",
                    existing.token_id,
                    expires_at
                );
            }
        }
        tracing::debug!("Admin token already exists");
        return Ok(());
    }

    // Reuse the configured email if an account already exists; elevate it
    // if a previous run created it as a regular user.
    let admin_user = match metadata.get_user_by_email(&config.email).await? {
        Some(user) => {
            if UserRole::parse(&user.role).map(|r| !r.is_admin()).unwrap_or(true) {
                bail!(
                    "configured admin email '{}' belongs to a non-admin account",
                    config.email
                );
            }
            user
        }
        None => {
            let user = UserRow {
                user_id: Uuid::new_v4(),
                name: config.name.clone(),
                email: config.email.clone(),
                role: UserRole::Admin.as_str().to_string(),
                created_at: now,
            };
            metadata.create_user(&user).await?;
            tracing::info!(user_id = %user.user_id, "Admin account created");
            user
        }
    };

    let token = TokenRow {
        token_id: Uuid::new_v4(),
        user_id: admin_user.user_id,
        token_hash: hash,
        expires_at: None,
        revoked_at: None,
        created_at: now,
        last_used_at: None,
        description: Some("bootstrap admin token".to_string()),
    };
    metadata.create_token(&token).await?;
    tracing::info!(token_id = %token.token_id, "Admin token created");

    Ok(())
}
