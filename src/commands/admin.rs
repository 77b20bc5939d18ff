//! Create-admin command - Bootstraps an elevated account.

use crate::cli::args::CreateAdminArgs;
use crate::config::{Config, MIN_PASSWORD_LENGTH};
use crate::domain::{AccountUpdate, Role};
use crate::errors::{AppError, AppResult};
use crate::infra::{build_object_store, Database};
use crate::services::{ServiceContainer, Services};

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    if (args.password.chars().count() as u64) < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let db = Database::open(&config).await?;
    let storage = build_object_store(&config.storage)?;
    let services = Services::from_connection(db.connection(), storage, &config);

    let account = services
        .credentials()
        .register(args.email, args.username, args.password)
        .await?;

    let admin = services
        .accounts()
        .update_account(
            account.id,
            AccountUpdate {
                is_active: Some(true),
                is_superuser: Some(true),
                role: Some(Role::Admin),
            },
        )
        .await?;

    tracing::info!(account_id = %admin.id, "Administrator created");
    println!("Created administrator {} ({})", admin.username, admin.id);
    Ok(())
}
