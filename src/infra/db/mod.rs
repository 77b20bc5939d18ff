//! Postgres pool for the blog tables and the schema migration controls
//! behind `blog-api migrate`.

use std::collections::HashSet;

use sea_orm::{Database as SeaDatabase, DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use crate::config::Config;

pub mod migrations;

pub use migrations::Migrator;

/// One known migration and whether the database has recorded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// Shared handle to the accounts and posts database.
#[derive(Clone)]
pub struct Database {
    pool: DatabaseConnection,
}

impl Database {
    /// Connect and bring the schema up to date. Used by `serve` and `admin`.
    pub async fn open(config: &Config) -> Result<Self, DbErr> {
        let db = Self::open_unmigrated(config).await?;

        if let Err(e) = db.apply_pending().await {
            tracing::error!(error = %e, "schema migration failed");
            return Err(e);
        }
        tracing::info!("database ready");

        Ok(db)
    }

    /// Connect and leave the schema alone; `migrate` drives it by hand.
    pub async fn open_unmigrated(config: &Config) -> Result<Self, DbErr> {
        let pool = SeaDatabase::connect(&config.database_url).await?;
        Ok(Self { pool })
    }

    pub fn connection(&self) -> DatabaseConnection {
        self.pool.clone()
    }

    pub async fn apply_pending(&self) -> Result<(), DbErr> {
        Migrator::up(&self.pool, None).await
    }

    pub async fn roll_back_last(&self) -> Result<(), DbErr> {
        Migrator::down(&self.pool, Some(1)).await
    }

    /// Drops every table, then replays all migrations.
    pub async fn reset(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.pool).await
    }

    pub async fn migration_status(&self) -> Result<Vec<MigrationState>, DbErr> {
        let recorded: HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|row| row.version)
            .collect();

        let known = Migrator::migrations();
        Ok(pair_with_recorded(
            known.iter().map(|m| m.name().to_string()),
            &recorded,
        ))
    }
}

/// Known migrations in declaration order, marked against the recorded set.
/// Recorded names the binary no longer knows are left out.
fn pair_with_recorded(
    known: impl IntoIterator<Item = String>,
    recorded: &HashSet<String>,
) -> Vec<MigrationState> {
    known
        .into_iter()
        .map(|name| MigrationState {
            applied: recorded.contains(&name),
            name,
        })
        .collect()
}
