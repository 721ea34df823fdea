//! Schema migrations.
//!
//! Migrations live in `db/migrations/` at the repository root as reversible
//! `<revision>_<name>.up.sql` / `.down.sql` pairs and are embedded at compile
//! time. Revisions form a single linear chain: each one's parent is the
//! revision applied immediately before it.

use std::collections::BTreeSet;

use sqlx::migrate::{MigrateError, MigrationType, Migrator};
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// One link of the migration chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLink {
    pub revision: i64,
    /// `None` for the first revision.
    pub parent: Option<i64>,
    pub description: String,
    pub reversible: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Revision {0} appears more than once")]
    Duplicate(i64),

    #[error("Revision {revision} is ordered after {parent}")]
    OutOfOrder { revision: i64, parent: i64 },

    #[error("Revision {0} has no down migration")]
    Irreversible(i64),

    #[error("Down migration {0} has no matching up migration")]
    OrphanDown(i64),
}

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// List the chain of `migrator` in apply order and check that it is strictly
/// increasing and that every revision can be reverted.
pub fn migration_chain(migrator: &Migrator) -> Result<Vec<MigrationLink>, ChainError> {
    let mut ups = Vec::new();
    let mut downs = BTreeSet::new();

    for migration in migrator.iter() {
        match migration.migration_type {
            MigrationType::ReversibleDown => {
                downs.insert(migration.version);
            }
            MigrationType::ReversibleUp | MigrationType::Simple => ups.push(migration),
        }
    }

    let mut chain: Vec<MigrationLink> = Vec::with_capacity(ups.len());
    for migration in ups {
        let parent = chain.last().map(|link| link.revision);
        if let Some(parent) = parent {
            if migration.version == parent {
                return Err(ChainError::Duplicate(parent));
            }
            if migration.version < parent {
                return Err(ChainError::OutOfOrder {
                    revision: migration.version,
                    parent,
                });
            }
        }
        if !downs.remove(&migration.version) {
            return Err(ChainError::Irreversible(migration.version));
        }
        chain.push(MigrationLink {
            revision: migration.version,
            parent,
            description: migration.description.to_string(),
            reversible: true,
        });
    }

    if let Some(orphan) = downs.into_iter().next() {
        return Err(ChainError::OrphanDown(orphan));
    }
    Ok(chain)
}

/// Revert the most recently applied revision.
///
/// Returns the reverted revision, or `None` when nothing is applied.
pub async fn revert_last(pool: &PgPool) -> Result<Option<i64>, MigrateError> {
    let latest: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await
            .map_err(MigrateError::Execute)?;

    let Some(latest) = latest else {
        return Ok(None);
    };

    let target = MIGRATOR
        .iter()
        .filter(|m| m.migration_type.is_up_migration() && m.version < latest)
        .map(|m| m.version)
        .max()
        .unwrap_or(0);

    MIGRATOR.undo(pool, target).await?;
    tracing::info!(revision = latest, target, "Reverted migration");
    Ok(Some(latest))
}
