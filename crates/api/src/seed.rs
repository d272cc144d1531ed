//! Startup seeding of an empty catalog from a JSON snapshot file.

use std::path::Path;

use showcase_core::snapshot::load_snapshot_file;
use showcase_db::repositories::{ProjectRepo, SnapshotRepo};
use showcase_db::Db;

/// What startup seeding did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The database already held projects; the file was not read.
    AlreadyPopulated,
    /// The file was missing or corrupt; the catalog starts empty.
    Unreadable,
    /// The snapshot was imported.
    Imported { projects: usize, warnings: usize },
}

/// Seed `db` from the snapshot at `path` when the catalog is empty.
///
/// An unreadable or corrupt file is not fatal: it is logged and the server
/// carries on with an empty catalog. Only database failures are returned.
pub async fn seed_from_file(db: &Db, path: &Path) -> Result<SeedOutcome, sqlx::Error> {
    if ProjectRepo::count(db).await? > 0 {
        tracing::info!(path = %path.display(), "Catalog already populated, skipping seed");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let load = match load_snapshot_file(path, chrono::Utc::now()) {
        Ok(load) => load,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Seed snapshot unreadable, starting with an empty catalog"
            );
            return Ok(SeedOutcome::Unreadable);
        }
    };

    for warning in &load.warnings {
        tracing::warn!(warning = %warning, "Seed snapshot repaired input");
    }

    SnapshotRepo::import(db, &load.snapshot).await?;

    Ok(SeedOutcome::Imported {
        projects: load.snapshot.projects.len(),
        warnings: load.warnings.len(),
    })
}
