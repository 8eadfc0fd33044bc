//! Monthly database backup.
//!
//! At startup the database is snapshotted to `backup_<YYYY>-<MM>.db` in the
//! backup directory unless this month's copy already exists. Only the first
//! start of a month produces a file. The snapshot is taken with `VACUUM INTO`
//! through the open connection, so pages still held in the write-ahead log are
//! included.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What [`ensure_monthly_backup`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new copy was written to the contained path
    Created(PathBuf),
    /// This month's copy was already present
    AlreadyExists(PathBuf),
    /// The database file does not exist (yet), nothing to copy
    SourceMissing,
}

/// File name of the backup for the month containing `date`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("backup_{}-{:02}.db", date.year(), date.month())
}

/// `VACUUM INTO` statement writing a snapshot to `target`.
fn vacuum_into_sql(target: &Path) -> Result<String> {
    let target = target.to_str().ok_or_else(|| Error::Config {
        message: format!("Backup path is not valid UTF-8: {}", target.display()),
    })?;
    Ok(format!("VACUUM INTO '{}'", target.replace('\'', "''")))
}

/// Snapshots the database behind `db` into `backup_dir` if this month's
/// backup is missing. `database_path` is the file `db` was opened from.
///
/// # Errors
/// Returns an I/O error if the directory cannot be created, or a database
/// error if the snapshot fails.
pub async fn ensure_monthly_backup(
    db: &DatabaseConnection,
    database_path: &Path,
    backup_dir: &Path,
    today: NaiveDate,
) -> Result<BackupOutcome> {
    let target = backup_dir.join(backup_file_name(today));
    if target.exists() {
        info!(path = %target.display(), "monthly backup already exists");
        return Ok(BackupOutcome::AlreadyExists(target));
    }

    if !database_path.exists() {
        warn!(path = %database_path.display(), "database file not found, skipping backup");
        return Ok(BackupOutcome::SourceMissing);
    }

    std::fs::create_dir_all(backup_dir)?;
    db.execute_unprepared(&vacuum_into_sql(&target)?).await?;

    info!(path = %target.display(), "monthly backup created");
    Ok(BackupOutcome::Created(target))
}
