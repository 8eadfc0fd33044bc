//! Startup routines, run once by the binary before the server accepts requests.
//!
//! Each step is idempotent. Provisioning the default supervisor must succeed;
//! the orphan sweep and the monthly backup only log their failures.

use crate::{
    config::AppConfig,
    core::{backup, identity, menu},
    errors::Result,
};
use chrono::Local;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

/// Summary of what the startup tasks changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// A default supervisor record was inserted
    pub supervisor_created: bool,
    /// Order items removed because their menu item is gone
    pub orphans_removed: u64,
    /// Result of the backup step, `None` when skipped or failed
    pub backup: Option<backup::BackupOutcome>,
}

/// True for `SQLite` URLs that point at an in-memory database.
fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Runs the startup tasks against an already migrated database.
///
/// # Errors
/// Returns an error only if the default supervisor cannot be provisioned.
pub async fn run_startup_tasks(
    db: &DatabaseConnection,
    config: &AppConfig,
    database_url: &str,
) -> Result<StartupReport> {
    let mut report = StartupReport {
        supervisor_created: identity::ensure_default_supervisor(db, &config.supervisor.default_pin)
            .await?,
        ..Default::default()
    };

    match menu::sweep_orphan_order_items(db).await {
        Ok(removed) => report.orphans_removed = removed,
        Err(e) => error!("Failed to clean up orphaned order items: {}", e),
    }

    if !config.backup.enabled {
        info!("monthly backup disabled");
    } else if is_in_memory(database_url) {
        info!("in-memory database, skipping monthly backup");
    } else {
        let today = Local::now().date_naive();
        let outcome = backup::ensure_monthly_backup(
            db,
            &config.database.path,
            &config.backup.directory,
            today,
        )
        .await;
        match outcome {
            Ok(outcome) => report.backup = Some(outcome),
            Err(e) => error!("Monthly backup failed: {}", e),
        }
    }

    Ok(report)
}
