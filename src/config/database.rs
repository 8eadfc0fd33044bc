//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Creation is idempotent, which lets the
//! service run it on every start.

use crate::config::DatabaseConfig;
use crate::entities::{Cashier, MenuItem, Order, OrderItem, ReceiptCounter, Setting, Supervisor};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

/// Gets the database URL from the `DATABASE_URL` environment variable, or builds
/// one from the configured file path.
///
/// `mode=rwc` lets `SQLite` create the file on first start.
#[must_use]
pub fn get_database_url(config: &DatabaseConfig) -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}?mode=rwc", config.path.display()))
}

/// Establishes a connection to the database at `database_url`.
///
/// # Errors
/// Returns an error if the database cannot be opened.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    Database::connect(options).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all necessary database tables that do not exist yet.
///
/// # Errors
/// Returns an error if any `CREATE TABLE` statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, MenuItem).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderItem).await?;
    create_table(db, &schema, Supervisor).await?;
    create_table(db, &schema, Cashier).await?;
    create_table(db, &schema, Setting).await?;
    create_table(db, &schema, ReceiptCounter).await?;

    Ok(())
}
