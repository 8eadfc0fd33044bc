//! Supervisor and cashier PIN records.
//!
//! PINs are plain strings compared as-is. Supervisors authorize privileged
//! actions at the terminal, cashiers tag the orders they ring up.

use crate::{
    entities::{Cashier, Supervisor, cashier, supervisor},
    errors::{Error, Result, ensure_not_blank},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Payload for a new cashier.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCashier {
    /// Display name
    pub name: String,
    /// Login PIN
    pub pin: String,
}

/// Partial cashier update. Fields left `None` (or blank) keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashierUpdate {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New login PIN
    #[serde(default)]
    pub pin: Option<String>,
}

/// Inserts a supervisor with `default_pin` when none exists.
///
/// Returns `true` if a record was created.
///
/// # Errors
/// Returns an error if the supervisors table cannot be read or written.
#[instrument(skip(db, default_pin))]
pub async fn ensure_default_supervisor(db: &DatabaseConnection, default_pin: &str) -> Result<bool> {
    if Supervisor::find().one(db).await?.is_some() {
        return Ok(false);
    }

    let pin = ensure_not_blank("pin", default_pin)?;
    supervisor::ActiveModel {
        pin: Set(pin),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("default supervisor PIN provisioned");
    Ok(true)
}

/// All supervisors in id order.
pub async fn list_supervisors(db: &DatabaseConnection) -> Result<Vec<supervisor::Model>> {
    Ok(Supervisor::find()
        .order_by_asc(supervisor::Column::Id)
        .all(db)
        .await?)
}

/// Replaces a supervisor's PIN.
///
/// # Errors
/// - `SupervisorNotFound` if no record has `id`
/// - `EmptyField` if the PIN is blank
#[instrument(skip(db, pin))]
pub async fn update_supervisor_pin(
    db: &DatabaseConnection,
    id: i64,
    pin: &str,
) -> Result<supervisor::Model> {
    let pin = ensure_not_blank("pin", pin)?;
    let existing = Supervisor::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::SupervisorNotFound { id })?;

    let mut active: supervisor::ActiveModel = existing.into();
    active.pin = Set(pin);
    let updated = active.update(db).await?;

    info!(supervisor_id = id, "supervisor PIN updated");
    Ok(updated)
}

/// True if any supervisor holds `pin`.
pub async fn verify_supervisor_pin(db: &DatabaseConnection, pin: &str) -> Result<bool> {
    let found = Supervisor::find()
        .filter(supervisor::Column::Pin.eq(pin))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// All cashiers in id order.
pub async fn list_cashiers(db: &DatabaseConnection) -> Result<Vec<cashier::Model>> {
    Ok(Cashier::find().order_by_asc(cashier::Column::Id).all(db).await?)
}

/// Loads one cashier.
///
/// # Errors
/// Returns `CashierNotFound` if no record has `id`.
pub async fn get_cashier(db: &DatabaseConnection, id: i64) -> Result<cashier::Model> {
    Cashier::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::CashierNotFound { id })
}

/// Creates a cashier.
///
/// # Errors
/// Returns `EmptyField` if the name or PIN is blank.
#[instrument(skip(db, new_cashier), fields(name = %new_cashier.name))]
pub async fn create_cashier(
    db: &DatabaseConnection,
    new_cashier: NewCashier,
) -> Result<cashier::Model> {
    let name = ensure_not_blank("name", &new_cashier.name)?;
    let pin = ensure_not_blank("pin", &new_cashier.pin)?;

    let created = cashier::ActiveModel {
        name: Set(name),
        pin: Set(pin),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(cashier_id = created.id, "cashier created");
    Ok(created)
}

/// Applies the supplied fields of `update` to a cashier.
///
/// # Errors
/// Returns `CashierNotFound` if no record has `id`.
#[instrument(skip(db, update))]
pub async fn update_cashier(
    db: &DatabaseConnection,
    id: i64,
    update: CashierUpdate,
) -> Result<cashier::Model> {
    let existing = get_cashier(db, id).await?;
    let mut active: cashier::ActiveModel = existing.into();

    if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        active.name = Set(name.to_string());
    }
    if let Some(pin) = update.pin.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        active.pin = Set(pin.to_string());
    }

    let updated = active.update(db).await?;
    info!(cashier_id = id, "cashier updated");
    Ok(updated)
}

/// Removes a cashier.
///
/// # Errors
/// Returns `CashierNotFound` if no record has `id`.
#[instrument(skip(db))]
pub async fn delete_cashier(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Cashier::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::CashierNotFound { id });
    }
    info!(cashier_id = id, "cashier deleted");
    Ok(())
}

/// Finds the cashier holding `pin`, if any.
pub async fn verify_cashier_pin(
    db: &DatabaseConnection,
    pin: &str,
) -> Result<Option<cashier::Model>> {
    Ok(Cashier::find()
        .filter(cashier::Column::Pin.eq(pin))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn new_cashier(name: &str, pin: &str) -> NewCashier {
        NewCashier {
            name: name.to_string(),
            pin: pin.to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_supervisor_is_created_once() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(ensure_default_supervisor(&db, "1234").await?);
        assert!(!ensure_default_supervisor(&db, "9999").await?);

        let supervisors = list_supervisors(&db).await?;
        assert_eq!(supervisors.len(), 1);
        assert_eq!(supervisors[0].pin, "1234");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_verify_supervisor_pin() -> Result<()> {
        let db = setup_test_db().await?;
        ensure_default_supervisor(&db, "1234").await?;
        let id = list_supervisors(&db).await?[0].id;

        assert!(verify_supervisor_pin(&db, "1234").await?);
        update_supervisor_pin(&db, id, "4321").await?;
        assert!(!verify_supervisor_pin(&db, "1234").await?);
        assert!(verify_supervisor_pin(&db, "4321").await?);

        let result = update_supervisor_pin(&db, 999, "0000").await;
        assert!(matches!(result, Err(Error::SupervisorNotFound { id: 999 })));

        let result = update_supervisor_pin(&db, id, "  ").await;
        assert!(matches!(result, Err(Error::EmptyField { field: "pin" })));
        Ok(())
    }

    #[tokio::test]
    async fn test_cashier_crud() -> Result<()> {
        let db = setup_test_db().await?;

        let ana = create_cashier(&db, new_cashier("Ana", "1111")).await?;
        let ben = create_cashier(&db, new_cashier(" Ben ", "2222")).await?;
        assert_eq!(ben.name, "Ben");
        assert_eq!(list_cashiers(&db).await?.len(), 2);

        // Only the supplied field changes
        let updated = update_cashier(
            &db,
            ana.id,
            CashierUpdate {
                name: None,
                pin: Some("3333".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.pin, "3333");

        let updated = update_cashier(
            &db,
            ana.id,
            CashierUpdate {
                name: Some("Ana Cruz".to_string()),
                pin: Some(String::new()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Ana Cruz");
        assert_eq!(updated.pin, "3333");

        assert_eq!(
            verify_cashier_pin(&db, "2222").await?.map(|c| c.id),
            Some(ben.id)
        );
        assert!(verify_cashier_pin(&db, "0000").await?.is_none());

        delete_cashier(&db, ben.id).await?;
        assert!(matches!(
            get_cashier(&db, ben.id).await,
            Err(Error::CashierNotFound { .. })
        ));
        assert!(matches!(
            delete_cashier(&db, ben.id).await,
            Err(Error::CashierNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_cashier_requires_name_and_pin() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_cashier(&db, new_cashier("", "1111")).await;
        assert!(matches!(result, Err(Error::EmptyField { field: "name" })));

        let result = create_cashier(&db, new_cashier("Ana", " ")).await;
        assert!(matches!(result, Err(Error::EmptyField { field: "pin" })));

        let result = update_cashier(&db, 42, CashierUpdate::default()).await;
        assert!(matches!(result, Err(Error::CashierNotFound { id: 42 })));
        Ok(())
    }
}
