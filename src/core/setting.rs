//! Key/value settings shown on the terminal (receipt footer, payment QR link).

use crate::{
    entities::{Setting, setting},
    errors::Result,
};
use chrono::Local;
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Link encoded in the QR code printed on receipts.
pub const QR_LINK_KEY: &str = "qr_link";

/// Footer message printed on receipts.
pub const RECEIPT_MESSAGE_KEY: &str = "receipt_message";

/// Returns the stored value for `key`, or an empty string when unset.
pub async fn get_setting_value<C>(db: &C, key: &str) -> Result<String>
where
    C: ConnectionTrait,
{
    let stored = Setting::find()
        .filter(setting::Column::Key.eq(key))
        .one(db)
        .await?;

    Ok(stored.map(|s| s.value).unwrap_or_default())
}

/// Stores `value` under `key`, updating the existing row if there is one.
pub async fn set_setting_value<C>(db: &C, key: &str, value: &str) -> Result<setting::Model>
where
    C: ConnectionTrait,
{
    let now = Local::now().naive_local();

    let existing = Setting::find()
        .filter(setting::Column::Key.eq(key))
        .one(db)
        .await?;

    let saved = if let Some(stored) = existing {
        let mut active: setting::ActiveModel = stored.into();
        active.value = Set(value.to_string());
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    info!(key, "setting updated");
    Ok(saved)
}
