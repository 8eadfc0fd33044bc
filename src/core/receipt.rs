//! Receipt number allocation.
//!
//! Receipts read `PX-<year>-<sequence>` with a six-digit, zero-padded sequence
//! that starts over every calendar year. Sequences live in one counter row per
//! year. Allocation bumps the counter with a single `UPDATE ... SET
//! last_sequence = last_sequence + 1`, so two payments in flight can never read
//! the same value; the first allocation of a year seeds the row from the
//! highest receipt already stored for that year.

use crate::{
    entities::{Order, ReceiptCounter, order, receipt_counter},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Fixed prefix printed on every receipt.
pub const RECEIPT_PREFIX: &str = "PX";

/// Returns the `PX-<year>-` prefix shared by all receipts of `year`.
#[must_use]
pub fn receipt_prefix(year: i32) -> String {
    format!("{RECEIPT_PREFIX}-{year}-")
}

/// Formats a receipt number, e.g. `PX-2025-000042`.
#[must_use]
pub fn format_receipt_number(year: i32, sequence: i64) -> String {
    format!("{}{sequence:06}", receipt_prefix(year))
}

/// Extracts the trailing sequence from a receipt number.
#[must_use]
pub fn parse_receipt_sequence(receipt_number: &str) -> Option<i64> {
    receipt_number.rsplit('-').next()?.parse().ok()
}

/// Highest sequence already printed on an order for `year`, or 0.
async fn highest_issued_sequence<C>(db: &C, year: i32) -> Result<i64>
where
    C: ConnectionTrait,
{
    let pattern = format!("{}%", receipt_prefix(year));
    let orders = Order::find()
        .filter(order::Column::ReceiptNumber.like(pattern))
        .all(db)
        .await?;

    Ok(orders
        .iter()
        .filter_map(|o| o.receipt_number.as_deref())
        .filter_map(parse_receipt_sequence)
        .max()
        .unwrap_or(0))
}

/// Returns the last sequence handed out for `year`, if any.
pub async fn current_sequence<C>(db: &C, year: i32) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    Ok(ReceiptCounter::find_by_id(year)
        .one(db)
        .await?
        .map(|counter| counter.last_sequence))
}

/// Reserves the next receipt number for `year`.
///
/// Call this inside the transaction that stores the number on the order so the
/// reservation and the write commit or roll back together.
///
/// # Errors
/// Returns an error if the counter cannot be read or written.
pub async fn allocate_receipt_number<C>(db: &C, year: i32) -> Result<String>
where
    C: ConnectionTrait,
{
    let bumped = ReceiptCounter::update_many()
        .col_expr(
            receipt_counter::Column::LastSequence,
            Expr::col(receipt_counter::Column::LastSequence).add(1_i64),
        )
        .filter(receipt_counter::Column::Year.eq(year))
        .exec(db)
        .await?;

    let sequence = if bumped.rows_affected == 0 {
        let next = highest_issued_sequence(db, year).await? + 1;
        debug!(year, next, "starting receipt counter");
        ReceiptCounter::insert(receipt_counter::ActiveModel {
            year: Set(year),
            last_sequence: Set(next),
        })
        .exec(db)
        .await?;
        next
    } else {
        current_sequence(db, year)
            .await?
            .ok_or_else(|| counter_missing(year))?
    };

    let receipt_number = format_receipt_number(year, sequence);
    info!(%receipt_number, "receipt number allocated");
    Ok(receipt_number)
}

/// Storage inconsistency: the counter row was bumped but cannot be read back.
fn counter_missing(year: i32) -> Error {
    Error::Database(DbErr::RecordNotFound(format!(
        "receipt counter for {year} missing after increment"
    )))
}
